// SPDX-License-Identifier: Apache-2.0

//! Cache construction configuration. Every knob is explicit and enumerated;
//! the only failure mode is a non-power-of-two page size.

use crate::error::{ErrorKind, Result};

/// Default page size, a common minidump/PE-section granularity.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Which eviction strategy the cache uses.
///
/// The two variants share the same [`crate::cache::PageCache`] capability
/// (`get_or_create`/`flush`/`close`) and differ only in how residency is
/// bounded and pages are evicted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Variant {
	/// Fixed page count, evicted strictly LRU on every insert.
	Lru { capacity_pages: usize },
	/// Byte-budgeted, every page of every segment pre-described, evicted by
	/// a background trimmer.
	SegmentSized { max_bytes: usize },
}

/// Construction-time options for a paged cache: a `Copy`, `#[non_exhaustive]`
/// struct with paired getters and fluent `set_*` builder methods, validated
/// once at the end with [`CacheConfig::build`].
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct CacheConfig {
	page_size: usize,
	variant: Variant,
	thread_safe: bool,
	use_os_memory_features: bool,
}

impl CacheConfig {
	/// Starts a config with the given variant and the default page size.
	/// `thread_safe` should be set to whatever the backing store declares;
	/// it defaults to `true`, the safer default for a cache that is usually
	/// shared.
	pub fn new(variant: Variant) -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
			variant,
			thread_safe: true,
			use_os_memory_features: false,
		}
	}

	pub fn page_size(&self) -> usize { self.page_size }
	pub fn variant(&self) -> Variant { self.variant }
	pub fn thread_safe(&self) -> bool { self.thread_safe }
	pub fn use_os_memory_features(&self) -> bool { self.use_os_memory_features }

	/// Sets the page size. Must be a power of two; checked in [`Self::build`].
	pub fn set_page_size(mut self, value: usize) -> Self {
		self.page_size = value;
		self
	}

	pub fn set_variant(mut self, value: Variant) -> Self {
		self.variant = value;
		self
	}

	/// Sets whether the backing store linearises its own concurrent reads.
	/// Advisory only — every store implementation in this crate is safe to
	/// call concurrently either way; this just tells a caller whether
	/// concurrent reads will actually parallelise or queue up behind the
	/// store's own lock.
	pub fn set_thread_safe(mut self, value: bool) -> Self {
		self.thread_safe = value;
		self
	}

	/// Allows the segment-sized variant to delegate resident buffers to
	/// OS-level large-page/AWE windows instead of pooled heap arrays. An
	/// implementation freedom left to future backends; `dbgmem` currently
	/// still pools heap arrays even when this is set, but accepts the flag
	/// so existing configuration callers compile unchanged once it's wired
	/// up.
	pub fn set_use_os_memory_features(mut self, value: bool) -> Self {
		self.use_os_memory_features = value;
		self
	}

	/// Validates the configuration, returning the one fatal error class the
	/// core recognizes: a bad page size or an empty capacity.
	pub fn build(self) -> Result<Self> {
		if self.page_size == 0 {
			return Err(ErrorKind::ZeroPageSize);
		}
		if !self.page_size.is_power_of_two() {
			return Err(ErrorKind::PageSizeNotPowerOfTwo(self.page_size));
		}
		match self.variant {
			Variant::Lru { capacity_pages: 0 } => return Err(ErrorKind::ZeroCapacity),
			Variant::SegmentSized { max_bytes: 0 } => return Err(ErrorKind::ZeroCapacity),
			_ => {}
		}
		Ok(self)
	}
}
