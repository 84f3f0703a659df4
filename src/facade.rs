// SPDX-License-Identifier: Apache-2.0

//! The public random-access read API: `MemoryReader` wraps a [`PageCache`]
//! and turns arbitrary, possibly unaligned, possibly multi-page
//! virtual-address ranges into a single `read` call, plus typed helpers for
//! fixed-layout values and pointers.

use arrayvec::ArrayVec;
use bytemuck::{Pod, Zeroable};
use crate::cache::PageCache;
use crate::stats::StatsSnapshot;

/// Small values are read into stack scratch space instead of a pooled
/// buffer; 32 bytes comfortably covers every primitive and small struct a
/// diagnostics reader touches (an `i128`, a GUID, two `u64`s).
const INLINE_SCRATCH: usize = 32;

/// Width of a pointer in the target process, used by [`MemoryReader::read_pointer`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PointerWidth {
	Four,
	Eight,
}

impl PointerWidth {
	pub fn bytes(self) -> usize {
		match self {
			PointerWidth::Four => 4,
			PointerWidth::Eight => 8,
		}
	}
}

/// The typed, random-access read facade over a paged cache.
pub struct MemoryReader {
	cache: std::sync::Arc<dyn PageCache>,
	pointer_width: PointerWidth,
}

impl MemoryReader {
	pub fn new(cache: std::sync::Arc<dyn PageCache>, pointer_width: PointerWidth) -> Self {
		Self { cache, pointer_width }
	}

	pub fn pointer_size(&self) -> usize { self.pointer_width.bytes() }

	/// Reads up to `out.len()` bytes starting at `va`, walking pages as
	/// needed. Returns the number of bytes actually copied, which is less
	/// than `out.len()` at the first gap, unmapped page, or short
	/// backing-store read encountered.
	pub fn read(&self, va: u64, out: &mut [u8]) -> usize {
		if out.is_empty() {
			return 0;
		}

		let page_size = self.cache.page_size() as u64;
		let mut cursor = va;
		let mut copied = 0usize;
		let mut pages_touched = 0u32;

		if va % page_size != 0 {
			self.cache.stats().record_unaligned_read();
		}

		while copied < out.len() {
			let page_base = cursor - (cursor % page_size);
			let page_offset = (cursor - page_base) as usize;
			let want = (page_size as usize - page_offset).min(out.len() - copied);

			let page = self.cache.get_or_create(page_base);
			let n = page.read(self.cache.store(), self.cache.pool(), self.cache.stats(), cursor, &mut out[copied..copied + want]);
			self.cache.touch(&page, n);
			pages_touched += 1;

			copied += n;
			cursor += n as u64;
			if n < want {
				break;
			}
		}

		if pages_touched > 1 {
			self.cache.stats().record_multi_page_read();
		}

		copied
	}

	/// Reads a fixed-layout value at `va`, or `None` if fewer than
	/// `size_of::<T>()` bytes were available — a thin, all-or-nothing layer
	/// over `read`.
	pub fn read_value<T: Pod + Zeroable>(&self, va: u64) -> Option<T> {
		let size = std::mem::size_of::<T>();
		if size <= INLINE_SCRATCH {
			let mut scratch = ArrayVec::<u8, INLINE_SCRATCH>::new();
			scratch.extend(std::iter::repeat(0u8).take(size));
			let n = self.read(va, &mut scratch[..size]);
			if n != size {
				return None;
			}
			Some(bytemuck::pod_read_unaligned(&scratch[..size]))
		} else {
			let mut buf = self.cache.pool().rent_sized(size);
			let n = self.read(va, &mut buf[..size]);
			let result = (n == size).then(|| bytemuck::pod_read_unaligned(&buf[..size]));
			self.cache.pool().recycle(buf);
			result
		}
	}

	/// Reads a pointer-sized value at `va` and widens it to `u64`. `va == 0`
	/// is treated as an invalid address rather than attempted.
	pub fn read_pointer(&self, va: u64) -> Option<u64> {
		if va == 0 {
			return None;
		}
		match self.pointer_width {
			PointerWidth::Four => self.read_value::<u32>(va).map(u64::from),
			PointerWidth::Eight => self.read_value::<u64>(va),
		}
	}

	/// Evicts every resident page's buffer. Counters are left untouched;
	/// call [`MemoryReader::flush_resetting_stats`] to also zero them.
	pub fn flush(&self) { self.cache.flush(); }

	/// As [`MemoryReader::flush`], but also zeroes every counter in
	/// [`MemoryReader::stats`].
	pub fn flush_resetting_stats(&self) {
		self.cache.flush();
		self.cache.stats().reset();
	}

	pub fn stats(&self) -> StatsSnapshot { self.cache.stats().snapshot() }
	pub fn close(&self) { self.cache.close(); }
}
