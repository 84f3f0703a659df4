// SPDX-License-Identifier: Apache-2.0

//! The page buffer pool: a size-partitioned pool returning buffers of
//! exactly page size, amortising allocation across fills and evictions.
//!
//! A single `parking_lot::Mutex<Vec<Vec<u8>>>` backs the free list — the
//! paged cache is explicitly a concurrently-shared object, so there's no
//! benefit to a thread-local variant here.

use parking_lot::Mutex;

/// A pool of reusable page-sized byte buffers.
///
/// Buffers are opaque: their contents are undefined on rent and not
/// cleared on return. A returned buffer whose length doesn't match
/// `page_size` is simply dropped rather than pooled.
pub struct PagePool {
	page_size: usize,
	free: Mutex<Vec<Vec<u8>>>,
}

impl PagePool {
	pub fn new(page_size: usize) -> Self {
		Self { page_size, free: Mutex::new(Vec::new()) }
	}

	pub fn page_size(&self) -> usize { self.page_size }

	/// Rents a buffer of exactly `self.page_size()` bytes, reusing a
	/// previously-recycled one when available.
	pub fn rent(&self) -> Vec<u8> {
		self.free
			.lock()
			.pop()
			.unwrap_or_else(|| vec![0u8; self.page_size])
	}

	/// Rents a buffer of exactly `size` bytes, for the short/partial-page
	/// case where a short backing-store read shrinks an entry's logical
	/// size. Never pulled from the free list, since those are always full
	/// page size; `recycle` will discard it on return.
	pub fn rent_sized(&self, size: usize) -> Vec<u8> {
		if size == self.page_size {
			self.rent()
		} else {
			vec![0u8; size]
		}
	}

	/// Returns a buffer to the pool. Buffers of the wrong length are
	/// discarded.
	pub fn recycle(&self, mut buf: Vec<u8>) {
		if buf.len() != self.page_size {
			return;
		}
		buf.clear();
		buf.resize(self.page_size, 0);
		self.free.lock().push(buf);
	}

	/// Number of buffers currently idle in the pool (for leak-check tests).
	pub fn free_count(&self) -> usize {
		self.free.lock().len()
	}
}
