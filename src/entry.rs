// SPDX-License-Identifier: Apache-2.0

//! The page descriptor / cache entry and its read protocol.
//!
//! Each entry carries its own `parking_lot::RwLock` rather than sharing one
//! lock across the cache — hot-path readers never block each other, and a
//! fill (real I/O) only blocks readers of that one page. A spinlock would be
//! wrong here: page fills block on real I/O, not a few instructions.

use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::RwLock;
use crate::pool::PagePool;
use crate::stats::Stats;
use crate::store::BackingStore;

/// A single page: base address, lazily-populated buffer, synchronisation.
/// Eviction bookkeeping (LRU list links, or age + same-segment chaining)
/// lives in the owning cache, not here — this type only knows how to fill
/// and serve itself.
pub struct PageCore {
	base_va: u64,
	file_offset: u64,
	/// `false` when no segment covers this page's base VA; such a page is
	/// permanently zero-length and never calls the backing store.
	mapped: bool,
	/// Effective size; starts at the nominal (possibly short, for the last
	/// page of a segment) page size and may shrink further if the backing
	/// store itself returns fewer bytes than expected.
	size: AtomicUsize,
	buffer: RwLock<Option<Vec<u8>>>,
}

impl PageCore {
	/// A page backed by a segment at `file_offset`, covering `size` bytes
	/// (`size` may already be short, for the tail page of a segment).
	pub fn new(base_va: u64, file_offset: u64, size: usize) -> Self {
		Self {
			base_va,
			file_offset,
			mapped: true,
			size: AtomicUsize::new(size),
			buffer: RwLock::new(None),
		}
	}

	/// A page whose base VA is covered by no segment: permanently empty.
	pub fn new_unmapped(base_va: u64) -> Self {
		Self {
			base_va,
			file_offset: 0,
			mapped: false,
			size: AtomicUsize::new(0),
			buffer: RwLock::new(None),
		}
	}

	pub fn base_va(&self) -> u64 { self.base_va }

	/// Current effective size, `0` if this page is unmapped or was found
	/// permanently short on a prior fill.
	pub fn size(&self) -> usize { self.size.load(Ordering::Relaxed) }

	pub fn is_resident(&self) -> bool { self.buffer.read().is_some() }

	/// Reads bytes from this page into `out`. `va` must lie within
	/// `[base_va, base_va + size)` at the time of the call — this is a
	/// precondition, not re-validated here, because the size may shrink
	/// mid-call on a short fill; callers recompute overlap from the return
	/// value, as the read facade does.
	///
	/// Returns the number of bytes copied, which may be less than
	/// `out.len()` if the page is shorter than expected.
	///
	/// Records a cache hit or miss against `stats` — a hit is a read served
	/// entirely from an already-resident buffer; anything requiring a
	/// backing-store fetch (or finding the page permanently unmapped) is a
	/// miss.
	pub fn read(&self, store: &dyn BackingStore, pool: &PagePool, stats: &Stats, va: u64, out: &mut [u8]) -> usize {
		debug_assert!(va >= self.base_va);
		let off = (va - self.base_va) as usize;

		// Fast path: buffer already resident.
		{
			let guard = self.buffer.read();
			if let Some(buf) = guard.as_ref() {
				stats.record_hit();
				let size = self.size();
				if off >= size { return 0; }
				let n = out.len().min(size - off).min(buf.len().saturating_sub(off));
				out[..n].copy_from_slice(&buf[off..off + n]);
				return n;
			}
		}

		stats.record_miss();
		if !self.mapped {
			return 0;
		}

		// Slow path: fill, re-checking presence under the write lock in
		// case another reader materialised it first.
		{
			let mut guard = self.buffer.write();
			if guard.is_none() {
				let size = self.size();
				if size > 0 {
					let mut buf = pool.rent_sized(size);
					let read = store.read(self.file_offset, &mut buf[..size]);
					if read == 0 {
						log::warn!(
							"page at va {:#x} (file offset {:#x}) read 0 of {} bytes; marking permanently short",
							self.base_va, self.file_offset, size,
						);
						self.size.store(0, Ordering::Relaxed);
						pool.recycle(buf);
					} else {
						if read < size {
							log::debug!(
								"short read at va {:#x}: got {} of {} bytes",
								self.base_va, read, size,
							);
							buf.truncate(read);
							self.size.store(read, Ordering::Relaxed);
						}
						*guard = Some(buf);
					}
				}
			}
		}

		// Re-read through the fast path; handles both the just-filled and
		// the "another thread filled it first" cases uniformly.
		let guard = self.buffer.read();
		match guard.as_ref() {
			Some(buf) => {
				let size = self.size();
				if off >= size { return 0; }
				let n = out.len().min(size - off).min(buf.len().saturating_sub(off));
				out[..n].copy_from_slice(&buf[off..off + n]);
				n
			}
			None => 0,
		}
	}

	/// Pages this entry out: releases its buffer to the pool under the
	/// write lock, so an in-flight reader holding the read lock never sees
	/// the buffer vanish mid-copy. Returns `true` if a buffer was actually
	/// freed.
	pub fn evict(&self, pool: &PagePool) -> bool {
		let mut guard = self.buffer.write();
		match guard.take() {
			Some(buf) => {
				pool.recycle(buf);
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::StreamStore;
	use std::io::Cursor;

	fn store_with(data: Vec<u8>) -> StreamStore<Cursor<Vec<u8>>> {
		StreamStore::new(Cursor::new(data))
	}

	#[test]
	fn fills_then_hits_from_buffer() {
		let data: Vec<u8> = (0..64u32).map(|i| i as u8).collect();
		let store = store_with(data);
		let pool = PagePool::new(16);
		let stats = Stats::default();
		let page = PageCore::new(0x1000, 0, 16);

		let mut buf = [0u8; 8];
		let n = page.read(&store, &pool, &stats, 0x1000, &mut buf);
		assert_eq!(n, 8);
		assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);
		assert!(page.is_resident());

		// Second read is served from the buffer without touching the store.
		let mut buf2 = [0u8; 4];
		let n2 = page.read(&store, &pool, &stats, 0x1008, &mut buf2);
		assert_eq!(n2, 4);
		assert_eq!(buf2, [8, 9, 10, 11]);
		let snap = stats.snapshot();
		assert_eq!(snap.misses, 1);
		assert_eq!(snap.hits, 1);
	}

	#[test]
	fn short_backing_store_read_shrinks_size() {
		let data: Vec<u8> = (0..10u32).map(|i| i as u8).collect();
		let store = store_with(data);
		let pool = PagePool::new(16);
		let stats = Stats::default();
		let page = PageCore::new(0x2000, 0, 16);

		let mut buf = [0u8; 16];
		let n = page.read(&store, &pool, &stats, 0x2000, &mut buf);
		assert_eq!(n, 10);
		assert_eq!(page.size(), 10);

		// Reading past the short size returns 0.
		let mut buf2 = [0u8; 4];
		let n2 = page.read(&store, &pool, &stats, 0x200c, &mut buf2);
		assert_eq!(n2, 0);
	}

	#[test]
	fn zero_length_backing_read_marks_permanently_empty() {
		let store = store_with(vec![]);
		let pool = PagePool::new(16);
		let stats = Stats::default();
		let page = PageCore::new(0x3000, 0, 16);

		let mut buf = [0u8; 16];
		assert_eq!(page.read(&store, &pool, &stats, 0x3000, &mut buf), 0);
		assert_eq!(page.size(), 0);
		assert!(!page.is_resident());
	}

	#[test]
	fn unmapped_page_never_touches_store() {
		let store = store_with(vec![1, 2, 3]);
		let pool = PagePool::new(16);
		let stats = Stats::default();
		let page = PageCore::new_unmapped(0x9000);

		let mut buf = [0u8; 4];
		assert_eq!(page.read(&store, &pool, &stats, 0x9000, &mut buf), 0);
	}

	#[test]
	fn evict_releases_buffer_to_pool() {
		let data: Vec<u8> = (0..16u32).map(|i| i as u8).collect();
		let store = store_with(data);
		let pool = PagePool::new(16);
		let stats = Stats::default();
		let page = PageCore::new(0x4000, 0, 16);
		let mut buf = [0u8; 16];
		page.read(&store, &pool, &stats, 0x4000, &mut buf);
		assert!(page.is_resident());

		assert!(page.evict(&pool));
		assert!(!page.is_resident());
		assert_eq!(pool.free_count(), 1);
		assert!(!page.evict(&pool));
	}
}
