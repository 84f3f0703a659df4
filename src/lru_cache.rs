// SPDX-License-Identifier: Apache-2.0

//! The fixed-capacity, strict-LRU page cache variant.
//!
//! The eviction list and its lookup table are guarded by a single
//! `parking_lot::Mutex` whose critical section is the O(1) list/map
//! bookkeeping only — list links are plain `Option<usize>` indices into a
//! `Vec` (an arena) rather than shared pointers, so there's nothing unsafe
//! or cyclic to reason about.
//!
//! A page's buffer fill (the expensive part, real I/O) happens *after* the
//! mutex is released, against a cloned `Arc<PageCore>` — this is why each
//! arena slot holds an `Arc` rather than the `PageCore` by value: an
//! in-flight reader must keep a page alive independent of whatever the list
//! does to its arena slot while that reader isn't holding the mutex. An
//! eviction therefore never mutates an outstanding page's identity; it only
//! swaps which `Arc` a slot points to, so a straggling reader's clone stays
//! exactly the page it asked for, just no longer reachable from the map.

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use crate::cache::PageCache;
use crate::entry::PageCore;
use crate::pool::PagePool;
use crate::segment::SegmentMap;
use crate::stats::Stats;
use crate::store::BackingStore;

struct Slot {
	page: Arc<PageCore>,
	prev: Option<usize>,
	next: Option<usize>,
}

struct Inner {
	arena: Vec<Slot>,
	map: HashMap<u64, usize>,
	head: Option<usize>,
	tail: Option<usize>,
}

impl Inner {
	fn detach(&mut self, idx: usize) {
		let (prev, next) = (self.arena[idx].prev, self.arena[idx].next);
		match prev {
			Some(p) => self.arena[p].next = next,
			None => self.head = next,
		}
		match next {
			Some(n) => self.arena[n].prev = prev,
			None => self.tail = prev,
		}
		self.arena[idx].prev = None;
		self.arena[idx].next = None;
	}

	fn push_front(&mut self, idx: usize) {
		self.arena[idx].prev = None;
		self.arena[idx].next = self.head;
		if let Some(h) = self.head {
			self.arena[h].prev = Some(idx);
		}
		self.head = Some(idx);
		if self.tail.is_none() {
			self.tail = Some(idx);
		}
	}
}

/// A paged cache holding at most `capacity_pages` resident page descriptors,
/// evicting the least-recently-touched one on every miss once full.
pub struct LruCache {
	page_size: usize,
	capacity: usize,
	segments: SegmentMap,
	pool: Arc<PagePool>,
	store: Arc<dyn BackingStore>,
	stats: Arc<Stats>,
	inner: Mutex<Inner>,
}

impl LruCache {
	pub fn new(
		page_size: usize,
		capacity_pages: usize,
		segments: SegmentMap,
		pool: Arc<PagePool>,
		store: Arc<dyn BackingStore>,
		stats: Arc<Stats>,
	) -> Self {
		Self {
			page_size,
			capacity: capacity_pages,
			segments,
			pool,
			store,
			stats,
			inner: Mutex::new(Inner {
				arena: Vec::with_capacity(capacity_pages),
				map: HashMap::new(),
				head: None,
				tail: None,
			}),
		}
	}

	pub fn page_size(&self) -> usize { self.page_size }
	pub fn stats(&self) -> &Stats { &self.stats }
	pub fn store(&self) -> &dyn BackingStore { self.store.as_ref() }
	pub fn pool(&self) -> &PagePool { &self.pool }

	fn make_page(&self, base: u64) -> Arc<PageCore> {
		match self.segments.find(base) {
			Some((idx, _)) => {
				let seg = &self.segments.segments()[idx];
				let file_offset = seg.file_offset_of(base);
				let size = self.page_size.min((seg.va_end() - base) as usize);
				Arc::new(PageCore::new(base, file_offset, size))
			}
			None => Arc::new(PageCore::new_unmapped(base)),
		}
	}

	/// Returns the resident (or freshly-inserted, unfilled) page descriptor
	/// covering `base`, which must already be page-aligned. This is the
	/// cache-wide-mutex critical section; the returned `Arc` is read/filled
	/// by the caller with the mutex released.
	///
	/// This does not itself record cache hit/miss statistics — finding a
	/// descriptor already in the LRU list doesn't mean its buffer is still
	/// resident (a `flush()` may have evicted it); [`PageCore::read`] is the
	/// single place that knows whether a read actually required a fetch.
	pub fn get_or_create(&self, base: u64) -> Arc<PageCore> {
		let mut inner = self.inner.lock();

		if let Some(&idx) = inner.map.get(&base) {
			inner.detach(idx);
			inner.push_front(idx);
			return inner.arena[idx].page.clone();
		}

		let page = self.make_page(base);

		if inner.arena.len() < self.capacity {
			let idx = inner.arena.len();
			inner.arena.push(Slot { page: page.clone(), prev: None, next: None });
			inner.map.insert(base, idx);
			inner.push_front(idx);
		} else {
			let tail = inner.tail.expect("capacity > 0 implies a tail once full");
			let evicted = inner.arena[tail].page.clone();
			evicted.evict(&self.pool);
			inner.map.remove(&evicted.base_va());
			inner.arena[tail].page = page.clone();
			inner.map.insert(base, tail);
			inner.detach(tail);
			inner.push_front(tail);
			self.stats.record_page_out();
		}

		page
	}

	/// Evicts every resident page's buffer without disturbing the LRU order
	/// or dropping descriptors — a flush empties buffers but keeps the
	/// entries (and their position in the list) alive.
	pub fn flush(&self) {
		let inner = self.inner.lock();
		for slot in &inner.arena {
			slot.page.evict(&self.pool);
		}
	}

	pub fn resident_count(&self) -> usize {
		let inner = self.inner.lock();
		inner.arena.iter().filter(|s| s.page.is_resident()).count()
	}

	pub fn len(&self) -> usize {
		self.inner.lock().arena.len()
	}
}

impl PageCache for LruCache {
	fn get_or_create(&self, base: u64) -> Arc<PageCore> { LruCache::get_or_create(self, base) }
	fn flush(&self) { LruCache::flush(self) }
	/// The LRU variant has no background thread; closing simply evicts
	/// every resident buffer so a caller that drops the cache afterwards
	/// doesn't hold pooled memory longer than necessary.
	fn close(&self) { LruCache::flush(self) }
	fn page_size(&self) -> usize { self.page_size }
	fn stats(&self) -> &Stats { &self.stats }
	fn store(&self) -> &dyn BackingStore { self.store.as_ref() }
	fn pool(&self) -> &PagePool { &self.pool }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::segment::Segment;
	use crate::store::StreamStore;
	use std::io::Cursor;

	fn harness(capacity: usize) -> LruCache {
		let data: Vec<u8> = (0..0x10000u32).map(|i| i as u8).collect();
		let store: Arc<dyn BackingStore> = Arc::new(StreamStore::new(Cursor::new(data)));
		let segments = SegmentMap::new(vec![Segment::new(0, 0x10000, 0)]);
		LruCache::new(0x1000, capacity, segments, Arc::new(PagePool::new(0x1000)), store, Arc::new(Stats::default()))
	}

	#[test]
	fn caches_pages_up_to_capacity() {
		let cache = harness(2);
		let a = cache.get_or_create(0);
		let b = cache.get_or_create(0x1000);
		assert_eq!(cache.len(), 2);
		assert!(Arc::ptr_eq(&a, &cache.get_or_create(0)));
		assert!(Arc::ptr_eq(&b, &cache.get_or_create(0x1000)));

		let mut buf = [0u8; 16];
		a.read(cache.store(), cache.pool(), cache.stats(), 0, &mut buf);
		a.read(cache.store(), cache.pool(), cache.stats(), 0, &mut buf);
		assert_eq!(cache.stats().snapshot().hits, 1);
		assert_eq!(cache.stats().snapshot().misses, 1);
	}

	#[test]
	fn evicts_least_recently_used_when_full() {
		let cache = harness(2);
		cache.get_or_create(0);
		cache.get_or_create(0x1000);
		// Touch 0 so 0x1000 becomes the LRU victim.
		cache.get_or_create(0);
		cache.get_or_create(0x2000);

		assert_eq!(cache.len(), 2);
		assert_eq!(cache.stats().snapshot().page_outs, 1);
		// 0x1000 was evicted; re-requesting it must allocate a fresh,
		// unfilled descriptor distinct from the one originally returned.
		let original = cache.get_or_create(0x1000);
		assert!(!original.is_resident());
	}

	#[test]
	fn out_of_segment_page_is_permanently_unmapped() {
		let cache = harness(2);
		let page = cache.get_or_create(0x80000);
		let mut buf = [0u8; 16];
		assert_eq!(page.read(cache.store(), cache.pool(), cache.stats(), 0x80000, &mut buf), 0);
	}

	#[test]
	fn flush_evicts_without_dropping_entries() {
		let cache = harness(2);
		let page = cache.get_or_create(0);
		cache.get_or_create(0x1000);
		let mut buf = [0u8; 16];
		page.read(cache.store(), cache.pool(), cache.stats(), 0, &mut buf);
		assert!(page.is_resident());

		cache.flush();
		assert_eq!(cache.resident_count(), 0);
		assert_eq!(cache.len(), 2);
	}
}
