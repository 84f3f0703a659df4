// SPDX-License-Identifier: Apache-2.0

//! The byte-budgeted page cache variant: every page of every segment is
//! described up front at construction, so there is no insert-time
//! allocation of descriptors — only their buffers come and go. A background
//! [`Trimmer`] keeps total resident bytes under the configured budget by
//! evicting the oldest (by access age) resident pages.
//!
//! Eviction order is tracked with a plain monotonic age counter rather than
//! an LRU list: the trimmer sweeps all descriptors, sorts the resident ones
//! by age, and evicts oldest-first until back under budget (see
//! `DESIGN.md` for why a single age-sorted sweep replaces a fixed-pass
//! scheme).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::cache::PageCache;
use crate::entry::PageCore;
use crate::pool::PagePool;
use crate::segment::SegmentMap;
use crate::stats::Stats;
use crate::store::BackingStore;
use crate::trimmer::Trimmer;

struct Shared {
	page_size: usize,
	max_bytes: usize,
	/// Flattened across every segment; `segment_starts[i]` is the index of
	/// segment `i`'s first page.
	pages: Vec<Arc<PageCore>>,
	ages: Vec<AtomicU64>,
	segment_starts: Vec<usize>,
	segments: SegmentMap,
	pool: Arc<PagePool>,
	store: Arc<dyn BackingStore>,
	stats: Arc<Stats>,
	age_counter: AtomicU64,
}

impl Shared {
	fn page_index(&self, base: u64) -> Option<usize> {
		let (seg_idx, offset) = self.segments.find(base)?;
		let page_in_segment = (offset as usize) / self.page_size;
		Some(self.segment_starts[seg_idx] + page_in_segment)
	}

	fn trim_once(&self) {
		let mut resident: Vec<(u64, usize)> = self
			.pages
			.iter()
			.enumerate()
			.filter(|(_, p)| p.is_resident())
			.map(|(i, _)| (self.ages[i].load(Ordering::Relaxed), i))
			.collect();

		let mut total: u64 = resident.iter().map(|&(_, i)| self.pages[i].size() as u64).sum();
		if total <= self.max_bytes as u64 {
			return;
		}

		resident.sort_by_key(|&(age, _)| age);
		for (_, idx) in resident {
			if total <= self.max_bytes as u64 {
				break;
			}
			let page = &self.pages[idx];
			let size = page.size() as u64;
			if page.evict(&self.pool) {
				total = total.saturating_sub(size);
				self.stats.record_page_out();
			}
		}
	}
}

pub struct SegmentSizedCache {
	shared: Arc<Shared>,
	/// `Mutex`-wrapped so `close()` — part of the shared-by-reference
	/// `PageCache` trait — can join the thread without needing `&mut self`.
	trimmer: parking_lot::Mutex<Option<Trimmer>>,
}

impl SegmentSizedCache {
	pub fn new(
		page_size: usize,
		max_bytes: usize,
		segments: SegmentMap,
		pool: Arc<PagePool>,
		store: Arc<dyn BackingStore>,
		stats: Arc<Stats>,
	) -> Self {
		let mut pages = Vec::new();
		let mut segment_starts = Vec::with_capacity(segments.len());

		for seg in segments.segments() {
			segment_starts.push(pages.len());
			let mut remaining = seg.length;
			let mut va = seg.va_start;
			while remaining > 0 {
				let size = (page_size as u64).min(remaining) as usize;
				let file_offset = seg.file_offset_of(va);
				pages.push(Arc::new(PageCore::new(va, file_offset, size)));
				va += size as u64;
				remaining -= size as u64;
			}
		}
		let ages = pages.iter().map(|_| AtomicU64::new(0)).collect();

		let shared = Arc::new(Shared {
			page_size,
			max_bytes,
			pages,
			ages,
			segment_starts,
			segments,
			pool,
			store,
			stats,
			age_counter: AtomicU64::new(0),
		});

		let trim_shared = shared.clone();
		let trimmer = Trimmer::spawn(move || trim_shared.trim_once());

		Self { shared, trimmer: parking_lot::Mutex::new(Some(trimmer)) }
	}

	/// Number of pre-described page descriptors across every segment.
	pub fn descriptor_count(&self) -> usize {
		self.shared.pages.len()
	}

	pub fn resident_bytes(&self) -> u64 {
		self.shared
			.pages
			.iter()
			.filter(|p| p.is_resident())
			.map(|p| p.size() as u64)
			.sum()
	}
}

impl PageCache for SegmentSizedCache {
	fn get_or_create(&self, base: u64) -> Arc<PageCore> {
		match self.shared.page_index(base) {
			Some(idx) => self.shared.pages[idx].clone(),
			// No segment covers this address; not worth pre-describing, so
			// hand back a one-off permanently-empty descriptor.
			None => Arc::new(PageCore::new_unmapped(base)),
		}
	}

	fn touch(&self, page: &PageCore, bytes_read: usize) {
		if let Some(idx) = self.shared.page_index(page.base_va()) {
			let age = self.shared.age_counter.fetch_add(1, Ordering::AcqRel);
			self.shared.ages[idx].store(age, Ordering::Relaxed);
		}
		if bytes_read > 0 {
			if let Some(trimmer) = self.trimmer.lock().as_ref() {
				trimmer.notify();
			}
		}
	}

	fn flush(&self) {
		for page in &self.shared.pages {
			if page.evict(&self.shared.pool) {
				self.shared.stats.record_page_out();
			}
		}
	}

	fn close(&self) {
		if let Some(mut trimmer) = self.trimmer.lock().take() {
			trimmer.shutdown();
		}
		self.flush();
	}
}

impl Drop for SegmentSizedCache {
	fn drop(&mut self) {
		if let Some(mut trimmer) = self.trimmer.lock().take() {
			trimmer.shutdown();
		}
	}
}
