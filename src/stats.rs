// SPDX-License-Identifier: Apache-2.0

//! Cache statistics. Counted per-cache instance rather than as a process-wide
//! singleton: a shared singleton would make independent caches opened in the
//! same process (two dumps at once) pollute each other's hit/miss ratios.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically non-decreasing counters tracked by a single cache instance.
#[derive(Default)]
pub struct Stats {
	hits: AtomicU64,
	misses: AtomicU64,
	multi_page_reads: AtomicU64,
	unaligned_reads: AtomicU64,
	page_outs: AtomicU64,
}

/// A point-in-time, `Copy`-able snapshot of [`Stats`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatsSnapshot {
	pub hits: u64,
	pub misses: u64,
	pub multi_page_reads: u64,
	pub unaligned_reads: u64,
	pub page_outs: u64,
}

impl Stats {
	pub(crate) fn record_hit(&self) { self.hits.fetch_add(1, Ordering::Relaxed); }
	pub(crate) fn record_miss(&self) { self.misses.fetch_add(1, Ordering::Relaxed); }
	pub(crate) fn record_multi_page_read(&self) { self.multi_page_reads.fetch_add(1, Ordering::Relaxed); }
	pub(crate) fn record_unaligned_read(&self) { self.unaligned_reads.fetch_add(1, Ordering::Relaxed); }
	pub(crate) fn record_page_out(&self) { self.page_outs.fetch_add(1, Ordering::Relaxed); }

	/// Resets every counter to zero, as `flush_resetting_stats()` does.
	pub(crate) fn reset(&self) {
		self.hits.store(0, Ordering::Relaxed);
		self.misses.store(0, Ordering::Relaxed);
		self.multi_page_reads.store(0, Ordering::Relaxed);
		self.unaligned_reads.store(0, Ordering::Relaxed);
		self.page_outs.store(0, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> StatsSnapshot {
		StatsSnapshot {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			multi_page_reads: self.multi_page_reads.load(Ordering::Relaxed),
			unaligned_reads: self.unaligned_reads.load(Ordering::Relaxed),
			page_outs: self.page_outs.load(Ordering::Relaxed),
		}
	}
}
