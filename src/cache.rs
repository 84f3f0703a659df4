// SPDX-License-Identifier: Apache-2.0

//! The capability shared by both cache variants: look up or materialise a
//! page descriptor, evict everything, and release background resources.
//! The read facade (`facade.rs`) is written entirely against this trait, so
//! it never needs to know which variant backs it.

use std::sync::Arc;
use crate::entry::PageCore;
use crate::pool::PagePool;
use crate::stats::Stats;
use crate::store::BackingStore;

pub trait PageCache: Send + Sync {
	/// Returns the page descriptor covering the page-aligned address `base`,
	/// creating it if this is the first time it's been seen (LRU variant)
	/// or simply looking it up among the pre-built descriptors (segment-sized
	/// variant). Never itself performs backing-store I/O.
	fn get_or_create(&self, base: u64) -> Arc<PageCore>;

	/// Called once after every read of `page`, with the number of bytes the
	/// read actually produced. Updates whatever eviction bookkeeping the
	/// variant keeps beyond what `get_or_create` already did — a no-op for
	/// the LRU variant (its list order is fixed at lookup time), age-stamping
	/// and trim-wake for the segment-sized variant.
	fn touch(&self, page: &PageCore, bytes_read: usize) {
		let _ = (page, bytes_read);
	}

	/// Evicts every resident page's buffer, keeping descriptors alive.
	fn flush(&self);

	/// Releases any background resources (the segment-sized variant's
	/// trimmer thread). Idempotent; safe to call from `Drop`.
	fn close(&self);

	fn page_size(&self) -> usize;
	fn stats(&self) -> &Stats;
	fn store(&self) -> &dyn BackingStore;
	fn pool(&self) -> &PagePool;
}
