// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! ## How it works
//!
//! A cache sits between a typed, random-access read API and a raw, offset
//! addressed *backing store* (a memory-mapped dump file, or a live
//! process's memory read through a stream handle). Reads are addressed by
//! virtual address; the [`segment`] map translates a VA to a file offset,
//! and the cache keeps the page-aligned chunk covering that address
//! resident so repeat and neighboring reads are served from memory instead
//! of going back to the store.
//!
//! ### Pages
//!
//! Data is read from the backing store in page-sized chunks and kept in
//! buffers drawn from a [`pool`], amortising allocation across fills and
//! evictions. Each page is independently synchronised
//! ([`entry::PageCore`]), so concurrent reads of different pages never
//! contend, and a read of an already-resident page never takes an
//! exclusive lock.
//!
//! Two eviction strategies are provided, selected through [`config::CacheConfig`]:
//!
//! - [`lru_cache::LruCache`] bounds residency by a fixed page count, evicting
//!   the least-recently-touched page whenever a new one must be created.
//! - [`segment_cache::SegmentSizedCache`] bounds residency by a total byte
//!   budget. Every page of every segment is described up front; a background
//!   [`trimmer::Trimmer`] thread periodically evicts the oldest resident
//!   pages to stay under budget, rather than evicting synchronously on the
//!   read path.
//!
//! ### Reading
//!
//! [`facade::MemoryReader`] is the public entry point: it walks however many
//! pages a read spans, and layers typed helpers (`read_value`,
//! `read_pointer`) over the raw byte read.

pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod facade;
pub mod lru_cache;
pub mod pool;
pub mod segment;
pub mod segment_cache;
pub mod stats;
pub mod store;
mod trimmer;

pub use cache::PageCache;
pub use config::{CacheConfig, Variant, DEFAULT_PAGE_SIZE};
pub use error::{ErrorKind, Result};
pub use facade::{MemoryReader, PointerWidth};
pub use lru_cache::LruCache;
pub use pool::PagePool;
pub use segment::{Segment, SegmentMap, SegmentRange};
pub use segment_cache::SegmentSizedCache;
pub use stats::{Stats, StatsSnapshot};
pub use store::{BackingStore, MmapStore, StreamStore};

use std::sync::Arc;

/// Builds a [`MemoryReader`] from a validated [`CacheConfig`], an address
/// space description, and a backing store — the single entry point a
/// caller is expected to use.
pub fn open(
	config: CacheConfig,
	segments: SegmentMap,
	store: Arc<dyn BackingStore>,
	pointer_width: PointerWidth,
) -> Result<MemoryReader> {
	let config = config.build()?;
	let stats = Arc::new(Stats::default());
	let pool = Arc::new(PagePool::new(config.page_size()));

	let cache: Arc<dyn PageCache> = match config.variant() {
		Variant::Lru { capacity_pages } => Arc::new(LruCache::new(
			config.page_size(),
			capacity_pages,
			segments,
			pool,
			store,
			stats,
		)),
		Variant::SegmentSized { max_bytes } => Arc::new(SegmentSizedCache::new(
			config.page_size(),
			max_bytes,
			segments,
			pool,
			store,
			stats,
		)),
	};

	Ok(MemoryReader::new(cache, pointer_width))
}
