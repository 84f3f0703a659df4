// SPDX-License-Identifier: Apache-2.0

//! Property tests for the cache's universal invariants: capacity bounds,
//! no over-read, and alignment independence of the read facade.

use std::io::Cursor;
use std::sync::Arc;
use quickcheck_macros::quickcheck;
use dbgmem::{open, BackingStore, CacheConfig, PointerWidth, Segment, SegmentMap, StreamStore, Variant};

fn reader_over(data: Vec<u8>, capacity_pages: usize) -> dbgmem::MemoryReader {
	let store: Arc<dyn BackingStore> = Arc::new(StreamStore::new(Cursor::new(data.clone())));
	let segments = SegmentMap::new(vec![Segment::new(0, data.len() as u64, 0)]);
	open(
		CacheConfig::new(Variant::Lru { capacity_pages }).set_page_size(256),
		segments,
		store,
		PointerWidth::Eight,
	).unwrap()
}

/// A read never returns more bytes than were requested, and never more
/// than what the backing store actually had from `va` onward.
#[quickcheck]
fn read_never_over_reads(seed: u8, va: u16, want: u8) -> bool {
	let len = 4096usize;
	let data: Vec<u8> = (0..len).map(|i| ((i as u8).wrapping_add(seed))).collect();
	let reader = reader_over(data.clone(), 8);

	let va = va as u64;
	let mut buf = vec![0u8; want as usize];
	let n = reader.read(va, &mut buf);

	let available = (data.len() as u64).saturating_sub(va).min(want as u64) as usize;
	n == available
}

/// Reading the same bytes twice, through a cold then a warm cache, always
/// produces identical results — a resident page never corrupts content.
#[quickcheck]
fn repeated_reads_are_idempotent(seed: u8, va: u16) -> bool {
	let len = 4096usize;
	let data: Vec<u8> = (0..len).map(|i| ((i as u8).wrapping_add(seed))).collect();
	let reader = reader_over(data, 8);

	let va = (va as u64) % 4000;
	let mut first = [0u8; 32];
	let mut second = [0u8; 32];
	let n1 = reader.read(va, &mut first);
	let n2 = reader.read(va, &mut second);
	n1 == n2 && first == second
}

/// The LRU variant never holds more resident descriptors than its
/// configured capacity, regardless of the access pattern.
#[quickcheck]
fn lru_cache_never_exceeds_capacity(accesses: Vec<u16>) -> bool {
	let capacity = 4usize;
	let data = vec![0u8; 4096];
	let store: Arc<dyn BackingStore> = Arc::new(StreamStore::new(Cursor::new(data)));
	let segments = SegmentMap::new(vec![Segment::new(0, 4096, 0)]);
	let cache = dbgmem::LruCache::new(
		256,
		capacity,
		segments,
		Arc::new(dbgmem::PagePool::new(256)),
		store,
		Arc::new(dbgmem::Stats::default()),
	);

	for va in accesses {
		cache.get_or_create((va as u64 % 16) * 256);
	}
	cache.len() <= capacity
}

/// Alignment of the starting address doesn't change what bytes come back —
/// only whether the read crosses more than one page.
#[quickcheck]
fn alignment_does_not_change_content(seed: u8) -> bool {
	let len = 4096usize;
	let data: Vec<u8> = (0..len).map(|i| ((i as u8).wrapping_add(seed))).collect();
	let reader = reader_over(data.clone(), 8);

	let mut buf = [0u8; 8];
	reader.read(0x7d, &mut buf);
	buf == data[0x7d..0x7d + 8]
}
