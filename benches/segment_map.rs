// SPDX-License-Identifier: Apache-2.0

use criterion::{Criterion, criterion_group, criterion_main};
use dbgmem::{Segment, SegmentMap};

const SEGMENT_COUNT: u64 = 4096;
const SEGMENT_LEN: u64 = 0x10000;

fn sparse_map() -> SegmentMap {
	// Every other segment-length range is a gap, so lookups exercise both
	// hits and the binary-search miss path.
	let segments = (0..SEGMENT_COUNT)
		.map(|i| Segment::new(i * SEGMENT_LEN * 2, SEGMENT_LEN, i * SEGMENT_LEN))
		.collect();
	SegmentMap::new(segments)
}

fn find(c: &mut Criterion) {
	let map = sparse_map();
	let mut group = c.benchmark_group("segment_map_find");

	group.bench_function("hit_middle", |b| {
		let va = (SEGMENT_COUNT / 2) * SEGMENT_LEN * 2;
		b.iter(|| map.find(va))
	});
	group.bench_function("miss_in_gap", |b| {
		let va = (SEGMENT_COUNT / 2) * SEGMENT_LEN * 2 + SEGMENT_LEN + 1;
		b.iter(|| map.find(va))
	});
	group.finish();
}

fn iterate(c: &mut Criterion) {
	let map = sparse_map();
	c.bench_function("segment_map_iterate_contiguous_span", |b| {
		let va = (SEGMENT_COUNT / 2) * SEGMENT_LEN * 2;
		b.iter(|| map.iterate(va, SEGMENT_LEN).count())
	});
}

criterion_group!(benches, find, iterate);
criterion_main!(benches);
