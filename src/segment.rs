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

//! The address-space map: an immutable, ordered collection of VA-range to
//! file-offset segments.

/// An immutable, disjoint, contiguous VA range backed by a known file
/// offset.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Segment {
	pub va_start: u64,
	pub length: u64,
	pub file_offset: u64,
}

impl Segment {
	pub fn new(va_start: u64, length: u64, file_offset: u64) -> Self {
		Self { va_start, length, file_offset }
	}

	#[inline]
	pub fn va_end(&self) -> u64 { self.va_start + self.length }

	#[inline]
	pub fn contains(&self, va: u64) -> bool {
		va >= self.va_start && va < self.va_end()
	}

	/// Maps a VA known to lie within this segment to a file offset.
	#[inline]
	pub fn file_offset_of(&self, va: u64) -> u64 {
		self.file_offset + (va - self.va_start)
	}
}

/// A sub-range of a [`Segment`] intersecting a requested VA range, yielded
/// by [`SegmentMap::iterate`].
#[derive(Copy, Clone, Debug)]
pub struct SegmentRange {
	pub segment_index: usize,
	pub va_start: u64,
	pub va_end: u64,
}

/// Ordered sequence of [`Segment`]s, sorted and disjoint by construction
/// invariant. Lookup is binary search by VA; lifetime is created once at
/// cache open, released at close (the map owns no backing-store handle, so
/// "release" is simply dropping it).
#[derive(Clone, Debug, Default)]
pub struct SegmentMap {
	segments: Vec<Segment>,
}

impl SegmentMap {
	/// Builds a map from already-sorted, disjoint segments. Segments are
	/// sorted by `va_start` here defensively; callers must still guarantee
	/// disjointness (an overlapping segment set is a caller bug, not
	/// something this type can repair).
	pub fn new(mut segments: Vec<Segment>) -> Self {
		segments.sort_by_key(|s| s.va_start);
		Self { segments }
	}

	pub fn is_empty(&self) -> bool { self.segments.is_empty() }
	pub fn len(&self) -> usize { self.segments.len() }
	pub fn segments(&self) -> &[Segment] { &self.segments }

	/// Finds the segment containing `va`, if any, plus the offset within it.
	pub fn find(&self, va: u64) -> Option<(usize, u64)> {
		let idx = self.segments
			.partition_point(|s| s.va_start <= va)
			.checked_sub(1)?;
		let seg = &self.segments[idx];
		seg.contains(va).then(|| (idx, va - seg.va_start))
	}

	/// Maps a VA to a file offset, or `None` if unmapped — an out-of-bounds
	/// VA yields a zero-byte read at the facade, not an error here.
	pub fn file_offset(&self, va: u64) -> Option<u64> {
		let (idx, _) = self.find(va)?;
		Some(self.segments[idx].file_offset_of(va))
	}

	/// Yields each `(segment, sub-range)` intersecting `[va, va + len)`, in
	/// order, stopping at the first gap — the caller (the read facade) is
	/// responsible for treating a gap as "no more bytes available" when
	/// contiguity is required.
	pub fn iterate(&self, va: u64, len: u64) -> impl Iterator<Item = SegmentRange> + '_ {
		let end = va.saturating_add(len);
		let mut cursor = va;
		let mut stopped = false;
		std::iter::from_fn(move || {
			if stopped || cursor >= end {
				return None;
			}
			let (idx, _) = match self.find(cursor) {
				Some(found) => found,
				None => {
					stopped = true;
					return None;
				}
			};
			let seg = &self.segments[idx];
			let range_end = seg.va_end().min(end);
			let range = SegmentRange { segment_index: idx, va_start: cursor, va_end: range_end };
			if range_end < seg.va_end() {
				// The requested range ends inside this segment.
				cursor = end;
			} else {
				cursor = seg.va_end();
			}
			Some(range)
		})
	}
}
