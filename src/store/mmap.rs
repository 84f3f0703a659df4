// SPDX-License-Identifier: Apache-2.0

//! A memory-mapped, read-only file backing store — the preferred, zero-copy
//! variant: the only copy is the one into the caller's page buffer.

use std::fs::File;
use std::io;
use std::path::Path;
use memmap2::Mmap;
use super::BackingStore;

/// Wraps a read-only memory-mapped file. An immutable mapped view has no
/// shared mutable state, so it's unconditionally thread-safe.
pub struct MmapStore {
	mmap: Mmap,
}

impl MmapStore {
	pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
		let file = File::open(path)?;
		// SAFETY: the mapped file is treated as read-only for the lifetime of
		// this store; callers are responsible for not mutating the backing
		// file out from under the mapping.
		let mmap = unsafe { Mmap::map(&file)? };
		Ok(Self { mmap })
	}

	pub fn from_mmap(mmap: Mmap) -> Self {
		Self { mmap }
	}
}

impl BackingStore for MmapStore {
	fn read(&self, file_offset: u64, out: &mut [u8]) -> usize {
		let Ok(offset) = usize::try_from(file_offset) else { return 0 };
		if offset >= self.mmap.len() {
			return 0;
		}
		let available = self.mmap.len() - offset;
		let n = out.len().min(available);
		out[..n].copy_from_slice(&self.mmap[offset..offset + n]);
		n
	}

	fn is_thread_safe(&self) -> bool { true }

	fn len(&self) -> Option<u64> { Some(self.mmap.len() as u64) }
}
