// SPDX-License-Identifier: Apache-2.0

//! A stream-based backing store for handles that can't be memory-mapped.
//! Because the underlying handle is stateful (a single file cursor shared
//! across reads), this store must linearise concurrent reads itself — done
//! with a `parking_lot::Mutex`.
//!
//! This is the generic shape a live-process reader would plug into; the
//! actual OS-specific process-memory interop (ptrace, ReadProcessMemory,
//! …) is an external collaborator and stays out of scope here.

use std::io::{Read, Seek, SeekFrom};
use parking_lot::Mutex;
use super::BackingStore;

pub struct StreamStore<R> {
	inner: Mutex<R>,
}

impl<R: Read + Seek> StreamStore<R> {
	pub fn new(reader: R) -> Self {
		Self { inner: Mutex::new(reader) }
	}
}

impl<R: Read + Seek + Send> BackingStore for StreamStore<R> {
	fn read(&self, file_offset: u64, out: &mut [u8]) -> usize {
		let mut guard = self.inner.lock();
		if guard.seek(SeekFrom::Start(file_offset)).is_err() {
			return 0;
		}
		let mut total = 0;
		while total < out.len() {
			match guard.read(&mut out[total..]) {
				Ok(0) => break,
				Ok(n) => total += n,
				Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(_) => break,
			}
		}
		total
	}

	fn is_thread_safe(&self) -> bool { false }
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn reads_from_arbitrary_offset() {
		let data: Vec<u8> = (0..256).map(|i| i as u8).collect();
		let store = StreamStore::new(Cursor::new(data));
		let mut buf = [0u8; 8];
		assert_eq!(store.read(0x10, &mut buf), 8);
		assert_eq!(buf, [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]);
	}

	#[test]
	fn short_read_at_end() {
		let data: Vec<u8> = (0..10).collect();
		let store = StreamStore::new(Cursor::new(data));
		let mut buf = [0u8; 16];
		assert_eq!(store.read(4, &mut buf), 6);
	}

	#[test]
	fn seek_past_end_is_zero() {
		let data: Vec<u8> = (0..10).collect();
		let store = StreamStore::new(Cursor::new(data));
		let mut buf = [0u8; 4];
		assert_eq!(store.read(100, &mut buf), 0);
	}
}
