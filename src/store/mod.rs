// SPDX-License-Identifier: Apache-2.0

//! The backing store: random-access read of raw bytes from a file offset.

mod mmap;
mod stream;

pub use mmap::MmapStore;
pub use stream::StreamStore;

/// A random-access byte source. Never fails across this boundary — an
/// out-of-range offset or an I/O error both collapse to a short or zero
/// byte count.
pub trait BackingStore: Send + Sync {
	/// Reads up to `out.len()` bytes starting at `file_offset`, returning the
	/// number of bytes actually read. Fewer bytes than requested are
	/// returned only at end-of-file (or on I/O error, which is absorbed
	/// rather than propagated).
	fn read(&self, file_offset: u64, out: &mut [u8]) -> usize;

	/// Declares whether concurrent `read` calls proceed independently
	/// (`true`, e.g. a read-only mmap) or are internally serialised behind a
	/// single lock (`false`, e.g. a shared file cursor). Every
	/// implementation in this crate is safe to call from multiple threads
	/// either way — this is advisory, surfaced through `CacheConfig` so a
	/// caller can tell whether concurrent reads will actually parallelise
	/// or just queue up.
	fn is_thread_safe(&self) -> bool;

	/// Total addressable length of the store, if known. Used only for
	/// diagnostics; the core never trusts this over actual short reads.
	fn len(&self) -> Option<u64> { None }
}
