// SPDX-License-Identifier: Apache-2.0

//! The segment-sized cache's background trimmer: a single worker thread
//! that wakes on a condition variable — signalled whenever a page is filled
//! — or after a fallback timeout, and evicts resident buffers oldest-first
//! until the cache is back under its byte budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use parking_lot::{Condvar, Mutex};

const FALLBACK_WAIT: Duration = Duration::from_secs(10);

/// A handle to the running trimmer thread. Dropping it shuts the thread
/// down, but `SegmentSizedCache::close` is expected to do so explicitly and
/// join it, so errors surface at a predictable point rather than in a
/// destructor.
pub struct Trimmer {
	shutdown: Arc<AtomicBool>,
	wake: Arc<(Mutex<()>, Condvar)>,
	handle: Option<JoinHandle<()>>,
}

impl Trimmer {
	/// Spawns the trimmer thread, invoking `trim_once` every time it wakes.
	pub fn spawn<F>(trim_once: F) -> Self
	where
		F: Fn() + Send + 'static,
	{
		let shutdown = Arc::new(AtomicBool::new(false));
		let wake = Arc::new((Mutex::new(()), Condvar::new()));

		let shutdown_thread = shutdown.clone();
		let wake_thread = wake.clone();
		let handle = std::thread::Builder::new()
			.name("dbgmem-trimmer".into())
			.spawn(move || {
				let (lock, cvar) = &*wake_thread;
				loop {
					if shutdown_thread.load(Ordering::Acquire) {
						break;
					}
					trim_once();
					let mut guard = lock.lock();
					if shutdown_thread.load(Ordering::Acquire) {
						break;
					}
					cvar.wait_for(&mut guard, FALLBACK_WAIT);
				}
			})
			.expect("failed to spawn trimmer thread");

		Self { shutdown, wake, handle: Some(handle) }
	}

	/// Wakes the trimmer immediately instead of waiting for the fallback
	/// timeout — called whenever a fill might have pushed the cache over
	/// budget.
	pub fn notify(&self) {
		let (_, cvar) = &*self.wake;
		cvar.notify_one();
	}

	/// Signals shutdown and joins the thread. Idempotent.
	pub fn shutdown(&mut self) {
		self.shutdown.store(true, Ordering::Release);
		self.notify();
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

impl Drop for Trimmer {
	fn drop(&mut self) {
		self.shutdown();
	}
}
