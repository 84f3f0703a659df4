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

//! Error types for cache construction. Runtime reads never fail this way —
//! they degrade to short/zero byte counts instead (see the read facade).
//! Only bad construction configuration is propagated as fatal.

use thiserror::Error;

/// Why a [`crate::CacheConfig`] failed to build.
#[derive(Copy, Clone, Debug, Error)]
pub enum ErrorKind {
	#[error("page size {0} is not a power of two")]
	PageSizeNotPowerOfTwo(usize),
	#[error("page size must be non-zero")]
	ZeroPageSize,
	#[error("capacity must be non-zero")]
	ZeroCapacity,
}

pub type Result<T = (), E = ErrorKind> = std::result::Result<T, E>;
