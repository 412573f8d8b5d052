// Copyright 2025 eraflo
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

//! Packed and unpacked snapshots of one user's data.
//!
//! A [`PackedSnapshot`] is the storage and transport form: metadata plus one
//! opaque payload per category. [`PackedSnapshot::unpack`] decodes it into an
//! [`UnpackedSnapshot`] holding live category values, dropping (and
//! reporting) any category that fails to decode instead of failing the
//! whole snapshot.

mod builder;
mod container;
mod format;
mod packed;
mod unpacked;

pub use self::builder::{BuildReport, SnapshotBuilder};
pub use self::format::{SnapshotHeader, HEADER_MAGIC_BYTES};
pub use self::packed::PackedSnapshot;
pub use self::unpacked::UnpackedSnapshot;

use crate::registry::CodecError;
use ferrosync_core::{DeserializationError, Identifier, SerializationError, SyncLogger};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The snapshot format version this build writes and the newest it reads.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Errors raised while framing or unframing a whole snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Fewer bytes than the header or declared body length require.
    #[error("snapshot is truncated: expected {expected} bytes, found {found}")]
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        found: usize,
    },
    /// Bytes remain after the declared body.
    #[error("{0} unexpected bytes after the snapshot body")]
    TrailingBytes(usize),
    /// The input does not start with the snapshot magic bytes.
    #[error("not a ferrosync snapshot (bad magic bytes)")]
    BadMagic,
    /// The header names an adapter this build does not know.
    #[error("unknown data adapter id {0}")]
    UnknownAdapter(u8),
    /// The snapshot was written by a newer format version.
    #[error("snapshot format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
        /// Newest supported version.
        supported: u32,
    },
    /// The container body could not be encoded.
    #[error("failed to encode snapshot container")]
    Encode(#[source] SerializationError),
    /// The container body could not be decoded.
    #[error("failed to decode snapshot container")]
    Decode(#[source] DeserializationError),
}

/// A category left out of a snapshot, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedCategory {
    /// The category left out.
    pub identifier: Identifier,
    /// The codec failure that caused it.
    pub reason: CodecError,
}

impl fmt::Display for DroppedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.reason)
    }
}

fn log_dropped(logger: &dyn SyncLogger, action: &str, snapshot_id: Uuid, dropped: &DroppedCategory) {
    logger.log(
        log::Level::Warn,
        &format!(
            "Dropped category {} while {action} snapshot {snapshot_id}",
            dropped.identifier
        ),
        Some(&dropped.reason),
    );
}
