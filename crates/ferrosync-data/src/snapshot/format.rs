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

//! The byte framing every serialized snapshot starts with.
//!
//! A stored snapshot is a fixed-size [`SnapshotHeader`] followed by the
//! container body. The header names the adapter the body was written with,
//! so a reader never has to guess the encoding.

use super::SnapshotError;

/// Identifies a ferrosync snapshot ("FSYNCSNP").
pub const HEADER_MAGIC_BYTES: [u8; 8] = *b"FSYNCSNP";

/// The fixed-size header at the beginning of every stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Must equal [`HEADER_MAGIC_BYTES`].
    pub magic_bytes: [u8; 8],
    /// Snapshot format version the body was written with.
    pub format_version: u32,
    /// Id of the adapter that encoded the body.
    pub adapter_id: u8,
    /// Length of the body that follows, in bytes.
    pub payload_length: u64,
}

// Fixed layout, written by hand rather than through serde.
impl SnapshotHeader {
    /// The size of the header in bytes.
    pub const SIZE: usize = 8 + 4 + 1 + 8;

    /// A header for a body of `payload_length` bytes.
    pub fn new(format_version: u32, adapter_id: u8, payload_length: u64) -> Self {
        Self {
            magic_bytes: HEADER_MAGIC_BYTES,
            format_version,
            adapter_id,
            payload_length,
        }
    }

    /// Parses the header at the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < Self::SIZE {
            return Err(SnapshotError::Truncated {
                expected: Self::SIZE,
                found: bytes.len(),
            });
        }

        let mut magic_bytes = [0u8; 8];
        magic_bytes.copy_from_slice(&bytes[0..8]);
        if magic_bytes != HEADER_MAGIC_BYTES {
            return Err(SnapshotError::BadMagic);
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[8..12]);
        let adapter_id = bytes[12];
        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[13..Self::SIZE]);

        Ok(Self {
            magic_bytes,
            format_version: u32::from_le_bytes(version),
            adapter_id,
            payload_length: u64::from_le_bytes(length),
        })
    }

    /// The header's on-disk form.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..8].copy_from_slice(&self.magic_bytes);
        out[8..12].copy_from_slice(&self.format_version.to_le_bytes());
        out[12] = self.adapter_id;
        out[13..].copy_from_slice(&self.payload_length.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_stable() {
        let header = SnapshotHeader::new(1, 2, 300);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..8], b"FSYNCSNP");
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
        assert_eq!(bytes[12], 2);
        assert_eq!(&bytes[13..15], &[44, 1]);
        assert_eq!(SnapshotHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn short_or_foreign_input_is_rejected() {
        assert!(matches!(
            SnapshotHeader::from_bytes(b"FSYNC"),
            Err(SnapshotError::Truncated { expected: 21, found: 5 })
        ));
        let mut bytes = SnapshotHeader::new(1, 0, 0).to_bytes();
        bytes[0] = b'K';
        assert!(matches!(
            SnapshotHeader::from_bytes(&bytes),
            Err(SnapshotError::BadMagic)
        ));
    }
}
