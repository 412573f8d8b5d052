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

use super::container::SnapshotContainer;
use super::{
    log_dropped, DroppedCategory, SnapshotError, SnapshotHeader, UnpackedSnapshot,
    CURRENT_FORMAT_VERSION,
};
use crate::codec::DataAdapter;
use crate::model::CategoryData;
use crate::registry::CodecRegistry;
use base64::Engine;
use ferrosync_core::{Identifier, SaveCause, SyncLogger};
use indexmap::IndexMap;
use log::Level;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// The storage form of a snapshot: metadata plus one opaque payload per category.
///
/// A packed snapshot never interprets its payloads; decoding them is the job
/// of [`PackedSnapshot::unpack`], which needs a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedSnapshot {
    id: Uuid,
    pinned: bool,
    timestamp: OffsetDateTime,
    cause: SaveCause,
    server_name: String,
    format_version: u32,
    data: IndexMap<Identifier, Vec<u8>>,
}

impl PackedSnapshot {
    pub(crate) fn from_parts(
        id: Uuid,
        pinned: bool,
        timestamp: OffsetDateTime,
        cause: SaveCause,
        server_name: String,
        data: IndexMap<Identifier, Vec<u8>>,
    ) -> Self {
        Self {
            id,
            pinned,
            timestamp,
            cause,
            server_name,
            format_version: CURRENT_FORMAT_VERSION,
            data,
        }
    }

    /// The snapshot's unique id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the snapshot is protected from rotation.
    pub fn pinned(&self) -> bool {
        self.pinned
    }

    /// Pins or unpins the snapshot.
    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    /// When the snapshot was captured.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Why the snapshot was captured.
    pub fn cause(&self) -> &SaveCause {
        &self.cause
    }

    /// The server the snapshot was captured on.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// The format version the snapshot was written with.
    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// The stored payload of one category.
    pub fn payload(&self, identifier: &Identifier) -> Option<&[u8]> {
        self.data.get(identifier).map(Vec::as_slice)
    }

    /// Replaces one category's raw payload, returning the previous one.
    ///
    /// The bytes are stored as-is and only checked when the snapshot is unpacked.
    pub fn set_payload(&mut self, identifier: Identifier, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.data.insert(identifier, bytes)
    }

    /// Removes one category's payload.
    pub fn remove_payload(&mut self, identifier: &Identifier) -> Option<Vec<u8>> {
        self.data.shift_remove(identifier)
    }

    /// Stored categories, in capture order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> + '_ {
        self.data.keys()
    }

    /// Number of stored categories.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no category is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total size of all payloads, in bytes.
    pub fn payload_size(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    /// A copy with the same data under a fresh id and timestamp.
    pub fn copy(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: OffsetDateTime::now_utc(),
            ..self.clone()
        }
    }

    /// Decodes every payload through `registry`.
    ///
    /// Categories that are not registered or whose payload fails to decode
    /// are logged and dropped; they are listed in
    /// [`UnpackedSnapshot::dropped`]. The surviving categories keep their
    /// stored order.
    pub fn unpack(&self, registry: &CodecRegistry, logger: &dyn SyncLogger) -> UnpackedSnapshot {
        let mut data: IndexMap<Identifier, Arc<dyn CategoryData>> = IndexMap::new();
        let mut dropped = Vec::new();

        for (identifier, bytes) in &self.data {
            match registry.decode(identifier, bytes) {
                Ok(value) => {
                    let canonical = registry
                        .canonical(identifier)
                        .unwrap_or_else(|| identifier.clone());
                    data.insert(canonical, value);
                }
                Err(reason) => {
                    let entry = DroppedCategory {
                        identifier: identifier.clone(),
                        reason,
                    };
                    log_dropped(logger, "unpacking", self.id, &entry);
                    dropped.push(entry);
                }
            }
        }

        UnpackedSnapshot::from_parts(
            self.id,
            self.pinned,
            self.timestamp,
            self.cause.clone(),
            self.server_name.clone(),
            self.format_version,
            data,
            dropped,
        )
    }

    /// Unpacks, lets `edit` modify the live values, and packs the result back.
    ///
    /// Categories that fail to decode are lost by the round trip.
    pub fn edit(
        &mut self,
        registry: &CodecRegistry,
        logger: &dyn SyncLogger,
        edit: impl FnOnce(&mut UnpackedSnapshot),
    ) {
        let mut unpacked = self.unpack(registry, logger);
        edit(&mut unpacked);
        *self = unpacked.pack(registry, logger);
    }

    /// Serializes the whole snapshot: header followed by the `adapter`-encoded body.
    pub fn to_bytes(&self, adapter: DataAdapter) -> Result<Vec<u8>, SnapshotError> {
        let engine = base64::engine::general_purpose::STANDARD;
        let container = SnapshotContainer {
            id: self.id,
            pinned: self.pinned,
            timestamp: self.timestamp,
            cause: self.cause.clone(),
            server_name: self.server_name.clone(),
            data: self
                .data
                .iter()
                .map(|(identifier, bytes)| (identifier.key_value(), engine.encode(bytes)))
                .collect(),
        };
        let body = adapter.to_bytes(&container).map_err(SnapshotError::Encode)?;

        let header = SnapshotHeader::new(self.format_version, adapter.id(), body.len() as u64);
        let mut out = Vec::with_capacity(SnapshotHeader::SIZE + body.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Parses bytes written by [`PackedSnapshot::to_bytes`].
    ///
    /// The adapter is read from the header. Payloads are not decoded. An
    /// entry whose key is not a valid identifier or whose payload is not
    /// valid base64 is logged and skipped; the other categories survive.
    pub fn from_bytes(bytes: &[u8], logger: &dyn SyncLogger) -> Result<Self, SnapshotError> {
        let header = SnapshotHeader::from_bytes(bytes)?;
        if header.format_version > CURRENT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: header.format_version,
                supported: CURRENT_FORMAT_VERSION,
            });
        }
        let adapter = DataAdapter::from_id(header.adapter_id)
            .ok_or(SnapshotError::UnknownAdapter(header.adapter_id))?;

        let body = &bytes[SnapshotHeader::SIZE..];
        let declared = usize::try_from(header.payload_length).unwrap_or(usize::MAX);
        if body.len() < declared {
            return Err(SnapshotError::Truncated {
                expected: SnapshotHeader::SIZE.saturating_add(declared),
                found: bytes.len(),
            });
        }
        if body.len() > declared {
            return Err(SnapshotError::TrailingBytes(body.len() - declared));
        }

        let container: SnapshotContainer =
            adapter.from_bytes(body).map_err(SnapshotError::Decode)?;
        let engine = base64::engine::general_purpose::STANDARD;
        let mut data = IndexMap::with_capacity(container.data.len());
        for (key, encoded) in container.data {
            let identifier = match Identifier::parse(&key) {
                Ok(identifier) => identifier,
                Err(e) => {
                    logger.log(
                        Level::Warn,
                        &format!("Skipped unreadable category key '{key}' in snapshot {}", container.id),
                        Some(&e),
                    );
                    continue;
                }
            };
            match engine.decode(encoded.as_bytes()) {
                Ok(payload) => {
                    data.insert(identifier, payload);
                }
                Err(e) => logger.log(
                    Level::Warn,
                    &format!("Skipped {identifier} in snapshot {}: payload is not valid base64", container.id),
                    Some(&e),
                ),
            }
        }

        Ok(Self {
            id: container.id,
            pinned: container.pinned,
            timestamp: container.timestamp,
            cause: container.cause,
            server_name: container.server_name,
            format_version: header.format_version,
            data,
        })
    }
}
