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

use super::{log_dropped, DroppedCategory, PackedSnapshot};
use crate::model::CategoryData;
use crate::registry::CodecRegistry;
use ferrosync_core::{FeatureToggles, Identifier, SaveCause, SyncLogger};
use indexmap::IndexMap;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// A snapshot whose categories have been decoded into live values.
///
/// Obtained only from [`PackedSnapshot::unpack`]; values can be inspected,
/// edited and packed back, or handed to an agent to apply.
#[derive(Debug, Clone)]
pub struct UnpackedSnapshot {
    id: Uuid,
    pinned: bool,
    timestamp: OffsetDateTime,
    cause: SaveCause,
    server_name: String,
    format_version: u32,
    data: IndexMap<Identifier, Arc<dyn CategoryData>>,
    dropped: Vec<DroppedCategory>,
}

impl UnpackedSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn from_parts(
        id: Uuid,
        pinned: bool,
        timestamp: OffsetDateTime,
        cause: SaveCause,
        server_name: String,
        format_version: u32,
        data: IndexMap<Identifier, Arc<dyn CategoryData>>,
        dropped: Vec<DroppedCategory>,
    ) -> Self {
        Self {
            id,
            pinned,
            timestamp,
            cause,
            server_name,
            format_version,
            data,
            dropped,
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

    /// The value of one category.
    pub fn data(&self, identifier: &Identifier) -> Option<&Arc<dyn CategoryData>> {
        self.data.get(identifier)
    }

    /// The value of one category, downcast to `T`.
    pub fn get<T: CategoryData>(&self, identifier: &Identifier) -> Option<&T> {
        self.data
            .get(identifier)
            .and_then(|value| value.as_any().downcast_ref::<T>())
    }

    /// Sets or replaces one category's value, returning the previous one.
    pub fn set_data(
        &mut self,
        identifier: Identifier,
        value: Arc<dyn CategoryData>,
    ) -> Option<Arc<dyn CategoryData>> {
        self.data.insert(identifier, value)
    }

    /// Removes one category, keeping the order of the rest.
    pub fn remove_data(&mut self, identifier: &Identifier) -> Option<Arc<dyn CategoryData>> {
        self.data.shift_remove(identifier)
    }

    /// Keeps only the categories `toggles` allows and returns the removed ones.
    ///
    /// Custom categories are never toggled off.
    pub fn retain_enabled(&mut self, toggles: &dyn FeatureToggles) -> Vec<Identifier> {
        let mut removed = Vec::new();
        self.data.retain(|identifier, _| {
            let keep = identifier.is_custom() || toggles.is_sync_enabled(identifier);
            if !keep {
                removed.push(identifier.clone());
            }
            keep
        });
        removed
    }

    /// Categories present, in stored order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> + '_ {
        self.data.keys()
    }

    /// Categories and values, in stored order.
    pub fn entries(&self) -> impl Iterator<Item = (&Identifier, &Arc<dyn CategoryData>)> + '_ {
        self.data.iter()
    }

    /// Number of categories present.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no category is present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Categories dropped while unpacking.
    pub fn dropped(&self) -> &[DroppedCategory] {
        &self.dropped
    }

    /// Consumes the snapshot, yielding its values in stored order.
    pub fn into_data(self) -> IndexMap<Identifier, Arc<dyn CategoryData>> {
        self.data
    }

    /// Encodes every value back into a packed snapshot.
    ///
    /// Values that fail to encode are logged and left out. Id, timestamp and
    /// the other metadata are kept.
    pub fn pack(&self, registry: &CodecRegistry, logger: &dyn SyncLogger) -> PackedSnapshot {
        let mut data = IndexMap::with_capacity(self.data.len());
        for (identifier, value) in &self.data {
            match registry.encode(identifier, value.as_ref()) {
                Ok(bytes) => {
                    data.insert(identifier.clone(), bytes);
                }
                Err(reason) => log_dropped(
                    logger,
                    "packing",
                    self.id,
                    &DroppedCategory {
                        identifier: identifier.clone(),
                        reason,
                    },
                ),
            }
        }
        PackedSnapshot::from_parts(
            self.id,
            self.pinned,
            self.timestamp,
            self.cause.clone(),
            self.server_name.clone(),
            data,
        )
    }
}
