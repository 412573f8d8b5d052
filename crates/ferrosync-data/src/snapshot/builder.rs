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
use crate::holder::UserDataHolder;
use crate::model::CategoryData;
use crate::registry::CodecRegistry;
use ferrosync_core::{FeatureToggles, Identifier, SaveCause, SyncLogger};
use indexmap::IndexMap;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// What happened to each category while building a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Categories encoded into the snapshot, in order.
    pub captured: Vec<Identifier>,
    /// Enabled categories the source had no value for.
    pub absent: Vec<Identifier>,
    /// Categories skipped because the toggles disable them.
    pub disabled: Vec<Identifier>,
    /// Categories whose value failed to encode.
    pub failed: Vec<DroppedCategory>,
}

/// Assembles a [`PackedSnapshot`] from a user or from explicit values.
///
/// Only enabled categories are captured. A category that fails to encode is
/// logged and left out without affecting the others.
pub struct SnapshotBuilder<'a> {
    registry: &'a CodecRegistry,
    toggles: &'a dyn FeatureToggles,
    logger: &'a dyn SyncLogger,
    cause: SaveCause,
    server_name: String,
    pinned: bool,
    id: Option<Uuid>,
    timestamp: Option<OffsetDateTime>,
}

impl<'a> SnapshotBuilder<'a> {
    /// A builder for an unpinned snapshot with cause [`SaveCause::Api`].
    pub fn new(
        registry: &'a CodecRegistry,
        toggles: &'a dyn FeatureToggles,
        logger: &'a dyn SyncLogger,
    ) -> Self {
        Self {
            registry,
            toggles,
            logger,
            cause: SaveCause::Api,
            server_name: String::new(),
            pinned: false,
            id: None,
            timestamp: None,
        }
    }

    /// Sets why the snapshot is captured.
    pub fn cause(mut self, cause: SaveCause) -> Self {
        self.cause = cause;
        self
    }

    /// Sets the capturing server's name.
    pub fn server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    /// Pins the snapshot.
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Uses `id` instead of a random id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Uses `timestamp` instead of the current time.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Captures every enabled category `user` has a value for.
    pub fn build(self, user: &dyn UserDataHolder) -> PackedSnapshot {
        self.build_with_report(user).0
    }

    /// Like [`SnapshotBuilder::build`], also reporting what was captured.
    pub fn build_with_report(self, user: &dyn UserDataHolder) -> (PackedSnapshot, BuildReport) {
        let mut report = BuildReport::default();
        let mut values = Vec::new();
        for identifier in self.registry.identifiers() {
            if !identifier.is_custom() && !self.toggles.is_sync_enabled(&identifier) {
                report.disabled.push(identifier);
                continue;
            }
            match user.data(&identifier) {
                Some(value) => values.push((identifier, value)),
                None => report.absent.push(identifier),
            }
        }
        self.encode_all(values, report)
    }

    /// Builds from explicit values, in the order given.
    ///
    /// Disabled and unregistered categories are left out, the latter logged.
    pub fn build_from(
        self,
        entries: impl IntoIterator<Item = (Identifier, Arc<dyn CategoryData>)>,
    ) -> PackedSnapshot {
        let mut report = BuildReport::default();
        let values = entries
            .into_iter()
            .filter(|(identifier, _)| {
                let enabled = identifier.is_custom() || self.toggles.is_sync_enabled(identifier);
                if !enabled {
                    report.disabled.push(identifier.clone());
                }
                enabled
            })
            .collect();
        self.encode_all(values, report).0
    }

    fn encode_all(
        self,
        values: Vec<(Identifier, Arc<dyn CategoryData>)>,
        mut report: BuildReport,
    ) -> (PackedSnapshot, BuildReport) {
        let id = self.id.unwrap_or_else(Uuid::new_v4);
        let mut data = IndexMap::with_capacity(values.len());

        for (identifier, value) in values {
            match self.registry.encode(&identifier, value.as_ref()) {
                Ok(bytes) => {
                    report.captured.push(identifier.clone());
                    data.insert(identifier, bytes);
                }
                Err(reason) => {
                    let dropped = DroppedCategory { identifier, reason };
                    log_dropped(self.logger, "building", id, &dropped);
                    report.failed.push(dropped);
                }
            }
        }

        let snapshot = PackedSnapshot::from_parts(
            id,
            self.pinned,
            self.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            self.cause,
            self.server_name,
            data,
        );
        (snapshot, report)
    }
}
