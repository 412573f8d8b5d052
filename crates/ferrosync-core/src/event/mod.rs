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

//! Lifecycle notifications for snapshot capture and apply.
//!
//! Hosts subscribe through an [`EventBus`] to learn when a snapshot was
//! created, applied, or failed to apply, without polling the agent.

mod bus;

pub use self::bus::EventBus;

use crate::identifier::Identifier;
use uuid::Uuid;

/// Something noteworthy that happened to one user's data.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A packed snapshot was captured.
    SnapshotCreated {
        /// The user the snapshot was captured from.
        username: String,
        /// The snapshot's id.
        snapshot_id: Uuid,
        /// Categories present in the snapshot, in stored order.
        categories: Vec<Identifier>,
    },
    /// A category was left out while packing or unpacking.
    CategoryDropped {
        /// The user the category belonged to.
        username: String,
        /// The snapshot concerned.
        snapshot_id: Uuid,
        /// The dropped category.
        identifier: Identifier,
        /// A rendered description of why.
        reason: String,
    },
    /// Every surviving category was applied.
    SnapshotApplied {
        /// The destination user.
        username: String,
        /// The applied snapshot's id.
        snapshot_id: Uuid,
        /// Categories applied, in order.
        applied: Vec<Identifier>,
    },
    /// Applying a snapshot aborted.
    ApplyFailed {
        /// The destination user.
        username: String,
        /// The snapshot whose apply failed.
        snapshot_id: Uuid,
        /// The category whose apply failed.
        identifier: Identifier,
        /// A rendered description of the failure.
        reason: String,
    },
}

impl SyncEvent {
    /// The user this event concerns.
    pub fn username(&self) -> &str {
        match self {
            SyncEvent::SnapshotCreated { username, .. }
            | SyncEvent::CategoryDropped { username, .. }
            | SyncEvent::SnapshotApplied { username, .. }
            | SyncEvent::ApplyFailed { username, .. } => username,
        }
    }
}
