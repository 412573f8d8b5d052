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

use ferrosync_core::SaveCause;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The adapter-encoded body that follows a [`super::SnapshotHeader`].
///
/// Category payloads are opaque codec output, so they travel as base64 text
/// keyed by the identifier's `namespace:key` form.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SnapshotContainer {
    pub id: Uuid,
    pub pinned: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub cause: SaveCause,
    pub server_name: String,
    pub data: IndexMap<String, String>,
}
