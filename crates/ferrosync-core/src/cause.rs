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

//! Why a snapshot was captured.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The event that triggered a snapshot capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveCause {
    /// The player left the server.
    Disconnect,
    /// The world was saved.
    WorldSave,
    /// The player died.
    Death,
    /// The server is shutting down.
    ServerShutdown,
    /// An operator edited the player's inventory.
    InventoryCommand,
    /// An operator edited the player's ender chest.
    EnderChestCommand,
    /// A previous snapshot was restored.
    BackupRestore,
    /// Captured through the programmatic API.
    Api,
    /// Converted from a legacy data layout.
    LegacyMigration,
    /// A cause defined by a third party.
    Custom(String),
}

impl SaveCause {
    /// A human-readable name, e.g. `"World Save"`.
    pub fn display_name(&self) -> String {
        match self {
            SaveCause::Disconnect => "Disconnect".into(),
            SaveCause::WorldSave => "World Save".into(),
            SaveCause::Death => "Death".into(),
            SaveCause::ServerShutdown => "Server Shutdown".into(),
            SaveCause::InventoryCommand => "Inventory Command".into(),
            SaveCause::EnderChestCommand => "Ender Chest Command".into(),
            SaveCause::BackupRestore => "Backup Restore".into(),
            SaveCause::Api => "API".into(),
            SaveCause::LegacyMigration => "Legacy Migration".into(),
            SaveCause::Custom(name) => name.clone(),
        }
    }
}

impl fmt::Display for SaveCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn causes_serialize_in_screaming_case() {
        assert_eq!(
            serde_json::to_string(&SaveCause::ServerShutdown).unwrap(),
            "\"SERVER_SHUTDOWN\""
        );
        let custom: SaveCause = serde_json::from_str("{\"CUSTOM\":\"arena_exit\"}").unwrap();
        assert_eq!(custom, SaveCause::Custom("arena_exit".into()));
        assert_eq!(custom.to_string(), "arena_exit");
    }
}
