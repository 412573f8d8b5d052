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

//! Host configuration loaded from a TOML file.
//!
//! ```toml
//! server_name = "survival-1"
//!
//! [snapshots]
//! adapter = "compressed_json"
//! auto_pin = ["INVENTORY_COMMAND", "BACKUP_RESTORE"]
//!
//! [synchronization.features]
//! location = true
//! statistics = false
//!
//! [workers]
//! threads = 4
//! ```
//!
//! Every section is optional. A built-in category missing from
//! `[synchronization.features]` uses its default toggle.

use ferrosync_core::{FeatureToggles, Identifier, SaveCause};
use ferrosync_data::DataAdapter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An error raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("failed to access settings file '{}'", .path.display())]
    Io {
        /// The file concerned.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The TOML is malformed or does not match the settings layout.
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    /// The settings could not be written as TOML.
    #[error("failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),
    /// A feature entry names no built-in category.
    #[error("unknown feature `{0}` in [synchronization.features]")]
    UnknownFeature(String),
    /// A value is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// How snapshots are encoded and which are pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    /// Adapter for simple value categories and snapshot containers.
    pub adapter: DataAdapter,
    /// Causes whose snapshots are pinned automatically.
    pub auto_pin: Vec<SaveCause>,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            adapter: DataAdapter::Json,
            auto_pin: vec![
                SaveCause::InventoryCommand,
                SaveCause::EnderChestCommand,
                SaveCause::BackupRestore,
                SaveCause::LegacyMigration,
            ],
        }
    }
}

/// Which built-in categories this server synchronizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynchronizationSettings {
    /// Built-in key (e.g. `inventory`) to whether it is synchronized.
    pub features: BTreeMap<String, bool>,
}

/// Worker pool sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Number of worker threads.
    pub threads: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self { threads: 2 }
    }
}

/// The complete host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Name stamped into snapshots captured on this server.
    pub server_name: String,
    /// Snapshot encoding and pinning.
    pub snapshots: SnapshotSettings,
    /// Category toggles.
    pub synchronization: SynchronizationSettings,
    /// Worker pool sizing.
    pub workers: WorkerSettings,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            server_name: "server".to_string(),
            snapshots: SnapshotSettings::default(),
            synchronization: SynchronizationSettings::default(),
            workers: WorkerSettings::default(),
        }
    }
}

impl SyncSettings {
    /// Reads and validates the settings at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        log::info!("Loaded sync settings from '{}'", path.display());
        Ok(settings)
    }

    /// Reads the settings at `path`, or the defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No settings at '{}'; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes the settings to `path` as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        fs::write(path, self.to_toml_string()?).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The settings as TOML text.
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks value ranges and feature names.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server_name.trim().is_empty() {
            return Err(SettingsError::Invalid("server_name must not be empty".into()));
        }
        if self.workers.threads == 0 {
            return Err(SettingsError::Invalid("workers.threads must be at least 1".into()));
        }
        let unknown = self
            .synchronization
            .features
            .keys()
            .find(|key| !Identifier::builtins().iter().any(|id| id.key() == key.as_str()));
        match unknown {
            Some(key) => Err(SettingsError::UnknownFeature(key.clone())),
            None => Ok(()),
        }
    }

    /// Turns a built-in category on or off. Custom categories cannot be toggled.
    pub fn set_feature(&mut self, identifier: &Identifier, enabled: bool) {
        if identifier.is_gated() {
            self.synchronization
                .features
                .insert(identifier.key().to_string(), enabled);
        }
    }
}

impl FeatureToggles for SyncSettings {
    fn is_sync_enabled(&self, identifier: &Identifier) -> bool {
        if identifier.is_custom() {
            return true;
        }
        self.synchronization
            .features
            .get(identifier.key())
            .copied()
            .unwrap_or_else(|| identifier.enabled_by_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_each_category() {
        let settings = SyncSettings::default();
        assert!(settings.is_sync_enabled(&Identifier::INVENTORY));
        assert!(!settings.is_sync_enabled(&Identifier::LOCATION));
        assert!(settings.is_sync_enabled(&Identifier::custom("bank", "coins").unwrap()));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings = SyncSettings::from_toml_str(
            r#"
            server_name = "lobby"

            [synchronization.features]
            location = true
            hunger = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.server_name, "lobby");
        assert_eq!(settings.snapshots.adapter, DataAdapter::Json);
        assert_eq!(settings.workers.threads, 2);
        assert!(settings.is_sync_enabled(&Identifier::LOCATION));
        assert!(!settings.is_sync_enabled(&Identifier::HUNGER));
    }

    #[test]
    fn unknown_features_and_bad_values_are_rejected() {
        let unknown = SyncSettings::from_toml_str("[synchronization.features]\nmana = true\n");
        assert!(matches!(unknown, Err(SettingsError::UnknownFeature(key)) if key == "mana"));

        let no_workers = SyncSettings::from_toml_str("[workers]\nthreads = 0\n");
        assert!(matches!(no_workers, Err(SettingsError::Invalid(_))));

        let bad_adapter = SyncSettings::from_toml_str("[snapshots]\nadapter = \"yaml\"\n");
        assert!(matches!(bad_adapter, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn set_feature_ignores_custom_categories() {
        let mut settings = SyncSettings::default();
        settings.set_feature(&Identifier::ENDER_CHEST, false);
        settings.set_feature(&Identifier::custom("bank", "coins").unwrap(), false);
        assert!(!settings.is_sync_enabled(&Identifier::ENDER_CHEST));
        assert_eq!(settings.synchronization.features.len(), 1);
    }
}
