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

use ferrosync_core::{FeatureToggles, Identifier, SaveCause};
use ferrosync_data::DataAdapter;
use ferrosync_infra::{SettingsError, SyncSettings};
use std::fs;

#[test]
fn test_settings_round_trip_through_a_file() {
    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ferrosync.toml");

    let mut settings = SyncSettings::default();
    settings.server_name = "survival-2".to_string();
    settings.snapshots.adapter = DataAdapter::CompressedJson;
    settings.snapshots.auto_pin = vec![SaveCause::Death];
    settings.set_feature(&Identifier::LOCATION, true);
    settings.workers.threads = 3;

    // --- 2. ACT ---
    settings.save(&path).expect("settings should save");
    let loaded = SyncSettings::load(&path).expect("settings should load");

    // --- 3. ASSERT ---
    assert_eq!(loaded, settings);
    assert!(loaded.is_sync_enabled(&Identifier::LOCATION));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("compressed_json"), "adapter is stored by name: {text}");
}

#[test]
fn test_missing_file_is_an_io_error_unless_defaults_are_allowed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        SyncSettings::load(&path),
        Err(SettingsError::Io { .. })
    ));
    assert_eq!(
        SyncSettings::load_or_default(&path).unwrap(),
        SyncSettings::default()
    );
}

#[test]
fn test_malformed_file_reports_a_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "server_name = [unterminated").unwrap();

    let err = SyncSettings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Parse(_)), "got {err:?}");
}
