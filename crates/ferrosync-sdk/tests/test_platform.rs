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

use ferrosync_core::MemoryLogger;
use ferrosync_sdk::prelude::*;
use std::any::Any;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq)]
struct PlayerState {
    inventory: Option<Inventory>,
    health: Option<Health>,
    experience: Option<Experience>,
    location: Option<Location>,
}

struct Player {
    name: String,
    uuid: Uuid,
    store: CustomDataStore,
    state: Mutex<PlayerState>,
}

impl Player {
    fn new(name: &str, uuid: Uuid) -> Self {
        Self {
            name: name.to_string(),
            uuid,
            store: CustomDataStore::new(),
            state: Mutex::new(PlayerState::default()),
        }
    }

    fn state(&self) -> PlayerState {
        self.state.lock().unwrap().clone()
    }
}

impl UserDataHolder for Player {
    fn username(&self) -> &str {
        &self.name
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn custom_data_store(&self) -> &CustomDataStore {
        &self.store
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inventory(&self) -> Option<Inventory> {
        self.state.lock().unwrap().inventory.clone()
    }

    fn set_inventory(&self, value: &Inventory, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.state.lock().unwrap().inventory = Some(value.clone());
        Ok(())
    }

    fn health(&self) -> Option<Health> {
        self.state.lock().unwrap().health
    }

    fn set_health(&self, value: &Health, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.state.lock().unwrap().health = Some(*value);
        Ok(())
    }

    fn experience(&self) -> Option<Experience> {
        self.state.lock().unwrap().experience
    }

    fn set_experience(&self, value: &Experience, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.state.lock().unwrap().experience = Some(*value);
        Ok(())
    }

    fn location(&self) -> Option<Location> {
        self.state.lock().unwrap().location.clone()
    }

    fn set_location(&self, value: &Location, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.state.lock().unwrap().location = Some(value.clone());
        Ok(())
    }
}

fn platform(settings: SyncSettings) -> SyncPlatform {
    SyncPlatform::builder()
        .settings(settings)
        .scheduler(Arc::new(InlineScheduler))
        .logger(Arc::new(MemoryLogger::new()))
        .build()
        .expect("platform should start")
}

#[test]
fn test_a_snapshot_travels_between_differently_configured_servers() {
    // --- 1. ARRANGE ---
    let mut source_settings = SyncSettings::default();
    source_settings.server_name = "survival-1".into();
    source_settings.snapshots.adapter = DataAdapter::CompressedJson;
    source_settings.set_feature(&Identifier::LOCATION, true);
    let source = platform(source_settings);

    let mut destination_settings = SyncSettings::default();
    destination_settings.server_name = "survival-2".into();
    destination_settings.set_feature(&Identifier::LOCATION, true);
    destination_settings.set_feature(&Identifier::EXPERIENCE, false);
    let destination = platform(destination_settings);

    let uuid = Uuid::new_v4();
    let online = Player::new("Steve", uuid);
    *online.state.lock().unwrap() = PlayerState {
        inventory: Some(Inventory::from_stacks(
            [ItemStack::new("minecraft:elytra", 1)],
            4,
        )),
        health: Some(Health::new(9.5)),
        experience: Some(Experience {
            total_experience: 120,
            exp_level: 7,
            exp_progress: 0.25,
        }),
        location: Some(Location {
            x: 12.5,
            y: 64.0,
            z: -3.0,
            yaw: 90.0,
            pitch: 10.0,
            world: WorldRef {
                name: "world".into(),
                uuid: Uuid::nil(),
                environment: Environment::Normal,
            },
        }),
    };

    // --- 2. ACT ---
    let snapshot = source.create_snapshot(&online, SaveCause::Disconnect);
    let stored = source.encode_snapshot(&snapshot).expect("snapshot should encode");
    let received = destination
        .decode_snapshot(&stored)
        .expect("snapshot should decode");

    let joining = Arc::new(Player::new("Steve", uuid));
    let ticket = destination.apply_snapshot(joining.clone(), received, |_| {});

    // --- 3. ASSERT ---
    assert_eq!(snapshot.server_name(), "survival-1");
    assert_eq!(
        snapshot.identifiers().cloned().collect::<Vec<_>>(),
        vec![
            Identifier::INVENTORY,
            Identifier::LOCATION,
            Identifier::HEALTH,
            Identifier::EXPERIENCE
        ]
    );

    let report = ticket.wait().expect("apply should succeed");
    assert_eq!(report.disabled, vec![Identifier::EXPERIENCE]);

    let state = joining.state();
    let original = online.state();
    assert_eq!(state.inventory, original.inventory);
    assert_eq!(state.health, original.health);
    assert_eq!(state.location, original.location);
    assert_eq!(state.experience, None);
}

#[test]
fn test_runtime_toggles_and_events() {
    // --- 1. ARRANGE ---
    let platform = platform(SyncSettings::default());
    let events = platform.events();
    let player = Player::new("Alex", Uuid::new_v4());
    player.state.lock().unwrap().health = Some(Health::new(20.0));

    // --- 2. ACT ---
    platform.set_feature(&Identifier::HEALTH, false);
    let without_health = platform.create_snapshot(&player, SaveCause::WorldSave);
    platform.set_feature(&Identifier::HEALTH, true);
    let with_health = platform.create_snapshot(&player, SaveCause::InventoryCommand);

    // --- 3. ASSERT ---
    assert!(without_health.is_empty());
    assert!(!without_health.pinned());
    assert_eq!(with_health.len(), 1);
    assert!(with_health.pinned());
    assert!(!platform.settings().synchronization.features.is_empty());

    let created: Vec<_> = events.try_iter().collect();
    assert_eq!(created.len(), 2);
    assert!(created
        .iter()
        .all(|event| matches!(event, SyncEvent::SnapshotCreated { .. })));
}

#[test]
fn test_settings_are_read_from_a_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ferrosync.toml");
    std::fs::write(
        &path,
        "server_name = \"lobby\"\n[snapshots]\nadapter = \"binary\"\n",
    )
    .unwrap();

    let platform = SyncPlatform::builder()
        .settings_file(&path)
        .scheduler(Arc::new(InlineScheduler))
        .build()
        .expect("platform should start");

    assert_eq!(platform.settings().server_name, "lobby");
    assert_eq!(platform.settings().snapshots.adapter, DataAdapter::Binary);
}

#[test]
fn test_invalid_settings_fail_the_build() {
    let mut settings = SyncSettings::default();
    settings.workers.threads = 0;

    let err = SyncPlatform::builder()
        .settings(settings)
        .scheduler(Arc::new(InlineScheduler))
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("invalid sync settings"));
}

#[test]
fn test_duplicate_custom_registration_is_refused() {
    #[derive(Debug, Clone)]
    struct Mana(u32);

    impl CategoryData for Mana {
        fn apply(&self, _: &dyn UserDataHolder, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct ManaSerializer;

    impl Serializer<Mana> for ManaSerializer {
        fn serialize(&self, value: &Mana) -> Result<Vec<u8>, SerializationError> {
            Ok(value.0.to_le_bytes().to_vec())
        }

        fn deserialize(&self, bytes: &[u8]) -> Result<Mana, DeserializationError> {
            let raw: [u8; 4] = bytes
                .try_into()
                .map_err(|_| DeserializationError::Malformed("expected 4 bytes".into()))?;
            Ok(Mana(u32::from_le_bytes(raw)))
        }
    }

    let platform = platform(SyncSettings::default());
    let mana = Identifier::custom("magic", "mana").unwrap();

    assert!(platform.register_custom(mana.clone(), ManaSerializer).is_ok());
    assert!(platform.register_custom(mana.clone(), ManaSerializer).is_err());
    assert!(platform.is_sync_enabled(&mana));
    assert!(platform.registry().contains(&mana));
}
