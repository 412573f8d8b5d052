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

#![allow(dead_code)]

use ferrosync_agents::SyncServices;
use ferrosync_core::{
    ApplyError, DeserializationError, FeatureToggles, Identifier, MemoryLogger, Scheduler,
    SerializationError, Serializer,
};
use ferrosync_data::model::{
    Experience, GameMode, GameModeKind, Health, Hunger, Inventory, ItemStack,
};
use ferrosync_data::{ApplyContext, CategoryData, CodecRegistry, CustomDataStore, DataAdapter, UserDataHolder};
use std::any::Any;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Captured values of a [`MockUser`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockState {
    pub inventory: Option<Inventory>,
    pub health: Option<Health>,
    pub hunger: Option<Hunger>,
    pub experience: Option<Experience>,
    pub game_mode: Option<GameMode>,
}

/// A live user that records every setter call.
pub struct MockUser {
    name: String,
    uuid: Uuid,
    store: CustomDataStore,
    pub state: Mutex<MockState>,
    pub calls: Mutex<Vec<Identifier>>,
    pub fail_on: Option<Identifier>,
    pub panic_on: Option<Identifier>,
}

impl MockUser {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            uuid: Uuid::new_v4(),
            store: CustomDataStore::new(),
            state: Mutex::new(MockState::default()),
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            panic_on: None,
        }
    }

    /// A user carrying an inventory, health, experience and game mode.
    pub fn populated(name: &str) -> Self {
        let user = Self::new(name);
        *user.state.lock().unwrap() = MockState {
            inventory: Some(Inventory::from_stacks(
                [
                    ItemStack::new("minecraft:diamond_sword", 1)
                        .with_enchantment("minecraft:sharpness", 5),
                    ItemStack::new("minecraft:cooked_beef", 32),
                ],
                0,
            )),
            health: Some(Health::new(15.0)),
            hunger: None,
            experience: Some(Experience {
                total_experience: 550,
                exp_level: 22,
                exp_progress: 0.4,
            }),
            game_mode: Some(GameMode::new(GameModeKind::Survival)),
        };
        user
    }

    pub fn snapshot_state(&self) -> MockState {
        self.state.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Identifier> {
        self.calls.lock().unwrap().clone()
    }

    pub fn record(&self, identifier: Identifier) -> Result<(), ApplyError> {
        self.calls.lock().unwrap().push(identifier.clone());
        if self.panic_on.as_ref() == Some(&identifier) {
            panic!("host blew up applying {identifier}");
        }
        if self.fail_on.as_ref() == Some(&identifier) {
            return Err(ApplyError::InvalidValue {
                identifier,
                reason: "rejected by the test host".into(),
            });
        }
        Ok(())
    }
}

impl UserDataHolder for MockUser {
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
        self.record(Identifier::INVENTORY)?;
        self.state.lock().unwrap().inventory = Some(value.clone());
        Ok(())
    }

    fn health(&self) -> Option<Health> {
        self.state.lock().unwrap().health
    }

    fn set_health(&self, value: &Health, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.record(Identifier::HEALTH)?;
        self.state.lock().unwrap().health = Some(*value);
        Ok(())
    }

    fn hunger(&self) -> Option<Hunger> {
        self.state.lock().unwrap().hunger
    }

    fn set_hunger(&self, value: &Hunger, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.record(Identifier::HUNGER)?;
        self.state.lock().unwrap().hunger = Some(*value);
        Ok(())
    }

    fn experience(&self) -> Option<Experience> {
        self.state.lock().unwrap().experience
    }

    fn set_experience(&self, value: &Experience, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.record(Identifier::EXPERIENCE)?;
        self.state.lock().unwrap().experience = Some(*value);
        Ok(())
    }

    fn game_mode(&self) -> Option<GameMode> {
        self.state.lock().unwrap().game_mode
    }

    fn set_game_mode(&self, value: &GameMode, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        self.record(Identifier::GAME_MODE)?;
        self.state.lock().unwrap().game_mode = Some(*value);
        Ok(())
    }
}

/// A third-party category stored only in the custom data store.
#[derive(Debug, Clone, PartialEq)]
pub struct Coins(pub u64);

pub fn coins_id() -> Identifier {
    Identifier::custom("bank", "coins").unwrap()
}

impl CategoryData for Coins {
    fn apply(&self, user: &dyn UserDataHolder, _: &ApplyContext<'_>) -> Result<(), ApplyError> {
        match user.as_any().downcast_ref::<MockUser>() {
            Some(mock) => mock.record(coins_id()),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct CoinsSerializer;

impl Serializer<Coins> for CoinsSerializer {
    fn serialize(&self, value: &Coins) -> Result<Vec<u8>, SerializationError> {
        Ok(value.0.to_le_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Coins, DeserializationError> {
        let raw: [u8; 8] = bytes
            .try_into()
            .map_err(|_| DeserializationError::Malformed(format!("{} bytes", bytes.len())))?;
        Ok(Coins(u64::from_le_bytes(raw)))
    }
}

/// A registry with the built-ins plus [`Coins`].
pub fn registry() -> Arc<CodecRegistry> {
    let registry = CodecRegistry::with_builtins(DataAdapter::Binary);
    registry
        .register(coins_id(), CoinsSerializer)
        .expect("coins registers once");
    Arc::new(registry)
}

pub fn services(
    registry: Arc<CodecRegistry>,
    toggles: Arc<dyn FeatureToggles>,
    scheduler: Arc<dyn Scheduler>,
    logger: Arc<MemoryLogger>,
) -> SyncServices {
    SyncServices {
        registry,
        toggles,
        scheduler,
        logger,
        server_name: "test-server".to_string(),
        events: None,
        auto_pin: Vec::new(),
    }
}
