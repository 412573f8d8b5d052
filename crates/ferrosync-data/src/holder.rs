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

//! The accessor interface between the sync core and a host's live users.
//!
//! A [`UserDataHolder`] is an opaque handle onto one live player. The core
//! reads categories from it while building a snapshot and writes them back
//! through its typed setters while applying one. Hosts implement only the
//! accessors for the categories they support; everything else defaults to
//! "absent" on read and [`ApplyError::Unsupported`] on write.

use crate::model::{
    Advancements, CategoryData, EnderChest, Experience, GameMode, Health, Hunger, Inventory,
    Location, PersistentData, PotionEffects, Statistics,
};
use ferrosync_core::{ApplyError, Identifier, SaveCause, SyncLogger};
use indexmap::IndexMap;
use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Everything an `apply` implementation may consult besides the value itself.
pub struct ApplyContext<'a> {
    logger: &'a dyn SyncLogger,
    server_name: &'a str,
    snapshot_id: Uuid,
    cause: SaveCause,
}

impl<'a> ApplyContext<'a> {
    /// Creates a context for applying snapshot `snapshot_id`.
    pub fn new(
        logger: &'a dyn SyncLogger,
        server_name: &'a str,
        snapshot_id: Uuid,
        cause: SaveCause,
    ) -> Self {
        Self {
            logger,
            server_name,
            snapshot_id,
            cause,
        }
    }

    /// The logger of the applying agent.
    pub fn logger(&self) -> &dyn SyncLogger {
        self.logger
    }

    /// Name of the server applying the snapshot.
    pub fn server_name(&self) -> &str {
        self.server_name
    }

    /// Id of the snapshot being applied.
    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// Why the snapshot being applied was captured.
    pub fn cause(&self) -> &SaveCause {
        &self.cause
    }
}

/// Per-user storage for third-party category values.
///
/// Custom categories have no typed accessor on [`UserDataHolder`]; they are
/// read from and written into this store instead. Iteration follows
/// insertion order.
#[derive(Default)]
pub struct CustomDataStore {
    entries: RwLock<IndexMap<Identifier, Arc<dyn CategoryData>>>,
}

impl CustomDataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `identifier`, returning the previous value.
    pub fn put(
        &self,
        identifier: Identifier,
        value: Arc<dyn CategoryData>,
    ) -> Option<Arc<dyn CategoryData>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier, value)
    }

    /// The value stored under `identifier`.
    pub fn get(&self, identifier: &Identifier) -> Option<Arc<dyn CategoryData>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    /// The value stored under `identifier`, cloned out as `T`.
    pub fn get_as<T: CategoryData + Clone>(&self, identifier: &Identifier) -> Option<T> {
        self.get(identifier)
            .and_then(|value| value.as_any().downcast_ref::<T>().cloned())
    }

    /// Removes and returns the value stored under `identifier`.
    pub fn remove(&self, identifier: &Identifier) -> Option<Arc<dyn CategoryData>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(identifier)
    }

    /// Identifiers currently stored, in insertion order.
    pub fn identifiers(&self) -> Vec<Identifier> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CustomDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomDataStore")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

macro_rules! typed_accessors {
    ($($getter:ident / $setter:ident : $ty:ty => $id:ident),* $(,)?) => {
        $(
            #[doc = concat!("Reads the current `", stringify!($ty), "`; `None` when unsupported.")]
            fn $getter(&self) -> Option<$ty> {
                None
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` onto the live user.")]
            fn $setter(&self, value: &$ty, ctx: &ApplyContext<'_>) -> Result<(), ApplyError> {
                let _ = (value, ctx);
                Err(ApplyError::Unsupported(Identifier::$id))
            }
        )*
    };
}

/// An opaque handle onto one live user, owned by the host.
///
/// Setters are only ever called on the authority context.
pub trait UserDataHolder: Send + Sync {
    /// The user's display name.
    fn username(&self) -> &str;

    /// The user's stable id.
    fn uuid(&self) -> Uuid;

    /// Storage for custom categories.
    fn custom_data_store(&self) -> &CustomDataStore;

    /// Allows hosts to downcast back to their concrete holder.
    fn as_any(&self) -> &dyn Any;

    typed_accessors! {
        inventory / set_inventory: Inventory => INVENTORY,
        ender_chest / set_ender_chest: EnderChest => ENDER_CHEST,
        potion_effects / set_potion_effects: PotionEffects => POTION_EFFECTS,
        advancements / set_advancements: Advancements => ADVANCEMENTS,
        location / set_location: Location => LOCATION,
        statistics / set_statistics: Statistics => STATISTICS,
        health / set_health: Health => HEALTH,
        hunger / set_hunger: Hunger => HUNGER,
        experience / set_experience: Experience => EXPERIENCE,
        game_mode / set_game_mode: GameMode => GAME_MODE,
        persistent_data / set_persistent_data: PersistentData => PERSISTENT_DATA,
    }

    /// Reads the current value of any category.
    ///
    /// Built-ins go through the typed getters; everything else comes from the
    /// custom data store.
    fn data(&self, identifier: &Identifier) -> Option<Arc<dyn CategoryData>> {
        fn boxed<T: CategoryData>(value: Option<T>) -> Option<Arc<dyn CategoryData>> {
            value.map(|v| Arc::new(v) as Arc<dyn CategoryData>)
        }

        if identifier.is_custom() {
            return self.custom_data_store().get(identifier);
        }
        match identifier.key() {
            "inventory" => boxed(self.inventory()),
            "ender_chest" => boxed(self.ender_chest()),
            "potion_effects" => boxed(self.potion_effects()),
            "advancements" => boxed(self.advancements()),
            "location" => boxed(self.location()),
            "statistics" => boxed(self.statistics()),
            "health" => boxed(self.health()),
            "hunger" => boxed(self.hunger()),
            "experience" => boxed(self.experience()),
            "game_mode" => boxed(self.game_mode()),
            "persistent_data" => boxed(self.persistent_data()),
            _ => self.custom_data_store().get(identifier),
        }
    }
}
