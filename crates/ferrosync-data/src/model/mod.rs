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

//! The in-memory domain model for each data category.
//!
//! Every category value is a self-contained value type with no reference back
//! to a live game object. Its one capability is [`CategoryData::apply`], which
//! hands the value to the destination holder's host-specific setter.

mod advancements;
mod effects;
mod game_mode;
mod items;
mod location;
mod persistent;
mod statistics;
mod vitals;

pub use advancements::{Advancement, Advancements};
pub use effects::{PotionEffect, PotionEffects, INFINITE_DURATION};
pub use game_mode::{GameMode, GameModeKind};
pub use items::{
    EnderChest, Inventory, ItemStack, ENDER_CHEST_SLOT_COUNT, HOTBAR_SLOT_COUNT,
    INVENTORY_SLOT_COUNT, MAX_STACK_SIZE,
};
pub use location::{Environment, Location, WorldRef};
pub use persistent::{PersistentData, Tag};
pub use statistics::Statistics;
pub use vitals::{Experience, Health, Hunger, MAX_FOOD_LEVEL};

use crate::holder::{ApplyContext, UserDataHolder};
use ferrosync_core::ApplyError;
use std::any::Any;
use std::fmt;

/// A decoded category value that can be applied to a live user.
///
/// Implementations must be idempotent-safe: applying the same value twice
/// leaves the destination in the same state as applying it once. They must
/// not depend on anything beyond what the value carries internally.
pub trait CategoryData: Any + Send + Sync + fmt::Debug {
    /// Performs the host-specific mutation on `user`.
    ///
    /// Only ever called on the authority context.
    fn apply(&self, user: &dyn UserDataHolder, ctx: &ApplyContext<'_>) -> Result<(), ApplyError>;

    /// Allows downcasting to the concrete category type.
    fn as_any(&self) -> &dyn Any;
}

/// Invariant checks run by the codecs on encode and after decode.
pub trait Validate {
    /// Returns a description of the first violated invariant, if any.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

macro_rules! builtin_category {
    ($($ty:ty => $setter:ident),* $(,)?) => {
        $(
            impl CategoryData for $ty {
                fn apply(
                    &self,
                    user: &dyn UserDataHolder,
                    ctx: &ApplyContext<'_>,
                ) -> Result<(), ApplyError> {
                    user.$setter(self, ctx)
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

builtin_category! {
    Inventory => set_inventory,
    EnderChest => set_ender_chest,
    PotionEffects => set_potion_effects,
    Advancements => set_advancements,
    Location => set_location,
    Statistics => set_statistics,
    Health => set_health,
    Hunger => set_hunger,
    Experience => set_experience,
    GameMode => set_game_mode,
    PersistentData => set_persistent_data,
}

fn ensure(condition: bool, reason: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason())
    }
}
