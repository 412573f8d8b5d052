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

use super::{ensure, Tag, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main inventory (36) + armor (4) + offhand (1).
pub const INVENTORY_SLOT_COUNT: usize = 41;
/// Slots in a vanilla ender chest.
pub const ENDER_CHEST_SLOT_COUNT: usize = 27;
/// Hosts may enlarge ender chests up to six rows.
const MAX_ENDER_CHEST_SLOTS: usize = 54;
/// Slots in the hotbar; the held slot indexes into these.
pub const HOTBAR_SLOT_COUNT: u8 = 9;
/// Largest stack size any item may have.
pub const MAX_STACK_SIZE: u32 = 99;

/// One stack of items occupying a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Namespaced material key, e.g. `minecraft:diamond`.
    pub material: String,
    /// Number of items in the stack.
    pub amount: u32,
    /// Durability damage taken.
    #[serde(default)]
    pub damage: u32,
    /// Custom display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Lore lines.
    #[serde(default)]
    pub lore: Vec<String>,
    /// Enchantment key to level.
    #[serde(default)]
    pub enchantments: BTreeMap<String, u32>,
    /// Remaining item components the model does not break out.
    #[serde(default)]
    pub tag: Option<Tag>,
}

impl ItemStack {
    /// A plain stack of `amount` items.
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            damage: 0,
            display_name: None,
            lore: Vec::new(),
            enchantments: BTreeMap::new(),
            tag: None,
        }
    }

    /// Builder-style helper adding an enchantment.
    pub fn with_enchantment(mut self, key: impl Into<String>, level: u32) -> Self {
        self.enchantments.insert(key.into(), level);
        self
    }
}

impl Validate for ItemStack {
    fn validate(&self) -> Result<(), String> {
        ensure(self.material.contains(':'), || {
            format!("material `{}` is not namespaced", self.material)
        })?;
        ensure((1..=MAX_STACK_SIZE).contains(&self.amount), || {
            format!("stack of {} has amount {}", self.material, self.amount)
        })?;
        match &self.tag {
            Some(tag) => tag.validate(),
            None => Ok(()),
        }
    }
}

fn validate_slots(contents: &[Option<ItemStack>], capacity: usize) -> Result<(), String> {
    ensure(contents.len() <= capacity, || {
        format!("{} slots exceed the capacity of {capacity}", contents.len())
    })?;
    contents
        .iter()
        .enumerate()
        .filter_map(|(slot, stack)| stack.as_ref().map(|s| (slot, s)))
        .try_for_each(|(slot, stack)| stack.validate().map_err(|e| format!("slot {slot}: {e}")))
}

/// The player's inventory and the hotbar slot they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Slot contents; `None` is an empty slot.
    pub contents: Vec<Option<ItemStack>>,
    /// The selected hotbar slot.
    pub held_item_slot: u8,
}

impl Inventory {
    /// An inventory with every slot empty.
    pub fn empty() -> Self {
        Self {
            contents: vec![None; INVENTORY_SLOT_COUNT],
            held_item_slot: 0,
        }
    }

    /// Fills the leading slots with `stacks`, padding the rest with empty slots.
    pub fn from_stacks(stacks: impl IntoIterator<Item = ItemStack>, held_item_slot: u8) -> Self {
        let mut contents: Vec<Option<ItemStack>> = stacks.into_iter().map(Some).collect();
        if contents.len() < INVENTORY_SLOT_COUNT {
            contents.resize(INVENTORY_SLOT_COUNT, None);
        }
        Self {
            contents,
            held_item_slot,
        }
    }

    /// Number of occupied slots.
    pub fn stack_count(&self) -> usize {
        self.contents.iter().flatten().count()
    }

    /// The stack in the held hotbar slot, if any.
    pub fn held_item(&self) -> Option<&ItemStack> {
        self.contents
            .get(usize::from(self.held_item_slot))
            .and_then(Option::as_ref)
    }
}

impl Validate for Inventory {
    fn validate(&self) -> Result<(), String> {
        ensure(self.held_item_slot < HOTBAR_SLOT_COUNT, || {
            format!("held item slot {} is outside the hotbar", self.held_item_slot)
        })?;
        validate_slots(&self.contents, INVENTORY_SLOT_COUNT)
    }
}

/// The player's ender chest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnderChest {
    /// Slot contents; `None` is an empty slot.
    pub contents: Vec<Option<ItemStack>>,
}

impl EnderChest {
    /// An ender chest with every slot empty.
    pub fn empty() -> Self {
        Self {
            contents: vec![None; ENDER_CHEST_SLOT_COUNT],
        }
    }

    /// Number of occupied slots.
    pub fn stack_count(&self) -> usize {
        self.contents.iter().flatten().count()
    }
}

impl Validate for EnderChest {
    fn validate(&self) -> Result<(), String> {
        validate_slots(&self.contents, MAX_ENDER_CHEST_SLOTS)
    }
}
