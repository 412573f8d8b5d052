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

use super::DataAdapter;
use crate::model::Validate;
use ferrosync_core::{DeserializationError, SerializationError, Serializer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

fn check_encode<T: Validate>(value: &T) -> Result<(), SerializationError> {
    value
        .validate()
        .map_err(|reason| SerializationError::Unrepresentable { reason })
}

fn check_decode<T: Validate>(value: T) -> Result<T, DeserializationError> {
    value
        .validate()
        .map_err(|reason| DeserializationError::InvalidData { reason })?;
    Ok(value)
}

/// Encodes item-bearing and persistent-data categories as RON text.
pub struct RonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> RonSerializer<T> {
    /// Creates the serializer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for RonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RonSerializer<{}>", std::any::type_name::<T>())
    }
}

impl<T> Serializer<T> for RonSerializer<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        check_encode(value)?;
        ron::ser::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| SerializationError::Encoding(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, DeserializationError> {
        let value: T = ron::de::from_bytes(bytes)
            .map_err(|e| DeserializationError::Malformed(e.to_string()))?;
        check_decode(value)
    }
}

/// Encodes list categories as JSON text.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    /// Creates the serializer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonSerializer<{}>", std::any::type_name::<T>())
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        check_encode(value)?;
        DataAdapter::Json.to_bytes(value)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, DeserializationError> {
        check_decode(DataAdapter::Json.from_bytes(bytes)?)
    }
}

/// Encodes simple value categories with the host's configured adapter.
pub struct AdapterSerializer<T> {
    adapter: DataAdapter,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AdapterSerializer<T> {
    /// Creates a serializer writing through `adapter`.
    pub fn new(adapter: DataAdapter) -> Self {
        Self {
            adapter,
            _marker: PhantomData,
        }
    }

    /// The adapter values are written with.
    pub fn adapter(&self) -> DataAdapter {
        self.adapter
    }
}

impl<T> fmt::Debug for AdapterSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AdapterSerializer<{}>({})",
            std::any::type_name::<T>(),
            self.adapter
        )
    }
}

impl<T> Serializer<T> for AdapterSerializer<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        check_encode(value)?;
        self.adapter.to_bytes(value)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, DeserializationError> {
        check_decode(self.adapter.from_bytes(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        GameMode, GameModeKind, Hunger, Inventory, ItemStack, PotionEffect, PotionEffects,
    };

    #[test]
    fn ron_keeps_item_details() {
        let serializer = RonSerializer::<Inventory>::new();
        let mut inventory = Inventory::empty();
        inventory.contents[0] =
            Some(ItemStack::new("minecraft:diamond_pickaxe", 1).with_enchantment("minecraft:efficiency", 5));
        inventory.held_item_slot = 0;

        let bytes = serializer.serialize(&inventory).unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().contains("minecraft:efficiency"));
        assert_eq!(serializer.deserialize(&bytes).unwrap(), inventory);
    }

    #[test]
    fn invalid_values_are_rejected_on_encode() {
        let serializer = AdapterSerializer::<Hunger>::new(DataAdapter::Binary);
        let result = serializer.serialize(&Hunger {
            food_level: 21,
            saturation: 0.0,
            exhaustion: 0.0,
        });
        assert!(matches!(result, Err(SerializationError::Unrepresentable { .. })));
    }

    #[test]
    fn invalid_values_are_rejected_after_decode() {
        let bytes = br#"{"mode":"CREATIVE","allow_flight":false,"is_flying":true}"#;
        let result = AdapterSerializer::<GameMode>::new(DataAdapter::Json).deserialize(bytes);
        assert!(matches!(result, Err(DeserializationError::InvalidData { .. })));

        let ok = br#"{"mode":"CREATIVE","allow_flight":true,"is_flying":true}"#;
        let mode = AdapterSerializer::<GameMode>::new(DataAdapter::Json)
            .deserialize(ok)
            .unwrap();
        assert_eq!(mode.mode, GameModeKind::Creative);
    }

    #[test]
    fn potion_effects_are_a_plain_json_list() {
        let effects = PotionEffects {
            effects: vec![PotionEffect::new("minecraft:speed", 1, 600)],
        };
        let bytes = JsonSerializer::<PotionEffects>::new().serialize(&effects).unwrap();
        assert_eq!(bytes.first(), Some(&b'['));
        let decoded = JsonSerializer::<PotionEffects>::new().deserialize(&bytes).unwrap();
        assert_eq!(decoded, effects);
    }
}
