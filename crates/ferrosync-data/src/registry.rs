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

//! The process-wide binding of identifiers to category codecs.
//!
//! Every category that can appear in a snapshot is registered here once,
//! together with the serializer for its value type. Registration normally
//! happens at startup, while lookups happen concurrently on worker contexts
//! during every capture and apply; the table is therefore guarded by a
//! `RwLock` so resolvers never contend with each other.

use crate::codec::{AdapterSerializer, DataAdapter, JsonSerializer, RonSerializer};
use crate::model::{
    Advancements, CategoryData, EnderChest, Experience, GameMode, Health, Hunger, Inventory,
    Location, PersistentData, PotionEffects, Statistics,
};
use ferrosync_core::{
    DeserializationError, FeatureToggles, Identifier, SerializationError, Serializer,
};
use indexmap::IndexMap;
use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// The runtime identity of a category's value type.
#[derive(Debug, Clone, Copy, Eq)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The type's name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Errors raised by registry lookups and registration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// No codec is registered for the identifier.
    #[error("no codec registered for {0}")]
    UnknownIdentifier(Identifier),
    /// A codec is already registered for the identifier.
    #[error("a codec is already registered for {0}")]
    DuplicateIdentifier(Identifier),
    /// The registered codec handles a different value type.
    #[error("{identifier} is registered for {found}, not {expected}")]
    TypeMismatch {
        /// The identifier looked up.
        identifier: Identifier,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type the codec is registered with.
        found: &'static str,
    },
}

/// Any failure encoding or decoding one category through the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The identifier is not registered, or registered for another type.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The value could not be encoded.
    #[error(transparent)]
    Encode(#[from] SerializationError),
    /// The payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DeserializationError),
}

/// A type-erased codec for one category.
pub trait CategoryCodec: Send + Sync {
    /// The value type this codec handles.
    fn type_tag(&self) -> TypeTag;

    /// Encodes `value`, which must be of this codec's type.
    fn encode(&self, value: &dyn CategoryData) -> Result<Vec<u8>, SerializationError>;

    /// Decodes a payload into a fresh category value.
    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn CategoryData>, DeserializationError>;

    /// Allows downcasting to the concrete codec.
    fn as_any(&self) -> &dyn Any;
}

struct TypedCodec<T> {
    serializer: Arc<dyn Serializer<T>>,
}

impl<T: CategoryData> CategoryCodec for TypedCodec<T> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn encode(&self, value: &dyn CategoryData) -> Result<Vec<u8>, SerializationError> {
        let value = value.as_any().downcast_ref::<T>().ok_or_else(|| {
            SerializationError::TypeMismatch {
                expected: any::type_name::<T>(),
                found: format!("{value:?}"),
            }
        })?;
        self.serializer.serialize(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn CategoryData>, DeserializationError> {
        let value = self.serializer.deserialize(bytes)?;
        Ok(Arc::new(value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Maps each [`Identifier`] to the codec for its value type.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: RwLock<IndexMap<Identifier, Arc<dyn CategoryCodec>>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in category.
    ///
    /// Simple value categories are written through `adapter`.
    pub fn with_builtins(adapter: DataAdapter) -> Self {
        let registry = Self::new();
        registry.insert(Identifier::INVENTORY, RonSerializer::<Inventory>::new());
        registry.insert(Identifier::ENDER_CHEST, RonSerializer::<EnderChest>::new());
        registry.insert(Identifier::POTION_EFFECTS, JsonSerializer::<PotionEffects>::new());
        registry.insert(Identifier::ADVANCEMENTS, JsonSerializer::<Advancements>::new());
        registry.insert(Identifier::LOCATION, AdapterSerializer::<Location>::new(adapter));
        registry.insert(Identifier::STATISTICS, AdapterSerializer::<Statistics>::new(adapter));
        registry.insert(Identifier::HEALTH, AdapterSerializer::<Health>::new(adapter));
        registry.insert(Identifier::HUNGER, AdapterSerializer::<Hunger>::new(adapter));
        registry.insert(Identifier::EXPERIENCE, AdapterSerializer::<Experience>::new(adapter));
        registry.insert(Identifier::GAME_MODE, AdapterSerializer::<GameMode>::new(adapter));
        registry.insert(Identifier::PERSISTENT_DATA, RonSerializer::<PersistentData>::new());
        registry
    }

    /// Binds `identifier` to `serializer`.
    ///
    /// Fails with [`RegistryError::DuplicateIdentifier`] if the identifier is
    /// already bound; the existing binding is kept.
    ///
    /// ## Arguments
    /// * `identifier` - The category key the codec answers for.
    /// * `serializer` - Encodes and decodes values of type `T`.
    ///
    /// ## Returns
    /// `Ok(())` once the binding is stored.
    pub fn register<T, S>(&self, identifier: Identifier, serializer: S) -> Result<(), RegistryError>
    where
        T: CategoryData,
        S: Serializer<T> + 'static,
    {
        let mut codecs = self.codecs.write().unwrap_or_else(PoisonError::into_inner);
        if codecs.contains_key(&identifier) {
            return Err(RegistryError::DuplicateIdentifier(identifier));
        }
        log::debug!("Registered codec for {identifier} ({})", any::type_name::<T>());
        codecs.insert(identifier, typed(serializer));
        Ok(())
    }

    /// Binds `identifier` to `serializer`, replacing any existing binding.
    ///
    /// Returns the type tag of the replaced codec. A replaced binding keeps
    /// its registration position.
    pub fn register_or_replace<T, S>(&self, identifier: Identifier, serializer: S) -> Option<TypeTag>
    where
        T: CategoryData,
        S: Serializer<T> + 'static,
    {
        self.insert(identifier, serializer)
    }

    fn insert<T, S>(&self, identifier: Identifier, serializer: S) -> Option<TypeTag>
    where
        T: CategoryData,
        S: Serializer<T> + 'static,
    {
        self.codecs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier, typed(serializer))
            .map(|previous| previous.type_tag())
    }

    /// The codec bound to `identifier`.
    pub fn resolve(&self, identifier: &Identifier) -> Result<Arc<dyn CategoryCodec>, RegistryError> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownIdentifier(identifier.clone()))
    }

    /// The serializer bound to `identifier`, checked against `T`.
    pub fn resolve_typed<T: CategoryData>(
        &self,
        identifier: &Identifier,
    ) -> Result<Arc<dyn Serializer<T>>, RegistryError> {
        let codec = self.resolve(identifier)?;
        codec
            .as_any()
            .downcast_ref::<TypedCodec<T>>()
            .map(|typed| Arc::clone(&typed.serializer))
            .ok_or_else(|| RegistryError::TypeMismatch {
                identifier: identifier.clone(),
                expected: any::type_name::<T>(),
                found: codec.type_tag().name(),
            })
    }

    /// Encodes `value` with the codec bound to `identifier`.
    pub fn encode(
        &self,
        identifier: &Identifier,
        value: &dyn CategoryData,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(self.resolve(identifier)?.encode(value)?)
    }

    /// Decodes `bytes` with the codec bound to `identifier`.
    pub fn decode(
        &self,
        identifier: &Identifier,
        bytes: &[u8],
    ) -> Result<Arc<dyn CategoryData>, CodecError> {
        Ok(self.resolve(identifier)?.decode(bytes)?)
    }

    /// Registered identifiers that `toggles` allows, in registration order.
    ///
    /// Custom categories are always included.
    pub fn list_enabled(&self, toggles: &dyn FeatureToggles) -> Vec<Identifier> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|identifier| identifier.is_custom() || toggles.is_sync_enabled(identifier))
            .cloned()
            .collect()
    }

    /// The registered copy of `identifier`, carrying its registration flags.
    pub fn canonical(&self, identifier: &Identifier) -> Option<Identifier> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_key_value(identifier)
            .map(|(registered, _)| registered.clone())
    }

    /// Whether `identifier` is registered.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(identifier)
    }

    /// Every registered identifier, in registration order.
    pub fn identifiers(&self) -> Vec<Identifier> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of registered categories.
    pub fn len(&self) -> usize {
        self.codecs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

fn typed<T, S>(serializer: S) -> Arc<dyn CategoryCodec>
where
    T: CategoryData,
    S: Serializer<T> + 'static,
{
    Arc::new(TypedCodec::<T> {
        serializer: Arc::new(serializer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::{ApplyContext, UserDataHolder};
    use crate::model::{
        Advancement, Environment, GameModeKind, ItemStack, PotionEffect, Tag, WorldRef,
    };
    use ferrosync_core::{AllEnabled, ApplyError};
    use std::collections::BTreeMap;
    use std::sync::Barrier;
    use uuid::Uuid;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
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

    fn mana() -> Identifier {
        Identifier::custom("magic", "mana").unwrap()
    }

    #[test]
    fn builtins_are_registered_in_canonical_order() {
        let registry = CodecRegistry::with_builtins(DataAdapter::Json);
        assert_eq!(registry.identifiers(), Identifier::builtins().to_vec());
        assert!(registry.resolve_typed::<Inventory>(&Identifier::INVENTORY).is_ok());
    }

    fn assert_round_trip<T>(registry: &CodecRegistry, identifier: &Identifier, value: T)
    where
        T: CategoryData + PartialEq + fmt::Debug,
    {
        let bytes = registry
            .encode(identifier, &value)
            .unwrap_or_else(|e| panic!("{identifier} failed to encode: {e}"));
        let decoded = registry
            .decode(identifier, &bytes)
            .unwrap_or_else(|e| panic!("{identifier} failed to decode: {e}"));
        assert_eq!(decoded.as_any().downcast_ref::<T>(), Some(&value), "{identifier}");
    }

    #[test]
    fn every_builtin_survives_every_adapter() {
        let tool = ItemStack::new("minecraft:diamond_pickaxe", 1)
            .with_enchantment("minecraft:efficiency", 5)
            .with_enchantment("minecraft:unbreaking", 3);
        let mut chest = EnderChest::empty();
        chest.contents[13] = Some(ItemStack::new("minecraft:shulker_box", 1));

        let mut statistics = Statistics::default();
        statistics.generic.insert("minecraft:jump".into(), 412);
        statistics.blocks.insert(
            "minecraft:mined".into(),
            BTreeMap::from([("minecraft:stone".to_string(), 1_024)]),
        );
        statistics.items.insert(
            "minecraft:used".into(),
            BTreeMap::from([("minecraft:bread".to_string(), 9)]),
        );
        statistics.entities.insert(
            "minecraft:killed".into(),
            BTreeMap::from([("minecraft:zombie".to_string(), 31)]),
        );

        let mut persistent = PersistentData::default();
        persistent.insert(
            "bank:account",
            Tag::Compound(BTreeMap::from([
                ("balance".to_string(), Tag::Double(1_250.75)),
                ("rate".to_string(), Tag::Float(0.5)),
                ("flags".to_string(), Tag::ByteArray(vec![-1, 0, 127])),
                ("ids".to_string(), Tag::LongArray(vec![-7, 1 << 40])),
            ])),
        );
        persistent.insert(
            "quests:done",
            Tag::List(vec![Tag::String("intro".into()), Tag::String("nether".into())]),
        );

        for adapter in DataAdapter::ALL {
            let registry = CodecRegistry::with_builtins(adapter);
            let mut covered = Vec::new();
            let mut check = |identifier: Identifier| {
                covered.push(identifier.clone());
                identifier
            };

            assert_round_trip(
                &registry,
                &check(Identifier::INVENTORY),
                Inventory::from_stacks([tool.clone(), ItemStack::new("minecraft:torch", 16)], 1),
            );
            assert_round_trip(&registry, &check(Identifier::ENDER_CHEST), chest.clone());
            assert_round_trip(
                &registry,
                &check(Identifier::POTION_EFFECTS),
                PotionEffects {
                    effects: vec![PotionEffect::new("minecraft:speed", 1, 600)],
                },
            );
            assert_round_trip(
                &registry,
                &check(Identifier::ADVANCEMENTS),
                Advancements {
                    completed: vec![Advancement::completed(
                        "minecraft:story/mine_stone",
                        "get_stone",
                        1_700_000_000_000,
                    )],
                },
            );
            assert_round_trip(
                &registry,
                &check(Identifier::LOCATION),
                Location {
                    world: WorldRef {
                        name: "world_nether".into(),
                        uuid: Uuid::from_u128(0x1234),
                        environment: Environment::Nether,
                    },
                    x: -120.5,
                    y: 70.0,
                    z: 33.25,
                    yaw: 180.0,
                    pitch: -45.0,
                },
            );
            assert_round_trip(&registry, &check(Identifier::STATISTICS), statistics.clone());
            assert_round_trip(&registry, &check(Identifier::HEALTH), Health::new(7.5));
            assert_round_trip(
                &registry,
                &check(Identifier::HUNGER),
                Hunger {
                    food_level: 14,
                    saturation: 2.5,
                    exhaustion: 0.75,
                },
            );
            assert_round_trip(
                &registry,
                &check(Identifier::EXPERIENCE),
                Experience {
                    total_experience: 352,
                    exp_level: 17,
                    exp_progress: 0.5,
                },
            );
            assert_round_trip(
                &registry,
                &check(Identifier::GAME_MODE),
                GameMode::new(GameModeKind::Creative),
            );
            assert_round_trip(&registry, &check(Identifier::PERSISTENT_DATA), persistent.clone());

            assert_eq!(covered, registry.identifiers(), "{adapter}");
        }
    }

    #[test]
    fn duplicate_registration_keeps_the_first_codec() {
        let registry = CodecRegistry::new();
        registry.register(mana(), ManaSerializer).unwrap();

        let second = registry.register(mana(), JsonSerializer::<Advancements>::new());
        assert_eq!(second, Err(RegistryError::DuplicateIdentifier(mana())));
        assert_eq!(registry.resolve(&mana()).unwrap().type_tag(), TypeTag::of::<Mana>());

        let replaced = registry.register_or_replace(mana(), JsonSerializer::<Advancements>::new());
        assert_eq!(replaced, Some(TypeTag::of::<Mana>()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn typed_resolution_checks_the_value_type() {
        let registry = CodecRegistry::with_builtins(DataAdapter::Binary);
        let err = registry
            .resolve_typed::<Hunger>(&Identifier::HEALTH)
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));

        let unknown = registry.resolve(&mana()).err().unwrap();
        assert_eq!(unknown, RegistryError::UnknownIdentifier(mana()));
    }

    #[test]
    fn encoding_the_wrong_type_is_a_mismatch() {
        let registry = CodecRegistry::with_builtins(DataAdapter::Json);
        let result = registry.encode(&Identifier::HEALTH, &Mana(3));
        assert!(matches!(
            result,
            Err(CodecError::Encode(SerializationError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn list_enabled_filters_builtins_but_keeps_custom() {
        let registry = CodecRegistry::with_builtins(DataAdapter::Json);
        registry.register(mana(), ManaSerializer).unwrap();

        let only_inventory = |id: &Identifier| *id == Identifier::INVENTORY;
        assert_eq!(
            registry.list_enabled(&only_inventory),
            vec![Identifier::INVENTORY, mana()]
        );
        assert_eq!(registry.list_enabled(&AllEnabled).len(), 12);
    }

    #[test]
    fn concurrent_resolution_is_consistent() {
        let registry = Arc::new(CodecRegistry::with_builtins(DataAdapter::Json));
        registry.register(mana(), ManaSerializer).unwrap();
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..200).all(|_| {
                        registry.resolve(&mana()).map(|c| c.type_tag()) == Ok(TypeTag::of::<Mana>())
                    })
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
