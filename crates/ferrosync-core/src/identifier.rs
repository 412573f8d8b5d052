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

//! Namespaced keys naming each synchronizable data category.
//!
//! An [`Identifier`] is a stable, persistent key: its `namespace:key` form is
//! written into every stored snapshot, so it must never change between
//! versions. Equality and hashing only consider the namespace and key; the
//! flags travel with the value but never split two identifiers apart.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// The namespace reserved for the built-in categories.
pub const MINECRAFT_NAMESPACE: &str = "minecraft";

/// An error produced while parsing or constructing an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The value has no `:` between namespace and key.
    #[error("identifier `{0}` is missing the `namespace:key` separator")]
    MissingSeparator(String),
    /// The namespace or the key is empty.
    #[error("identifier `{0}` has an empty namespace or key")]
    Empty(String),
    /// A character outside the allowed set was found.
    #[error("invalid character `{character}` in identifier `{value}`")]
    InvalidCharacter {
        /// The rejected input.
        value: String,
        /// The first offending character.
        character: char,
    },
    /// Third-party categories may not claim the built-in namespace.
    #[error("namespace `{MINECRAFT_NAMESPACE}` is reserved for built-in categories")]
    ReservedNamespace,
}

/// A globally unique, namespaced key naming a data category.
#[derive(Debug, Clone)]
pub struct Identifier {
    namespace: Cow<'static, str>,
    key: Cow<'static, str>,
    custom: bool,
    enabled_by_default: bool,
}

static BUILTINS: [Identifier; 11] = [
    Identifier::INVENTORY,
    Identifier::ENDER_CHEST,
    Identifier::POTION_EFFECTS,
    Identifier::ADVANCEMENTS,
    Identifier::LOCATION,
    Identifier::STATISTICS,
    Identifier::HEALTH,
    Identifier::HUNGER,
    Identifier::EXPERIENCE,
    Identifier::GAME_MODE,
    Identifier::PERSISTENT_DATA,
];

impl Identifier {
    /// The player's main inventory and held hotbar slot.
    pub const INVENTORY: Identifier = Identifier::builtin("inventory", true);
    /// The player's ender chest contents.
    pub const ENDER_CHEST: Identifier = Identifier::builtin("ender_chest", true);
    /// Active potion effects.
    pub const POTION_EFFECTS: Identifier = Identifier::builtin("potion_effects", true);
    /// Completed advancements and their criteria.
    pub const ADVANCEMENTS: Identifier = Identifier::builtin("advancements", true);
    /// World position. Off by default: servers rarely share a world layout.
    pub const LOCATION: Identifier = Identifier::builtin("location", false);
    /// Statistic counters.
    pub const STATISTICS: Identifier = Identifier::builtin("statistics", true);
    /// Health and health scaling.
    pub const HEALTH: Identifier = Identifier::builtin("health", true);
    /// Food level, saturation and exhaustion.
    pub const HUNGER: Identifier = Identifier::builtin("hunger", true);
    /// Experience points and level.
    pub const EXPERIENCE: Identifier = Identifier::builtin("experience", true);
    /// Game mode and flight state.
    pub const GAME_MODE: Identifier = Identifier::builtin("game_mode", true);
    /// Arbitrary persistent data container.
    pub const PERSISTENT_DATA: Identifier = Identifier::builtin("persistent_data", true);

    const fn builtin(key: &'static str, enabled_by_default: bool) -> Self {
        Self {
            namespace: Cow::Borrowed(MINECRAFT_NAMESPACE),
            key: Cow::Borrowed(key),
            custom: false,
            enabled_by_default,
        }
    }

    /// All built-in identifiers, in canonical order.
    pub fn builtins() -> &'static [Identifier] {
        &BUILTINS
    }

    /// Creates an identifier for a third-party category.
    ///
    /// Custom categories are always considered enabled once registered.
    pub fn custom(
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, IdentifierError> {
        let namespace = namespace.into();
        let key = key.into();
        validate(&namespace, &key)?;
        if namespace == MINECRAFT_NAMESPACE {
            return Err(IdentifierError::ReservedNamespace);
        }
        Ok(Self {
            namespace: Cow::Owned(namespace),
            key: Cow::Owned(key),
            custom: true,
            enabled_by_default: true,
        })
    }

    /// Parses the `namespace:key` form.
    ///
    /// Built-in keys resolve to the matching constant so their flags survive a
    /// round trip through storage.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let (namespace, key) = value
            .split_once(':')
            .ok_or_else(|| IdentifierError::MissingSeparator(value.to_string()))?;
        validate(namespace, key)?;

        if namespace != MINECRAFT_NAMESPACE {
            return Self::custom(namespace, key);
        }

        match BUILTINS.iter().find(|id| id.key == key) {
            Some(builtin) => Ok(builtin.clone()),
            // A built-in from a newer version; kept gated and off until someone registers it.
            None => Ok(Self {
                namespace: Cow::Borrowed(MINECRAFT_NAMESPACE),
                key: Cow::Owned(key.to_string()),
                custom: false,
                enabled_by_default: false,
            }),
        }
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key part.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The `namespace:key` form used as the persistent map key.
    pub fn key_value(&self) -> String {
        format!("{}:{}", self.namespace, self.key)
    }

    /// Whether this identifier names a third-party category.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Whether syncing this category is governed by a feature toggle.
    pub fn is_gated(&self) -> bool {
        !self.custom
    }

    /// The toggle value assumed when the configuration does not mention this category.
    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }
}

fn validate(namespace: &str, key: &str) -> Result<(), IdentifierError> {
    let full = || format!("{namespace}:{key}");
    if namespace.is_empty() || key.is_empty() {
        return Err(IdentifierError::Empty(full()));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "_.-".contains(c);
    if let Some(character) = namespace.chars().find(|c| !allowed(*c)) {
        return Err(IdentifierError::InvalidCharacter {
            value: full(),
            character,
        });
    }
    if let Some(character) = key.chars().find(|c| !allowed(*c) && *c != '/') {
        return Err(IdentifierError::InvalidCharacter {
            value: full(),
            character,
        });
    }
    Ok(())
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.key == other.key
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.key.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.namespace, &self.key).cmp(&(&other.namespace, &other.key))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Identifier::parse(&value).map_err(de::Error::custom)
    }
}
