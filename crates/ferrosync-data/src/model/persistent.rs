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

use super::{ensure, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::mem;

/// A typed NBT-like value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    /// Signed byte.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Byte array.
    ByteArray(Vec<i8>),
    /// Int array.
    IntArray(Vec<i32>),
    /// Long array.
    LongArray(Vec<i64>),
    /// A list whose elements all share one variant.
    List(Vec<Tag>),
    /// Named child tags.
    Compound(BTreeMap<String, Tag>),
}

impl Tag {
    /// Variant name, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Byte(_) => "byte",
            Tag::Short(_) => "short",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::String(_) => "string",
            Tag::ByteArray(_) => "byte_array",
            Tag::IntArray(_) => "int_array",
            Tag::LongArray(_) => "long_array",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), String> {
        match self {
            Tag::List(elements) => {
                if let Some(first) = elements.first() {
                    let expected = mem::discriminant(first);
                    for element in elements {
                        ensure(mem::discriminant(element) == expected, || {
                            format!(
                                "list mixes {} and {} elements",
                                first.kind(),
                                element.kind()
                            )
                        })?;
                        element.validate()?;
                    }
                }
                Ok(())
            }
            Tag::Compound(children) => children
                .iter()
                .try_for_each(|(name, child)| child.validate().map_err(|e| format!("{name}: {e}"))),
            _ => Ok(()),
        }
    }
}

/// Plugin-defined data attached to the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentData {
    /// Namespaced key to value.
    pub entries: BTreeMap<String, Tag>,
}

impl PersistentData {
    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: Tag) -> Option<Tag> {
        self.entries.insert(key.into(), value)
    }

    /// Looks up an entry.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }
}

impl Validate for PersistentData {
    fn validate(&self) -> Result<(), String> {
        self.entries.iter().try_for_each(|(key, value)| {
            ensure(key.contains(':'), || format!("key `{key}` is not namespaced"))?;
            value.validate().map_err(|e| format!("{key}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_must_be_homogeneous() {
        let mixed = Tag::List(vec![Tag::Int(1), Tag::String("two".into())]);
        let err = mixed.validate().unwrap_err();
        assert!(err.contains("int") && err.contains("string"));

        let nested = Tag::Compound(BTreeMap::from([(
            "levels".to_string(),
            Tag::List(vec![Tag::Int(1), Tag::Int(2)]),
        )]));
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn persistent_keys_are_namespaced() {
        let mut data = PersistentData::default();
        data.insert("myplugin:coins", Tag::Long(1_250));
        assert!(data.validate().is_ok());

        data.insert("coins", Tag::Long(3));
        assert!(data.validate().unwrap_err().contains("`coins`"));
    }
}
