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

/// An advancement with at least one completed criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advancement {
    /// Namespaced advancement key, e.g. `minecraft:story/mine_stone`.
    pub key: String,
    /// Criterion name to completion time, in unix milliseconds.
    pub completed_criteria: BTreeMap<String, i64>,
}

impl Advancement {
    /// An advancement with a single criterion completed at `completed_at_millis`.
    pub fn completed(
        key: impl Into<String>,
        criterion: impl Into<String>,
        completed_at_millis: i64,
    ) -> Self {
        Self {
            key: key.into(),
            completed_criteria: BTreeMap::from([(criterion.into(), completed_at_millis)]),
        }
    }
}

/// Every advancement the player has made progress on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Advancements {
    /// Advancements with completed criteria.
    pub completed: Vec<Advancement>,
}

impl Advancements {
    /// Looks up an advancement by key.
    pub fn get(&self, key: &str) -> Option<&Advancement> {
        self.completed.iter().find(|advancement| advancement.key == key)
    }
}

impl Validate for Advancements {
    fn validate(&self) -> Result<(), String> {
        self.completed.iter().try_for_each(|advancement| {
            ensure(advancement.key.contains(':'), || {
                format!("advancement key `{}` is not namespaced", advancement.key)
            })?;
            ensure(!advancement.completed_criteria.is_empty(), || {
                format!("advancement `{}` has no completed criteria", advancement.key)
            })
        })
    }
}
