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

/// Statistic counters, grouped by what they are keyed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Untyped statistics, e.g. `minecraft:jump`.
    pub generic: BTreeMap<String, i32>,
    /// Statistic key to block key to count, e.g. `mine_block`.
    pub blocks: BTreeMap<String, BTreeMap<String, i32>>,
    /// Statistic key to item key to count, e.g. `craft_item`.
    pub items: BTreeMap<String, BTreeMap<String, i32>>,
    /// Statistic key to entity key to count, e.g. `kill_entity`.
    pub entities: BTreeMap<String, BTreeMap<String, i32>>,
}

impl Statistics {
    /// Total of all counters, saturating.
    pub fn total(&self) -> i64 {
        let nested = [&self.blocks, &self.items, &self.entities]
            .into_iter()
            .flat_map(|group| group.values())
            .flat_map(|counters| counters.values());
        self.generic
            .values()
            .chain(nested)
            .fold(0i64, |total, value| total.saturating_add(i64::from(*value)))
    }
}

impl Validate for Statistics {
    fn validate(&self) -> Result<(), String> {
        let negative_generic = self.generic.iter().find(|(_, value)| **value < 0);
        if let Some((key, value)) = negative_generic {
            return Err(format!("statistic {key} is negative ({value})"));
        }
        for group in [&self.blocks, &self.items, &self.entities] {
            for (statistic, counters) in group {
                for (target, value) in counters {
                    ensure(*value >= 0, || {
                        format!("statistic {statistic}/{target} is negative ({value})")
                    })?;
                }
            }
        }
        Ok(())
    }
}
