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

/// Duration marker for an effect that never expires.
pub const INFINITE_DURATION: i32 = -1;

/// One active potion effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotionEffect {
    /// Namespaced effect key, e.g. `minecraft:speed`.
    pub effect_type: String,
    /// Zero-based amplifier (0 is level I).
    pub amplifier: u8,
    /// Remaining ticks, or [`INFINITE_DURATION`].
    pub duration_ticks: i32,
    /// Whether the effect comes from a beacon.
    #[serde(default)]
    pub is_ambient: bool,
    /// Whether particles are shown.
    #[serde(default = "default_true")]
    pub show_particles: bool,
    /// Whether the HUD icon is shown.
    #[serde(default = "default_true")]
    pub has_icon: bool,
}

fn default_true() -> bool {
    true
}

impl PotionEffect {
    /// A visible, non-ambient effect.
    pub fn new(effect_type: impl Into<String>, amplifier: u8, duration_ticks: i32) -> Self {
        Self {
            effect_type: effect_type.into(),
            amplifier,
            duration_ticks,
            is_ambient: false,
            show_particles: true,
            has_icon: true,
        }
    }

    /// Whether the effect never expires.
    pub fn is_infinite(&self) -> bool {
        self.duration_ticks == INFINITE_DURATION
    }
}

/// Every potion effect active on the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PotionEffects {
    /// The active effects.
    pub effects: Vec<PotionEffect>,
}

impl Validate for PotionEffects {
    fn validate(&self) -> Result<(), String> {
        self.effects.iter().try_for_each(|effect| {
            ensure(!effect.effect_type.is_empty(), || "effect without a type".into())?;
            ensure(
                effect.is_infinite() || effect.duration_ticks >= 0,
                || {
                    format!(
                        "{} has negative duration {}",
                        effect.effect_type, effect.duration_ticks
                    )
                },
            )
        })
    }
}
