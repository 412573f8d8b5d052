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

/// Highest food level a player can have.
pub const MAX_FOOD_LEVEL: i32 = 20;

/// Health and the client-side health scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub health: f64,
    /// Number of health points the client's heart bar represents.
    pub health_scale: f64,
    /// Whether the heart bar is scaled.
    pub is_health_scaled: bool,
}

impl Health {
    /// Unscaled health of `health` points.
    pub fn new(health: f64) -> Self {
        Self {
            health,
            health_scale: 20.0,
            is_health_scaled: false,
        }
    }
}

impl Validate for Health {
    fn validate(&self) -> Result<(), String> {
        ensure(self.health.is_finite() && self.health >= 0.0, || {
            format!("health {} is not a finite, non-negative number", self.health)
        })?;
        ensure(
            !self.is_health_scaled || (self.health_scale.is_finite() && self.health_scale > 0.0),
            || format!("health scale {} must be positive", self.health_scale),
        )
    }
}

/// Food level, saturation and exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hunger {
    /// Food points, 0 to [`MAX_FOOD_LEVEL`].
    pub food_level: i32,
    /// Saturation points.
    pub saturation: f32,
    /// Accumulated exhaustion.
    pub exhaustion: f32,
}

impl Validate for Hunger {
    fn validate(&self) -> Result<(), String> {
        ensure((0..=MAX_FOOD_LEVEL).contains(&self.food_level), || {
            format!("food level {} is outside 0..={MAX_FOOD_LEVEL}", self.food_level)
        })?;
        ensure(self.saturation.is_finite() && self.saturation >= 0.0, || {
            format!("saturation {} must be non-negative", self.saturation)
        })?;
        ensure(self.exhaustion.is_finite() && self.exhaustion >= 0.0, || {
            format!("exhaustion {} must be non-negative", self.exhaustion)
        })
    }
}

/// Experience points and level progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Lifetime experience points.
    pub total_experience: i32,
    /// Current level.
    pub exp_level: i32,
    /// Progress towards the next level, 0 to 1.
    pub exp_progress: f32,
}

impl Validate for Experience {
    fn validate(&self) -> Result<(), String> {
        ensure(self.total_experience >= 0 && self.exp_level >= 0, || {
            format!(
                "negative experience (total {}, level {})",
                self.total_experience, self.exp_level
            )
        })?;
        ensure((0.0..=1.0).contains(&self.exp_progress), || {
            format!("progress {} is outside 0..=1", self.exp_progress)
        })
    }
}
