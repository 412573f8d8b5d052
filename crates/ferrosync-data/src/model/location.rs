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
use uuid::Uuid;

/// The dimension type of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    /// The overworld.
    Normal,
    /// The nether.
    Nether,
    /// The end.
    TheEnd,
    /// A dimension added by a data pack or mod.
    Custom,
}

/// A reference to a world by name and uuid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRef {
    /// The world's folder name.
    pub name: String,
    /// The world's uuid.
    pub uuid: Uuid,
    /// The world's dimension type.
    pub environment: Environment,
}

/// The player's position and facing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// The world the player is in.
    pub world: WorldRef,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
    /// Horizontal rotation in degrees.
    pub yaw: f32,
    /// Vertical rotation in degrees, -90 to 90.
    pub pitch: f32,
}

impl Validate for Location {
    fn validate(&self) -> Result<(), String> {
        ensure(
            self.x.is_finite() && self.y.is_finite() && self.z.is_finite(),
            || format!("non-finite coordinates ({}, {}, {})", self.x, self.y, self.z),
        )?;
        ensure(self.yaw.is_finite(), || format!("non-finite yaw {}", self.yaw))?;
        ensure((-90.0..=90.0).contains(&self.pitch), || {
            format!("pitch {} is outside -90..=90", self.pitch)
        })
    }
}
