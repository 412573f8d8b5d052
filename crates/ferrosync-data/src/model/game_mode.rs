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

/// The four vanilla game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameModeKind {
    /// Survival mode.
    Survival,
    /// Creative mode.
    Creative,
    /// Adventure mode.
    Adventure,
    /// Spectator mode.
    Spectator,
}

/// Game mode together with the flight state it governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMode {
    /// The active game mode.
    pub mode: GameModeKind,
    /// Whether the player may fly.
    pub allow_flight: bool,
    /// Whether the player is currently flying.
    pub is_flying: bool,
}

impl GameMode {
    /// `mode` with the flight state that mode grants by default.
    pub fn new(mode: GameModeKind) -> Self {
        let flies = matches!(mode, GameModeKind::Spectator);
        Self {
            mode,
            allow_flight: flies || matches!(mode, GameModeKind::Creative),
            is_flying: flies,
        }
    }
}

impl Validate for GameMode {
    fn validate(&self) -> Result<(), String> {
        ensure(self.allow_flight || !self.is_flying, || {
            "player is flying without being allowed to".into()
        })
    }
}
