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

//! # Ferrosync Infra
//!
//! Concrete implementations of the contracts defined in `ferrosync-core`:
//! schedulers providing the authority and worker contexts, the TOML settings
//! that double as feature toggles, and logger initialisation.

pub mod logging;
pub mod scheduler;
pub mod settings;

pub use logging::init_logging;
pub use scheduler::{InlineScheduler, ManualScheduler, ThreadedScheduler};
pub use settings::{SettingsError, SnapshotSettings, SyncSettings, SynchronizationSettings, WorkerSettings};
