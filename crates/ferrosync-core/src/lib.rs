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

//! # Ferrosync Core
//!
//! Foundational crate containing the identifiers, codec contract, and the
//! scheduling and logging interfaces that every other ferrosync crate builds on.
//! Nothing in here touches a live game object.

#![warn(missing_docs)]

pub mod cause;
pub mod error;
pub mod event;
pub mod identifier;
pub mod logging;
pub mod scheduler;
pub mod serializer;
pub mod toggle;

pub use cause::SaveCause;
pub use error::ApplyError;
pub use event::{EventBus, SyncEvent};
pub use identifier::{Identifier, IdentifierError};
pub use logging::{LogFacade, LogRecord, MemoryLogger, SyncLogger};
pub use scheduler::{Scheduler, Task};
pub use serializer::{DeserializationError, SerializationError, Serializer};
pub use toggle::{AllEnabled, FeatureToggles};
