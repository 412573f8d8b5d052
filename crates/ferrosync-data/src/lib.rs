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

//! # Ferrosync Data
//!
//! The in-memory representations of every synchronizable category, the codecs
//! that turn them into bytes, the registry binding identifiers to codecs, and
//! the packed/unpacked snapshot containers built on top of them.

pub mod codec;
pub mod holder;
pub mod model;
pub mod registry;
pub mod snapshot;

pub use codec::{AdapterSerializer, DataAdapter, JsonSerializer, RonSerializer};
pub use holder::{ApplyContext, CustomDataStore, UserDataHolder};
pub use model::CategoryData;
pub use registry::{CategoryCodec, CodecError, CodecRegistry, RegistryError, TypeTag};
pub use snapshot::{
    BuildReport, DroppedCategory, PackedSnapshot, SnapshotBuilder, SnapshotError,
    UnpackedSnapshot, CURRENT_FORMAT_VERSION,
};
