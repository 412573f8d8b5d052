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

use ferrosync_core::{DeserializationError, SerializationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The host-selected byte format for simple values and snapshot containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataAdapter {
    /// Plain UTF-8 JSON.
    #[default]
    Json,
    /// JSON compressed as a size-prefixed LZ4 block.
    CompressedJson,
    /// Compact `bincode` encoding.
    Binary,
}

impl DataAdapter {
    /// Every adapter, by header id.
    pub const ALL: [DataAdapter; 3] = [
        DataAdapter::Json,
        DataAdapter::CompressedJson,
        DataAdapter::Binary,
    ];

    /// The byte written into snapshot headers for this adapter.
    pub fn id(self) -> u8 {
        match self {
            DataAdapter::Json => 0,
            DataAdapter::CompressedJson => 1,
            DataAdapter::Binary => 2,
        }
    }

    /// The adapter a header byte refers to.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|adapter| adapter.id() == id)
    }

    /// Settings name of the adapter.
    pub fn name(self) -> &'static str {
        match self {
            DataAdapter::Json => "json",
            DataAdapter::CompressedJson => "compressed_json",
            DataAdapter::Binary => "binary",
        }
    }

    /// Encodes `value` in this adapter's format.
    pub fn to_bytes<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, SerializationError> {
        match self {
            DataAdapter::Json => serde_json::to_vec(value).map_err(encoding),
            DataAdapter::CompressedJson => {
                let json = serde_json::to_vec(value).map_err(encoding)?;
                Ok(lz4_flex::compress_prepend_size(&json))
            }
            DataAdapter::Binary => {
                bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(encoding)
            }
        }
    }

    /// Decodes a value previously written by [`DataAdapter::to_bytes`].
    pub fn from_bytes<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, DeserializationError> {
        match self {
            DataAdapter::Json => serde_json::from_slice(bytes).map_err(malformed),
            DataAdapter::CompressedJson => {
                let json = lz4_flex::decompress_size_prepended(bytes).map_err(malformed)?;
                serde_json::from_slice(&json).map_err(malformed)
            }
            DataAdapter::Binary => {
                let (value, read) =
                    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                        .map_err(malformed)?;
                if read != bytes.len() {
                    return Err(DeserializationError::Malformed(format!(
                        "{} trailing bytes after value",
                        bytes.len() - read
                    )));
                }
                Ok(value)
            }
        }
    }
}

impl fmt::Display for DataAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataAdapter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|adapter| adapter.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown data adapter `{s}`"))
    }
}

fn encoding(error: impl fmt::Display) -> SerializationError {
    SerializationError::Encoding(error.to_string())
}

fn malformed(error: impl fmt::Display) -> DeserializationError {
    DeserializationError::Malformed(error.to_string())
}
