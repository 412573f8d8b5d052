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

//! Defines the codec contract every data category is persisted through.
//!
//! The core of this module is the [`Serializer`] trait. Each category binds one
//! serializer in the codec registry; the byte format it produces is private to
//! that serializer and is never introspected by anything else.

use thiserror::Error;

/// An error that can occur while encoding a category value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    /// The value is not in a representable state (e.g. a NaN coordinate).
    #[error("value cannot be represented: {reason}")]
    Unrepresentable {
        /// Which invariant the value violates.
        reason: String,
    },
    /// The underlying format failed to encode the value.
    #[error("encoding failed: {0}")]
    Encoding(String),
    /// A type-erased value did not match the type the codec was registered for.
    #[error("expected a value of type `{expected}`, got `{found}`")]
    TypeMismatch {
        /// The codec's registered type.
        expected: &'static str,
        /// A description of what was supplied.
        found: String,
    },
}

/// An error that can occur while decoding a category payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeserializationError {
    /// The bytes are corrupted or do not match the expected format.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// The bytes decoded, but into a value that violates its invariants.
    #[error("decoded value is invalid: {reason}")]
    InvalidData {
        /// Which invariant the decoded value violates.
        reason: String,
    },
    /// The payload was written by an incompatible format version.
    #[error("unsupported format version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// The version found in the payload.
        found: u32,
        /// The newest version this build understands.
        supported: u32,
    },
}

/// The abstract contract for a category codec.
///
/// Implementations must be pure: `serialize` only reads the supplied value and
/// `deserialize` only reads the supplied bytes. Neither may touch live game
/// state. Both may be called concurrently from many worker threads.
pub trait Serializer<T>: Send + Sync {
    /// Encodes `value` into this codec's private byte format.
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError>;

    /// Decodes bytes produced by [`Serializer::serialize`].
    ///
    /// Must fail with a [`DeserializationError`] rather than return a value
    /// that violates the category's invariants.
    fn deserialize(&self, bytes: &[u8]) -> Result<T, DeserializationError>;
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for Box<S> {
    fn serialize(&self, value: &T) -> Result<Vec<u8>, SerializationError> {
        (**self).serialize(value)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<T, DeserializationError> {
        (**self).deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Serializer<u32> for Counter {
        fn serialize(&self, value: &u32) -> Result<Vec<u8>, SerializationError> {
            Ok(value.to_le_bytes().to_vec())
        }

        fn deserialize(&self, bytes: &[u8]) -> Result<u32, DeserializationError> {
            let raw: [u8; 4] = bytes
                .try_into()
                .map_err(|_| DeserializationError::Malformed(format!("{} bytes", bytes.len())))?;
            Ok(u32::from_le_bytes(raw))
        }
    }

    #[test]
    fn boxed_serializers_delegate() {
        let boxed: Box<dyn Serializer<u32>> = Box::new(Counter);
        let bytes = boxed.serialize(&7).unwrap();
        assert_eq!(boxed.deserialize(&bytes).unwrap(), 7);
        assert!(matches!(
            boxed.deserialize(&[1, 2]),
            Err(DeserializationError::Malformed(_))
        ));
    }
}
