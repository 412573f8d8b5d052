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

//! Errors raised while mutating a live user.

use crate::identifier::Identifier;
use thiserror::Error;

/// A failure during a category's live-mutation step.
///
/// An `ApplyError` aborts the remaining categories of the apply batch it
/// occurred in. It is never retried automatically.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The destination does not support this category.
    #[error("category {0} is not supported by this user")]
    Unsupported(Identifier),
    /// The value cannot be applied to this destination.
    #[error("cannot apply {identifier}: {reason}")]
    InvalidValue {
        /// The category being applied.
        identifier: Identifier,
        /// Why the destination rejected the value.
        reason: String,
    },
    /// The host engine reported a failure.
    #[error("host failed to apply {identifier}: {source}")]
    Host {
        /// The category being applied.
        identifier: Identifier,
        /// The host's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The apply implementation panicked; the panic was contained.
    #[error("applying {identifier} panicked: {message}")]
    Panicked {
        /// The category being applied.
        identifier: Identifier,
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl ApplyError {
    /// Convenience constructor wrapping a host error.
    pub fn host(
        identifier: Identifier,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ApplyError::Host {
            identifier,
            source: source.into(),
        }
    }

    /// The category this error refers to.
    pub fn identifier(&self) -> &Identifier {
        match self {
            ApplyError::Unsupported(identifier)
            | ApplyError::InvalidValue { identifier, .. }
            | ApplyError::Host { identifier, .. }
            | ApplyError::Panicked { identifier, .. } => identifier,
        }
    }
}
