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

//! Feature toggles deciding which categories are synchronized on this host.

use crate::identifier::Identifier;
use std::sync::{PoisonError, RwLock};

/// Answers whether a category is enabled for sync on this host.
///
/// Queried both when a snapshot is captured and when one is applied, so a
/// destination's policy always wins over whatever the source captured.
pub trait FeatureToggles: Send + Sync {
    /// Returns `true` if `identifier` should be captured and applied.
    fn is_sync_enabled(&self, identifier: &Identifier) -> bool;
}

/// Enables every category.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEnabled;

impl FeatureToggles for AllEnabled {
    fn is_sync_enabled(&self, _identifier: &Identifier) -> bool {
        true
    }
}

/// Lets a host swap its toggles at runtime while agents keep a shared handle.
impl<T: FeatureToggles> FeatureToggles for RwLock<T> {
    fn is_sync_enabled(&self, identifier: &Identifier) -> bool {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_sync_enabled(identifier)
    }
}

impl<F> FeatureToggles for F
where
    F: Fn(&Identifier) -> bool + Send + Sync,
{
    fn is_sync_enabled(&self, identifier: &Identifier) -> bool {
        self(identifier)
    }
}
