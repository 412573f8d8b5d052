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

//! The two execution contexts every host provides.
//!
//! A server process has exactly one *authority* context that may mutate live
//! game state (the "main thread"), and any number of worker contexts for
//! encoding, decoding and I/O. Concrete schedulers live in `ferrosync-infra`.

/// A unit of work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Dispatches work onto the host's execution contexts.
///
/// Neither method blocks the caller. Tasks queued onto the authority context
/// run one at a time, to completion, in submission order.
pub trait Scheduler: Send + Sync {
    /// Queues `task` onto the single authoritative game-state context.
    fn run_on_authority(&self, task: Task);

    /// Queues `task` onto a worker context that never blocks live game state.
    fn run_on_worker(&self, task: Task);

    /// Returns `true` when called from within the authority context.
    fn is_authority_context(&self) -> bool;
}
