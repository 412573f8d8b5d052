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

//! Schedulers providing the authority and worker contexts.
//!
//! - [`ThreadedScheduler`]: a dedicated authority thread and a worker pool,
//!   for standalone hosts and integration tests.
//! - [`InlineScheduler`]: runs everything on the caller, for single-threaded hosts.
//! - [`ManualScheduler`]: queues everything until told to run it, for
//!   deterministic tests.

mod inline;
mod manual;
mod threaded;

pub use self::inline::InlineScheduler;
pub use self::manual::ManualScheduler;
pub use self::threaded::ThreadedScheduler;

use ferrosync_core::Task;
use std::panic::{self, AssertUnwindSafe};

/// Runs `task`, logging instead of propagating a panic.
fn run_contained(context: &str, task: Task) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        log::error!("A task panicked on the {context} context: {message}");
    }
}
