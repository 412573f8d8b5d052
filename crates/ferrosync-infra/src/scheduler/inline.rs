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

use super::run_contained;
use ferrosync_core::{Scheduler, Task};

/// Runs every task immediately on the calling thread.
///
/// The caller is treated as the authority context.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn run_on_authority(&self, task: Task) {
        run_contained("authority", task);
    }

    fn run_on_worker(&self, task: Task) {
        run_contained("worker", task);
    }

    fn is_authority_context(&self) -> bool {
        true
    }
}
