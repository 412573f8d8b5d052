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
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

/// Queues every task until the owner explicitly runs it.
///
/// Makes context hops observable and deterministic: a test can assert that
/// nothing ran yet, drain the authority queue, then drain the workers.
#[derive(Default)]
pub struct ManualScheduler {
    authority: Mutex<VecDeque<Task>>,
    workers: Mutex<VecDeque<Task>>,
    draining_authority: Mutex<Option<ThreadId>>,
}

impl ManualScheduler {
    /// Creates a scheduler with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks waiting for the authority context.
    pub fn pending_authority(&self) -> usize {
        self.authority.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Tasks waiting for a worker context.
    pub fn pending_workers(&self) -> usize {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Runs queued authority tasks, including ones they queue, until none remain.
    ///
    /// Returns how many ran.
    pub fn run_authority(&self) -> usize {
        *self
            .draining_authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        let ran = drain(&self.authority, "authority");
        *self
            .draining_authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        ran
    }

    /// Runs queued worker tasks, including ones they queue, until none remain.
    ///
    /// Returns how many ran.
    pub fn run_workers(&self) -> usize {
        drain(&self.workers, "worker")
    }

    /// Alternates between both queues until both are empty.
    ///
    /// Returns how many tasks ran in total.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_authority() + self.run_workers();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

fn drain(queue: &Mutex<VecDeque<Task>>, context: &str) -> usize {
    let mut ran = 0;
    loop {
        // The lock is released before running so tasks can queue more work.
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        match next {
            Some(task) => {
                run_contained(context, task);
                ran += 1;
            }
            None => return ran,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn run_on_authority(&self, task: Task) {
        self.authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }

    fn run_on_worker(&self, task: Task) {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }

    fn is_authority_context(&self) -> bool {
        *self
            .draining_authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            == Some(thread::current().id())
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending_authority", &self.pending_authority())
            .field("pending_workers", &self.pending_workers())
            .finish()
    }
}
