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
use crossbeam_channel::{Receiver, Sender};
use ferrosync_core::{Scheduler, Task};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

const AUTHORITY_THREAD_NAME: &str = "ferrosync-authority";
const WORKER_THREAD_NAME: &str = "ferrosync-worker";
const WORKER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

enum Job {
    Run(Task),
    Shutdown,
}

/// A dedicated authority thread plus a `tokio` worker pool.
///
/// Authority tasks run one at a time in submission order on a single named
/// thread. Worker tasks run on the pool's blocking threads. A panicking
/// task is logged and never takes its thread down.
pub struct ThreadedScheduler {
    sender: Sender<Job>,
    authority: Mutex<Option<JoinHandle<()>>>,
    authority_id: ThreadId,
    runtime: Mutex<Option<Runtime>>,
    workers: Handle,
    running: AtomicBool,
}

impl ThreadedScheduler {
    /// Starts the authority thread and a pool of `worker_threads` workers.
    pub fn new(worker_threads: usize) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .max_blocking_threads(worker_threads.max(1))
            .thread_name(WORKER_THREAD_NAME)
            .build()?;
        let workers = runtime.handle().clone();

        let (sender, receiver) = crossbeam_channel::unbounded();
        let authority = thread::Builder::new()
            .name(AUTHORITY_THREAD_NAME.to_string())
            .spawn(move || authority_loop(receiver))?;
        let authority_id = authority.thread().id();

        log::info!("Sync scheduler started with {} worker threads.", worker_threads.max(1));
        Ok(Self {
            sender,
            authority: Mutex::new(Some(authority)),
            authority_id,
            runtime: Mutex::new(Some(runtime)),
            workers,
            running: AtomicBool::new(true),
        })
    }

    /// Whether the scheduler still accepts work.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops accepting work, finishes the tasks already queued on the
    /// authority context and joins its thread.
    ///
    /// When called from the authority thread itself the join is skipped.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if self.sender.send(Job::Shutdown).is_err() {
            log::warn!("Authority thread already stopped.");
        }

        let handle = self
            .authority
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if thread::current().id() == self.authority_id {
                log::debug!("Sync scheduler shut down from its own authority thread; not joining.");
            } else if handle.join().is_err() {
                log::error!("Authority thread terminated abnormally.");
            }
        }

        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            // Blocking on shutdown is not allowed from inside the pool.
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            } else {
                runtime.shutdown_timeout(WORKER_SHUTDOWN_GRACE);
            }
        }
        log::info!("Sync scheduler stopped.");
    }
}

fn authority_loop(receiver: Receiver<Job>) {
    log::debug!("Authority thread started.");
    for job in receiver {
        match job {
            Job::Run(task) => run_contained("authority", task),
            Job::Shutdown => break,
        }
    }
    log::debug!("Authority thread stopped.");
}

impl Scheduler for ThreadedScheduler {
    fn run_on_authority(&self, task: Task) {
        if !self.is_running() || self.sender.send(Job::Run(task)).is_err() {
            log::warn!("Dropped an authority task: the scheduler is shut down.");
        }
    }

    fn run_on_worker(&self, task: Task) {
        if !self.is_running() {
            log::warn!("Dropped a worker task: the scheduler is shut down.");
            return;
        }
        drop(self.workers.spawn_blocking(move || run_contained("worker", task)));
    }

    fn is_authority_context(&self) -> bool {
        thread::current().id() == self.authority_id
    }
}

impl Drop for ThreadedScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ThreadedScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedScheduler")
            .field("authority_id", &self.authority_id)
            .field("running", &self.is_running())
            .finish()
    }
}
