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

//! The apply protocol's observable state and outcome.

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use ferrosync_core::{ApplyError, Identifier};
use ferrosync_data::DroppedCategory;
use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Where an apply currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyState {
    /// Received, not yet decoded.
    Packed,
    /// Decoded, waiting for the authority context.
    Unpacked,
    /// Categories are being applied on the authority context.
    Applying,
    /// Every surviving category was applied.
    Applied,
    /// A category failed; the rest of the batch was skipped.
    Failed,
}

impl ApplyState {
    /// Whether the apply has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, ApplyState::Applied | ApplyState::Failed)
    }
}

/// The result of a completed apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    /// The applied snapshot.
    pub snapshot_id: Uuid,
    /// Categories applied, in order.
    pub applied: Vec<Identifier>,
    /// Categories skipped because this host's toggles disable them.
    pub disabled: Vec<Identifier>,
    /// Categories dropped while unpacking.
    pub dropped: Vec<DroppedCategory>,
}

/// Why an apply did not complete.
#[derive(Debug, Error)]
pub enum ApplyFailure {
    /// A category's apply failed and the batch was aborted.
    #[error("failed to apply {identifier} from snapshot {snapshot_id}")]
    Category {
        /// The snapshot being applied.
        snapshot_id: Uuid,
        /// The category that failed.
        identifier: Identifier,
        /// Categories applied before the failure.
        applied: Vec<Identifier>,
        /// The underlying error.
        #[source]
        error: ApplyError,
    },
    /// The authority task was discarded before it ran, e.g. on shutdown.
    #[error("apply of snapshot {snapshot_id} was abandoned before it ran")]
    Abandoned {
        /// The snapshot being applied.
        snapshot_id: Uuid,
    },
}

/// What an [`ApplyTicket`] resolves to.
pub type ApplyOutcome = Result<ApplyReport, ApplyFailure>;

/// A handle onto one in-flight apply.
///
/// The state can be sampled at any time. The outcome is delivered exactly
/// once; the waiting methods consume the ticket, and the non-blocking ones
/// hand it back while the apply is still running.
#[derive(Debug)]
pub struct ApplyTicket {
    snapshot_id: Uuid,
    state: Arc<Mutex<ApplyState>>,
    outcome: Receiver<ApplyOutcome>,
}

impl ApplyTicket {
    pub(super) fn new(
        snapshot_id: Uuid,
        state: Arc<Mutex<ApplyState>>,
        outcome: Receiver<ApplyOutcome>,
    ) -> Self {
        Self {
            snapshot_id,
            state,
            outcome,
        }
    }

    /// The snapshot being applied.
    pub fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// The current state.
    pub fn state(&self) -> ApplyState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the apply finishes.
    ///
    /// Must not be called from the authority context itself: the apply it
    /// waits for runs there.
    pub fn wait(self) -> ApplyOutcome {
        self.outcome.recv().unwrap_or(Err(ApplyFailure::Abandoned {
            snapshot_id: self.snapshot_id,
        }))
    }

    /// Blocks up to `timeout`; hands the ticket back if the apply is still running.
    pub fn wait_timeout(self, timeout: Duration) -> Result<ApplyOutcome, ApplyTicket> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(self.abandoned())),
        }
    }

    /// Returns the outcome if it is ready, or the ticket back if not.
    pub fn try_outcome(self) -> Result<ApplyOutcome, ApplyTicket> {
        match self.outcome.try_recv() {
            Ok(outcome) => Ok(outcome),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(Err(self.abandoned())),
        }
    }

    fn abandoned(&self) -> ApplyFailure {
        ApplyFailure::Abandoned {
            snapshot_id: self.snapshot_id,
        }
    }
}

/// Shared state cell written by the agent while an apply progresses.
#[derive(Debug, Clone)]
pub(super) struct StateCell(Arc<Mutex<ApplyState>>);

impl StateCell {
    pub(super) fn new(initial: ApplyState) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    pub(super) fn set(&self, state: ApplyState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub(super) fn shared(&self) -> Arc<Mutex<ApplyState>> {
        Arc::clone(&self.0)
    }
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_dropped_sender_resolves_as_abandoned() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let state = StateCell::new(ApplyState::Unpacked);
        let ticket = ApplyTicket::new(Uuid::nil(), state.shared(), receiver);

        let ticket = ticket.try_outcome().err().unwrap();
        drop(sender);

        assert!(matches!(
            ticket.wait(),
            Err(ApplyFailure::Abandoned { .. })
        ));
    }

    #[test]
    fn the_state_is_shared_with_the_ticket() {
        let (_sender, receiver) = crossbeam_channel::bounded::<ApplyOutcome>(1);
        let state = StateCell::new(ApplyState::Packed);
        let ticket = ApplyTicket::new(Uuid::nil(), state.shared(), receiver);

        state.set(ApplyState::Applying);
        assert_eq!(ticket.state(), ApplyState::Applying);
        assert!(!ticket.state().is_terminal());

        let ticket = ticket.wait_timeout(Duration::from_millis(5)).err().unwrap();
        assert_eq!(ticket.snapshot_id(), Uuid::nil());
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
