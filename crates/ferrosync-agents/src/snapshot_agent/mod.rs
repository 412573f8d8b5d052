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

//! The agent responsible for capturing and applying user snapshots.
//!
//! Capture runs wherever the caller is. Apply follows a fixed protocol: the
//! snapshot is unpacked on the calling context, every category is then
//! applied serially on the authority context in stored order, and the
//! host's continuation runs afterwards on a worker context. The caller
//! receives an [`ApplyTicket`] right away and never blocks on the authority
//! context.

mod apply;

pub use self::apply::{ApplyFailure, ApplyOutcome, ApplyReport, ApplyState, ApplyTicket};

use self::apply::{panic_message, StateCell};
use ferrosync_core::{
    ApplyError, FeatureToggles, Identifier, SaveCause, Scheduler, SyncEvent, SyncLogger,
};
use ferrosync_data::{
    ApplyContext, CategoryData, CodecRegistry, DroppedCategory, PackedSnapshot, SnapshotBuilder,
    UserDataHolder,
};
use log::Level;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

/// The shared collaborators every sync operation needs.
#[derive(Clone)]
pub struct SyncServices {
    /// Codecs for every registered category.
    pub registry: Arc<CodecRegistry>,
    /// This host's feature toggles.
    pub toggles: Arc<dyn FeatureToggles>,
    /// The host's execution contexts.
    pub scheduler: Arc<dyn Scheduler>,
    /// Where failures and drops are recorded.
    pub logger: Arc<dyn SyncLogger>,
    /// Name of this server, stamped into captured snapshots.
    pub server_name: String,
    /// Receives lifecycle events, when set.
    pub events: Option<flume::Sender<SyncEvent>>,
    /// Causes whose snapshots are pinned automatically.
    pub auto_pin: Vec<SaveCause>,
}

/// A batch of decoded categories waiting to be applied.
struct Batch {
    snapshot_id: Uuid,
    cause: SaveCause,
    entries: Vec<(Identifier, Arc<dyn CategoryData>)>,
    dropped: Vec<DroppedCategory>,
}

/// Captures snapshots from users and applies snapshots to them.
pub struct SnapshotAgent {
    services: SyncServices,
}

impl SnapshotAgent {
    /// Creates an agent over `services`.
    pub fn new(services: SyncServices) -> Self {
        Self { services }
    }

    /// The agent's collaborators.
    pub fn services(&self) -> &SyncServices {
        &self.services
    }

    /// Captures every enabled category from `user`.
    ///
    /// Categories that fail to encode are logged and left out. Snapshots
    /// whose cause is configured for auto-pinning are pinned.
    pub fn create_snapshot(&self, user: &dyn UserDataHolder, cause: SaveCause) -> PackedSnapshot {
        let services = &self.services;
        let pinned = services.auto_pin.contains(&cause);
        let (snapshot, report) = SnapshotBuilder::new(
            &services.registry,
            services.toggles.as_ref(),
            services.logger.as_ref(),
        )
        .cause(cause)
        .server_name(services.server_name.as_str())
        .pinned(pinned)
        .build_with_report(user);

        for failed in report.failed {
            publish(
                &services.events,
                SyncEvent::CategoryDropped {
                    username: user.username().to_string(),
                    snapshot_id: snapshot.id(),
                    reason: failed.reason.to_string(),
                    identifier: failed.identifier,
                },
            );
        }
        log::debug!(
            "Captured snapshot {} of {} with {} categories ({} bytes)",
            snapshot.id(),
            user.username(),
            snapshot.len(),
            snapshot.payload_size()
        );
        publish(
            &services.events,
            SyncEvent::SnapshotCreated {
                username: user.username().to_string(),
                snapshot_id: snapshot.id(),
                categories: snapshot.identifiers().cloned().collect(),
            },
        );
        snapshot
    }

    /// Applies `snapshot` to `user`, then runs `continuation` on a worker.
    ///
    /// Decoding happens on the calling context; categories that fail to
    /// decode are dropped and reported. The surviving categories are applied
    /// on the authority context in stored order, after dropping any this
    /// host disables. The first failing category aborts the rest and the
    /// continuation does not run.
    ///
    /// ## Arguments
    /// * `user` - The online holder receiving the data.
    /// * `snapshot` - The packed snapshot to decode and apply.
    /// * `continuation` - Runs on a worker once every category applied.
    ///
    /// ## Returns
    /// A ticket that tracks the apply state and resolves to its outcome.
    pub fn apply_snapshot<U, F>(
        &self,
        user: Arc<U>,
        snapshot: PackedSnapshot,
        continuation: F,
    ) -> ApplyTicket
    where
        U: UserDataHolder + 'static,
        F: FnOnce(Arc<U>) + Send + 'static,
    {
        let state = StateCell::new(ApplyState::Packed);
        let unpacked = snapshot.unpack(&self.services.registry, self.services.logger.as_ref());
        for dropped in unpacked.dropped() {
            publish(
                &self.services.events,
                SyncEvent::CategoryDropped {
                    username: user.username().to_string(),
                    snapshot_id: unpacked.id(),
                    identifier: dropped.identifier.clone(),
                    reason: dropped.reason.to_string(),
                },
            );
        }
        state.set(ApplyState::Unpacked);

        let batch = Batch {
            snapshot_id: unpacked.id(),
            cause: unpacked.cause().clone(),
            dropped: unpacked.dropped().to_vec(),
            entries: unpacked.into_data().into_iter().collect(),
        };
        self.dispatch(user, batch, state, continuation)
    }

    /// Applies one category value to `user` on the authority context.
    ///
    /// Follows the same rules as a one-category snapshot: custom values are
    /// stored in the user's custom data store and disabled categories are
    /// skipped.
    pub fn apply_data<U>(
        &self,
        user: Arc<U>,
        identifier: Identifier,
        value: Arc<dyn CategoryData>,
    ) -> ApplyTicket
    where
        U: UserDataHolder + 'static,
    {
        let batch = Batch {
            snapshot_id: Uuid::new_v4(),
            cause: SaveCause::Api,
            entries: vec![(identifier, value)],
            dropped: Vec::new(),
        };
        self.dispatch(user, batch, StateCell::new(ApplyState::Unpacked), |_| {})
    }

    fn dispatch<U, F>(
        &self,
        user: Arc<U>,
        batch: Batch,
        state: StateCell,
        continuation: F,
    ) -> ApplyTicket
    where
        U: UserDataHolder + 'static,
        F: FnOnce(Arc<U>) + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let ticket = ApplyTicket::new(batch.snapshot_id, state.shared(), receiver);
        let services = self.services.clone();

        self.services.scheduler.run_on_authority(Box::new(move || {
            state.set(ApplyState::Applying);
            let outcome = apply_batch(&services, user.as_ref(), batch);
            match &outcome {
                Ok(report) => {
                    state.set(ApplyState::Applied);
                    publish(
                        &services.events,
                        SyncEvent::SnapshotApplied {
                            username: user.username().to_string(),
                            snapshot_id: report.snapshot_id,
                            applied: report.applied.clone(),
                        },
                    );
                }
                Err(failure) => {
                    state.set(ApplyState::Failed);
                    if let ApplyFailure::Category {
                        snapshot_id,
                        identifier,
                        error,
                        ..
                    } = failure
                    {
                        publish(
                            &services.events,
                            SyncEvent::ApplyFailed {
                                username: user.username().to_string(),
                                snapshot_id: *snapshot_id,
                                identifier: identifier.clone(),
                                reason: error.to_string(),
                            },
                        );
                    }
                }
            }

            let succeeded = outcome.is_ok();
            // The ticket may already be gone; the apply itself is still done.
            let _ = sender.send(outcome);
            if succeeded {
                services
                    .scheduler
                    .run_on_worker(Box::new(move || continuation(user)));
            }
        }));

        ticket
    }
}

/// Runs on the authority context.
fn apply_batch(
    services: &SyncServices,
    user: &dyn UserDataHolder,
    batch: Batch,
) -> ApplyOutcome {
    let Batch {
        snapshot_id,
        cause,
        entries,
        dropped,
    } = batch;
    let logger = services.logger.as_ref();
    let ctx = ApplyContext::new(logger, &services.server_name, snapshot_id, cause);

    let mut applied = Vec::with_capacity(entries.len());
    let mut disabled = Vec::new();

    for (identifier, value) in entries {
        // Toggles are read here so the destination's current policy wins.
        if !identifier.is_custom() && !services.toggles.is_sync_enabled(&identifier) {
            disabled.push(identifier);
            continue;
        }
        if identifier.is_custom() {
            user.custom_data_store()
                .put(identifier.clone(), Arc::clone(&value));
        }

        logger.log(
            Level::Debug,
            &format!(
                "Applying {identifier} to {} from snapshot {snapshot_id}",
                user.username()
            ),
            None,
        );
        let result = panic::catch_unwind(AssertUnwindSafe(|| value.apply(user, &ctx)))
            .unwrap_or_else(|payload| {
                Err(ApplyError::Panicked {
                    identifier: identifier.clone(),
                    message: panic_message(payload.as_ref()),
                })
            });

        if let Err(error) = result {
            logger.log(
                Level::Error,
                &format!(
                    "Failed to apply {identifier} to {} ({}) from snapshot {snapshot_id}; skipped the remaining categories",
                    user.username(),
                    user.uuid()
                ),
                Some(&error),
            );
            return Err(ApplyFailure::Category {
                snapshot_id,
                identifier,
                applied,
                error,
            });
        }
        applied.push(identifier);
    }

    if !disabled.is_empty() {
        log::debug!(
            "Skipped {} categories disabled on this server for {}",
            disabled.len(),
            user.username()
        );
    }
    Ok(ApplyReport {
        snapshot_id,
        applied,
        disabled,
        dropped,
    })
}

fn publish(events: &Option<flume::Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(sender) = events {
        if let Err(e) = sender.send(event) {
            log::error!("Failed to publish sync event: {e}. Receiver likely disconnected.");
        }
    }
}
