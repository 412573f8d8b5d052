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

//! The public-facing SDK for hosts embedding ferrosync.
//!
//! A [`SyncPlatform`] wires settings, the codec registry, a scheduler, a
//! logger and the event bus together behind one handle. Most hosts only
//! need the [`prelude`].

use anyhow::{Context, Result};
use ferrosync_agents::{ApplyTicket, SnapshotAgent, SyncServices};
use ferrosync_core::{
    EventBus, FeatureToggles, Identifier, LogFacade, SaveCause, Scheduler, Serializer, SyncEvent,
    SyncLogger,
};
use ferrosync_data::{
    CategoryData, CodecRegistry, DataAdapter, PackedSnapshot, RegistryError, SnapshotError,
    UnpackedSnapshot, UserDataHolder,
};
use ferrosync_infra::{SyncSettings, ThreadedScheduler};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

pub mod prelude {
    pub use crate::{SyncPlatform, SyncPlatformBuilder};
    pub use ferrosync_agents::{ApplyFailure, ApplyOutcome, ApplyReport, ApplyState, ApplyTicket};
    pub use ferrosync_core::{
        AllEnabled, ApplyError, DeserializationError, FeatureToggles, Identifier, SaveCause,
        Scheduler, SerializationError, Serializer, SyncEvent, SyncLogger,
    };
    pub use ferrosync_data::model::*;
    pub use ferrosync_data::{
        ApplyContext, CategoryData, CustomDataStore, DataAdapter, PackedSnapshot, UnpackedSnapshot,
        UserDataHolder,
    };
    pub use ferrosync_infra::{init_logging, InlineScheduler, SyncSettings, ThreadedScheduler};
}

/// Configures and starts a [`SyncPlatform`].
#[derive(Default)]
pub struct SyncPlatformBuilder {
    settings: Option<SyncSettings>,
    settings_path: Option<PathBuf>,
    scheduler: Option<Arc<dyn Scheduler>>,
    logger: Option<Arc<dyn SyncLogger>>,
}

impl SyncPlatformBuilder {
    /// Uses `settings` as-is. Takes precedence over [`Self::settings_file`].
    pub fn settings(mut self, settings: SyncSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Loads settings from a TOML file at build time, or uses the defaults if it is missing.
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Replaces the default [`ThreadedScheduler`].
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Replaces the default logger, which forwards to the `log` crate.
    pub fn logger(mut self, logger: Arc<dyn SyncLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Validates the settings and starts the platform.
    pub fn build(self) -> Result<SyncPlatform> {
        let settings = match (self.settings, self.settings_path) {
            (Some(settings), _) => {
                settings.validate().context("invalid sync settings")?;
                settings
            }
            (None, Some(path)) => SyncSettings::load_or_default(&path).with_context(|| {
                format!("failed to load sync settings from '{}'", path.display())
            })?,
            (None, None) => SyncSettings::default(),
        };

        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(
                ThreadedScheduler::new(settings.workers.threads)
                    .context("failed to start the sync scheduler")?,
            ),
        };
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(LogFacade) as Arc<dyn SyncLogger>);

        let registry = Arc::new(CodecRegistry::with_builtins(settings.snapshots.adapter));
        let events = EventBus::new();
        let server_name = settings.server_name.clone();
        let auto_pin = settings.snapshots.auto_pin.clone();
        let settings = Arc::new(RwLock::new(settings));

        let agent = SnapshotAgent::new(SyncServices {
            registry: Arc::clone(&registry),
            toggles: settings.clone(),
            scheduler,
            logger,
            server_name: server_name.clone(),
            events: Some(events.sender()),
            auto_pin,
        });

        log::info!(
            "Sync platform '{server_name}' ready with {} registered categories.",
            registry.len()
        );
        Ok(SyncPlatform {
            settings,
            registry,
            agent,
            events,
        })
    }
}

/// One host's handle on snapshot capture, storage encoding and apply.
pub struct SyncPlatform {
    settings: Arc<RwLock<SyncSettings>>,
    registry: Arc<CodecRegistry>,
    agent: SnapshotAgent,
    events: EventBus<SyncEvent>,
}

impl SyncPlatform {
    /// Starts configuring a platform.
    pub fn builder() -> SyncPlatformBuilder {
        SyncPlatformBuilder::default()
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> SyncSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The codec registry shared with the agent.
    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    /// The agent driving capture and apply.
    pub fn agent(&self) -> &SnapshotAgent {
        &self.agent
    }

    /// Registers a third-party category.
    ///
    /// ## Arguments
    /// * `identifier` - A custom identifier outside the `minecraft` namespace.
    /// * `serializer` - The codec for values stored under `identifier`.
    ///
    /// ## Returns
    /// An error if `identifier` is already registered.
    pub fn register_custom<T, S>(
        &self,
        identifier: Identifier,
        serializer: S,
    ) -> Result<(), RegistryError>
    where
        T: CategoryData,
        S: Serializer<T> + 'static,
    {
        self.registry.register(identifier, serializer)
    }

    /// Turns a built-in category on or off for later captures and applies.
    ///
    /// ## Arguments
    /// * `identifier` - The built-in category to change.
    /// * `enabled` - Whether it is synchronized from now on.
    pub fn set_feature(&self, identifier: &Identifier, enabled: bool) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_feature(identifier, enabled);
    }

    /// Whether `identifier` is currently synchronized on this host.
    pub fn is_sync_enabled(&self, identifier: &Identifier) -> bool {
        self.settings.is_sync_enabled(identifier)
    }

    /// A receiver for lifecycle events. Every receiver sees each event once in total.
    pub fn events(&self) -> flume::Receiver<SyncEvent> {
        self.events.receiver()
    }

    /// Captures every enabled category from `user`.
    ///
    /// ## Arguments
    /// * `user` - The online holder to read from.
    /// * `cause` - Why the snapshot is taken; some causes pin it.
    ///
    /// ## Returns
    /// The packed snapshot, stamped with this server's name.
    pub fn create_snapshot(&self, user: &dyn UserDataHolder, cause: SaveCause) -> PackedSnapshot {
        self.agent.create_snapshot(user, cause)
    }

    /// Applies `snapshot` to `user`; see [`SnapshotAgent::apply_snapshot`].
    ///
    /// ## Returns
    /// A ticket resolving to the apply report or the first failure.
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
        self.agent.apply_snapshot(user, snapshot, continuation)
    }

    /// Applies one category value to `user` on the authority context.
    ///
    /// ## Arguments
    /// * `user` - The online holder receiving the value.
    /// * `identifier` - The category `value` belongs to.
    /// * `value` - The decoded category value.
    ///
    /// ## Returns
    /// A ticket resolving once the value is applied.
    pub fn apply_data<U>(
        &self,
        user: Arc<U>,
        identifier: Identifier,
        value: Arc<dyn CategoryData>,
    ) -> ApplyTicket
    where
        U: UserDataHolder + 'static,
    {
        self.agent.apply_data(user, identifier, value)
    }

    /// Decodes `snapshot` with this host's registry.
    pub fn unpack_snapshot(&self, snapshot: &PackedSnapshot) -> UnpackedSnapshot {
        snapshot.unpack(&self.registry, self.agent.services().logger.as_ref())
    }

    /// The storage form of `snapshot`, using the configured adapter.
    ///
    /// ## Returns
    /// The framed header followed by the encoded body.
    pub fn encode_snapshot(&self, snapshot: &PackedSnapshot) -> Result<Vec<u8>, SnapshotError> {
        snapshot.to_bytes(self.adapter())
    }

    /// Reads a snapshot written by any host, whatever its adapter.
    ///
    /// Entries with unreadable keys or payloads are logged and skipped.
    ///
    /// ## Arguments
    /// * `bytes` - Bytes produced by [`Self::encode_snapshot`] on any host.
    ///
    /// ## Returns
    /// The packed snapshot, or an error if the header or body is unreadable.
    pub fn decode_snapshot(&self, bytes: &[u8]) -> Result<PackedSnapshot, SnapshotError> {
        PackedSnapshot::from_bytes(bytes, self.agent.services().logger.as_ref())
    }

    fn adapter(&self) -> DataAdapter {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshots
            .adapter
    }
}

impl std::fmt::Debug for SyncPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncPlatform")
            .field("server_name", &self.agent.services().server_name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
