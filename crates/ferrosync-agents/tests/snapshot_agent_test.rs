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

mod common;

use common::{registry, services, MockUser};
use ferrosync_agents::{ApplyState, SnapshotAgent};
use ferrosync_core::{AllEnabled, EventBus, Identifier, MemoryLogger, SaveCause, Scheduler, SyncEvent};
use ferrosync_infra::{InlineScheduler, ThreadedScheduler};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_threaded_apply_runs_the_continuation_off_the_authority_thread() {
    // --- 1. ARRANGE ---
    let scheduler = Arc::new(ThreadedScheduler::new(2).expect("scheduler should start"));
    let agent = SnapshotAgent::new(services(
        registry(),
        Arc::new(AllEnabled),
        scheduler.clone(),
        Arc::new(MemoryLogger::new()),
    ));
    let source = MockUser::populated("Steve");
    let snapshot = agent.create_snapshot(&source, SaveCause::ServerShutdown);
    let destination = Arc::new(MockUser::new("Steve"));
    let (tx, rx) = crossbeam_channel::bounded(1);
    let scheduler_in_task = scheduler.clone();

    // --- 2. ACT ---
    let ticket = agent.apply_snapshot(destination.clone(), snapshot, move |user| {
        let on_authority = scheduler_in_task.is_authority_context();
        let name = thread::current().name().map(str::to_string);
        tx.send((user.snapshot_state(), on_authority, name)).unwrap();
    });
    let outcome = ticket
        .wait_timeout(Duration::from_secs(5))
        .expect("apply should finish in time");

    // --- 3. ASSERT ---
    let report = outcome.expect("apply should succeed");
    assert_eq!(
        report.applied,
        vec![
            Identifier::INVENTORY,
            Identifier::HEALTH,
            Identifier::EXPERIENCE,
            Identifier::GAME_MODE
        ]
    );

    let (state, on_authority, name) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(state, source.snapshot_state());
    assert!(!on_authority);
    assert_ne!(name.as_deref(), Some("ferrosync-authority"));
    scheduler.shutdown();
}

#[test]
fn test_lifecycle_events_reach_the_bus() {
    // --- 1. ARRANGE ---
    let bus = EventBus::<SyncEvent>::default();
    let mut services = services(
        registry(),
        Arc::new(AllEnabled),
        Arc::new(InlineScheduler),
        Arc::new(MemoryLogger::new()),
    );
    services.events = Some(bus.sender());
    services.auto_pin = vec![SaveCause::InventoryCommand];
    let agent = SnapshotAgent::new(services);
    let source = MockUser::populated("Alex");

    // --- 2. ACT ---
    let snapshot = agent.create_snapshot(&source, SaveCause::InventoryCommand);
    let ticket = agent.apply_snapshot(Arc::new(MockUser::new("Alex")), snapshot.clone(), |_| {});

    // --- 3. ASSERT ---
    assert!(snapshot.pinned());
    assert_eq!(ticket.state(), ApplyState::Applied);
    let events: Vec<SyncEvent> = bus.receiver().try_iter().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        SyncEvent::SnapshotCreated { username, snapshot_id, categories }
            if username == "Alex" && *snapshot_id == snapshot.id() && categories.len() == 4
    ));
    assert!(matches!(
        &events[1],
        SyncEvent::SnapshotApplied { snapshot_id, applied, .. }
            if *snapshot_id == snapshot.id() && applied.len() == 4
    ));
}

#[test]
fn test_unpinned_causes_stay_unpinned() {
    let agent = SnapshotAgent::new(services(
        registry(),
        Arc::new(AllEnabled),
        Arc::new(InlineScheduler),
        Arc::new(MemoryLogger::new()),
    ));
    let snapshot = agent.create_snapshot(&MockUser::populated("Jeb"), SaveCause::Death);

    assert!(!snapshot.pinned());
    assert_eq!(snapshot.cause(), &SaveCause::Death);
    assert_eq!(snapshot.server_name(), "test-server");
}
