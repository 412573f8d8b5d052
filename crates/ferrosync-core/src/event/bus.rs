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

/// A thread-safe broadcast point for sync lifecycle events.
///
/// Generic over the event type so hosts can reuse it for their own
/// notifications. Publishing never fails the caller: a disconnected receiver
/// only produces a log line.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Sync EventBus initialized.");
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if every receiver is gone.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to publish sync event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sending end, for the agents that emit events.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a clone of the receiving end, for subscribers.
    pub fn receiver(&self) -> flume::Receiver<T> {
        self.receiver.clone()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
