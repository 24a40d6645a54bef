use std::sync::mpsc::{self, Receiver, Sender};

use super::types::PlaybackState;

/// Fan-out of state snapshots to every live subscriber.
///
/// Delivery is synchronous and in publish order; subscribers whose receiver
/// has been dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct StateBus {
    subscribers: Vec<Sender<PlaybackState>>,
}

impl StateBus {
    pub fn subscribe(&mut self) -> Receiver<PlaybackState> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, state: &PlaybackState) {
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
