//! Pair-creation notifications
//!
//! Subscribers receive a [`PairCreated`] for every pair that is actually
//! created. Idempotent `create_pair` calls that return an existing instance
//! publish nothing. Dropped receivers are pruned on the next publish.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;
use types::{PairAddress, TokenAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCreated {
    pub token0: TokenAddress,
    pub token1: TokenAddress,
    pub pair: PairAddress,
    /// Registry length right after this pair was appended
    pub all_pairs_length: usize,
}

#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<Sender<PairCreated>>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self) -> Receiver<PairCreated> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub(crate) fn publish(&self, event: PairCreated) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event).is_ok());
        trace!(pair = %event.pair, listeners = subscribers.len(), "published PairCreated");
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
