use std::sync::Arc;

use dashmap::DashMap;

use crate::error::SinkError;
use crate::feature::Transaction;

/// Outbound message channel to one peer replica.
///
/// `send` must preserve per-peer ordering and must not block the caller; the
/// engine's broadcast order equals its application order only as long as the
/// sink keeps it.
pub trait PeerSink: Send + Sync {
    fn send(&self, tx: &Transaction) -> Result<(), SinkError>;
}

/// Thread-safe map of peer name to outbound sink.
///
/// Shared between the engine (broadcast) and the transport acceptor
/// (add/remove as peers come and go); eventually consistent with the set of
/// live peers.
pub struct PeerRegistry {
    name: String,
    sinks: DashMap<String, Arc<dyn PeerSink>>,
}

impl PeerRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sinks: DashMap::new(),
        }
    }

    pub fn add(&self, peer: impl Into<String>, sink: Arc<dyn PeerSink>) {
        self.sinks.insert(peer.into(), sink);
    }

    pub fn remove(&self, peer: &str) {
        self.sinks.remove(peer);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Send `tx` to every registered peer.
    ///
    /// Only transactions this node originated are propagated; everything
    /// else was learned from a peer and is dropped here. Peers whose sink
    /// fails are collected during the iteration and evicted after it — the
    /// map must not be mutated mid-iteration. Broadcast itself never fails.
    pub fn broadcast(&self, tx: &Transaction) {
        if tx.origin != self.name {
            return;
        }

        let mut failed: Vec<String> = Vec::new();
        for entry in self.sinks.iter() {
            if let Err(err) = entry.value().send(tx) {
                tracing::error!("Broadcast to {} failed: {}", entry.key(), err);
                failed.push(entry.key().clone());
            }
        }

        for peer in failed {
            self.sinks.remove(&peer);
            tracing::warn!("Evicted peer {} after failed broadcast", peer);
        }
    }
}
