//! Node Orchestration Module
//!
//! One `Node` owns everything a single replica needs: its engine task, the
//! peer sink registry feeding its replicas, its WAL and snapshot paths, and
//! the routes it contributes to the shared HTTP server. Nothing here is
//! process-global; the binary owns the nodes it builds.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use axum::routing::{get, post};
use axum::{Extension, Router};
use tokio::sync::watch;

use crate::engine::{Engine, EngineHandle};
use crate::gateway::handlers::{
    handle_delete, handle_insert, handle_replace, handle_replication, handle_select,
    handle_snapshot,
};
use crate::gateway::protocol::{
    ENDPOINT_DELETE, ENDPOINT_INSERT, ENDPOINT_REPLACE, ENDPOINT_REPLICATION, ENDPOINT_SELECT,
    ENDPOINT_SNAPSHOT,
};
use crate::replication::{PeerRegistry, open_peer_sinks};
use crate::storage::{SnapshotStore, WalStore};

const SNAPSHOT_FILE: &str = "snapshot.json";
const WAL_FILE: &str = "wal.txt";

/// A single replica: engine handle, peer topology, and its HTTP surface.
pub struct Node {
    pub name: String,
    pub peers: Vec<String>,
    pub leader: bool,
    pub engine: EngineHandle,
    selects_in_flight: AtomicI32,
    shutdown: watch::Sender<bool>,
}

impl Node {
    /// Build the node: open sinks to its peers, spawn the engine loop
    /// (which recovers from `data_dir` before serving), and return the
    /// handle-holding orchestrator.
    pub fn start(
        name: &str,
        peers: Vec<String>,
        leader: bool,
        data_dir: &Path,
        gateway_addr: SocketAddr,
    ) -> Arc<Self> {
        let wal = WalStore::new(data_dir.join(WAL_FILE));
        let snapshot = SnapshotStore::new(data_dir.join(SNAPSHOT_FILE));

        let registry = Arc::new(PeerRegistry::new(name));
        open_peer_sinks(&registry, name, &peers, gateway_addr);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (engine, handle) = Engine::new(name, wal, snapshot, registry, shutdown_rx);
        tokio::spawn(engine.run());

        Arc::new(Self {
            name: name.to_string(),
            peers,
            leader,
            engine: handle,
            selects_in_flight: AtomicI32::new(0),
            shutdown: shutdown_tx,
        })
    }

    /// Ask the engine loop to stop once the command in hand is finished.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// The routes this node contributes, to be nested under `/{name}`.
    pub fn routes(self: &Arc<Self>) -> Router {
        Router::new()
            .route(ENDPOINT_SELECT, get(handle_select))
            .route(ENDPOINT_INSERT, post(handle_insert))
            .route(ENDPOINT_REPLACE, post(handle_replace))
            .route(ENDPOINT_DELETE, post(handle_delete))
            .route(ENDPOINT_SNAPSHOT, get(handle_snapshot))
            .route(ENDPOINT_REPLICATION, post(handle_replication))
            .layer(Extension(self.clone()))
    }

    pub(crate) fn begin_select(&self) -> i32 {
        self.selects_in_flight.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn end_select(&self) {
        self.selects_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
