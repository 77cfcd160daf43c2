use std::collections::HashMap;
use std::sync::Arc;

use geo_types::Rect;
use tokio::sync::{mpsc, oneshot, watch};

use super::command::EngineCommand;
use crate::error::EngineError;
use crate::feature::{Action, FeaturePayload, FeatureRecord, Transaction};
use crate::index::SpatialIndex;
use crate::replication::PeerRegistry;
use crate::storage::{SnapshotStore, WalStore};

const COMMAND_QUEUE_DEPTH: usize = 64;

/// How a transaction reached the apply path. Replayed transactions are
/// already durable and must be neither re-appended to the WAL nor
/// broadcast.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ApplyMode {
    Durable,
    Replay,
}

/// The single-writer state machine owning one node's data.
///
/// The map, the spatial index and the vector clock are consistent only when
/// mutated together, so the loop serves one command to completion at a time.
/// Everything outside talks to it through an [`EngineHandle`].
pub struct Engine {
    name: String,
    data: HashMap<String, FeatureRecord>,
    index: SpatialIndex,
    vclock: HashMap<String, u64>,
    wal: WalStore,
    snapshot: SnapshotStore,
    sinks: Arc<PeerRegistry>,
    commands: mpsc::Receiver<EngineCommand>,
    shutdown: watch::Receiver<bool>,
}

/// Cloneable enqueue-and-await facade over the engine's command queue.
///
/// Every method blocks on the reply channel, so a successful return means
/// the command has been fully served; a subsequent read issued by the same
/// caller observes its effect.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
}

impl Engine {
    pub fn new(
        name: &str,
        wal: WalStore,
        snapshot: SnapshotStore,
        sinks: Arc<PeerRegistry>,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, EngineHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let engine = Self {
            name: name.to_string(),
            data: HashMap::new(),
            index: SpatialIndex::new(),
            vclock: HashMap::new(),
            wal,
            snapshot,
            sinks,
            commands: commands_rx,
            shutdown,
        };
        (engine, EngineHandle { commands: commands_tx })
    }

    /// Recover from disk, catch peers up, then serve commands until the
    /// shutdown signal fires or every handle is gone. The command in hand is
    /// always finished before the loop exits.
    pub async fn run(mut self) {
        if let Err(err) = self.recover() {
            tracing::error!("{}: recovery failed: {}", self.name, err);
        }
        self.rebroadcast_state();
        tracing::info!("Engine {} ready ({} features)", self.name, self.data.len());

        loop {
            let command = tokio::select! {
                _ = self.shutdown.changed() => break,
                command = self.commands.recv() => command,
            };

            match command {
                Some(command) => self.dispatch(command),
                None => break,
            }
        }

        tracing::info!("Engine {} stopped", self.name);
    }

    fn dispatch(&mut self, command: EngineCommand) {
        // A dropped reply receiver just means the caller gave up waiting.
        match command {
            EngineCommand::GetAll { reply } => {
                let _ = reply.send(self.get_all());
            }
            EngineCommand::GetRect { rect, reply } => {
                let _ = reply.send(self.get_rect(rect));
            }
            EngineCommand::Exists { id, reply } => {
                let _ = reply.send(self.data.contains_key(&id));
            }
            EngineCommand::ApplyLocal { action, payload, reply } => {
                let _ = reply.send(self.apply_local(action, payload));
            }
            EngineCommand::ApplyForeign { tx, reply } => {
                let _ = reply.send(self.apply(tx, ApplyMode::Durable));
            }
            EngineCommand::Snapshot { reply } => {
                let _ = reply.send(self.make_snapshot());
            }
        }
    }

    fn get_all(&self) -> HashMap<String, FeaturePayload> {
        self.data
            .iter()
            .map(|(id, record)| (id.clone(), record.payload.clone()))
            .collect()
    }

    fn get_rect(&self, rect: Rect<f64>) -> HashMap<String, FeaturePayload> {
        let ids = self.index.search(rect);
        let mut result = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.data.get(&id) {
                result.insert(id, record.payload.clone());
            }
        }
        result
    }

    fn apply_local(
        &mut self,
        action: Action,
        payload: FeaturePayload,
    ) -> Result<(), EngineError> {
        let lsn = self.vclock.get(&self.name).copied().unwrap_or(0) + 1;
        let tx = Transaction {
            action,
            origin: self.name.clone(),
            lsn,
            payload,
        };
        self.apply(tx, ApplyMode::Durable)
    }

    /// The apply path. Dominance check first, then the WAL append as the
    /// commit point, then map, index and vector clock move together, then
    /// fan-out. A dominated transaction is acknowledged without any of it.
    fn apply(&mut self, tx: Transaction, mode: ApplyMode) -> Result<(), EngineError> {
        let seen = self.vclock.get(&tx.origin).copied().unwrap_or(0);
        if tx.lsn <= seen {
            return Ok(());
        }

        if mode == ApplyMode::Durable {
            self.wal.append(&tx)?;
        }

        self.vclock.insert(tx.origin.clone(), tx.lsn);

        let id = tx.payload.id().to_string();
        match tx.action {
            Action::Upsert => {
                if let Some(previous) = self.data.get(&id) {
                    self.index.remove(previous.payload.bounding_rect(), &id);
                }
                self.index.insert(tx.payload.bounding_rect(), id.clone());
                self.data.insert(
                    id,
                    FeatureRecord {
                        origin: tx.origin.clone(),
                        lsn: tx.lsn,
                        payload: tx.payload.clone(),
                    },
                );
            }
            Action::Delete => {
                // The stored rectangle is the one that was indexed, so a
                // delete carrying a divergent payload still finds the entry.
                if let Some(previous) = self.data.remove(&id) {
                    self.index.remove(previous.payload.bounding_rect(), &id);
                }
            }
        }

        if mode == ApplyMode::Durable {
            // Sink failures evict the peer inside the registry; the mutation
            // has already committed and the caller is not told.
            self.sinks.broadcast(&tx);
        }

        Ok(())
    }

    /// Bring in-memory state back from disk: snapshot first, then the WAL
    /// tail through the same dominance path, without re-appending or
    /// broadcasting.
    fn recover(&mut self) -> Result<(), EngineError> {
        if let Some(data) = self.snapshot.load()? {
            self.index = SpatialIndex::bulk_load(
                data.iter()
                    .map(|(id, record)| (record.payload.bounding_rect(), id.clone()))
                    .collect(),
            );
            for record in data.values() {
                let seen = self.vclock.entry(record.origin.clone()).or_insert(0);
                if record.lsn > *seen {
                    *seen = record.lsn;
                }
            }
            tracing::info!("{}: loaded {} feature(s) from snapshot", self.name, data.len());
            self.data = data;
        }

        let wal = self.wal.load()?;
        if !wal.is_empty() {
            tracing::info!("{}: replaying {} WAL transaction(s)", self.name, wal.len());
        }
        for tx in wal {
            self.apply(tx, ApplyMode::Replay)?;
        }

        Ok(())
    }

    /// Offer the whole state to the registry as Upserts in ascending LSN
    /// order. The authority filter narrows this to records this node
    /// originated, which catches reconnected peers up after a restart.
    fn rebroadcast_state(&self) {
        let mut records: Vec<&FeatureRecord> = self.data.values().collect();
        records.sort_by_key(|record| record.lsn);

        for record in records {
            let tx = Transaction {
                action: Action::Upsert,
                origin: record.origin.clone(),
                lsn: record.lsn,
                payload: record.payload.clone(),
            };
            self.sinks.broadcast(&tx);
        }
    }

    /// Write the snapshot, then truncate the WAL. On failure the WAL still
    /// holds everything needed, so the engine stays live.
    fn make_snapshot(&self) -> Result<(), EngineError> {
        self.snapshot.save(&self.data)?;
        self.wal.truncate()?;
        Ok(())
    }
}

impl EngineHandle {
    pub async fn get_all(&self) -> Result<HashMap<String, FeaturePayload>, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::GetAll { reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }

    pub async fn get_rect(
        &self,
        rect: Rect<f64>,
    ) -> Result<HashMap<String, FeaturePayload>, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::GetRect { rect, reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }

    pub async fn exists(&self, id: impl Into<String>) -> Result<bool, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Exists { id: id.into(), reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }

    /// Apply a mutation originated on this node. The engine assigns the LSN.
    pub async fn apply_local(
        &self,
        action: Action,
        payload: FeaturePayload,
    ) -> Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::ApplyLocal { action, payload, reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)?
    }

    /// Apply a transaction received from a peer, keeping its origin stamp.
    pub async fn apply_foreign(&self, tx: Transaction) -> Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::ApplyForeign { tx, reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)?
    }

    pub async fn snapshot(&self) -> Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Snapshot { reply })
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)?
    }
}
