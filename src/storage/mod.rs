//! Durable Storage Module
//!
//! Crash recovery for the engine's in-memory state, split across two files
//! per node:
//!
//! - **WAL**: an append-only log of transactions, written before each
//!   mutation takes effect. Replayed through the engine's dominance path on
//!   startup; truncated only after a successful snapshot.
//! - **Snapshot**: a whole-state dump of the feature map including each
//!   record's `(origin, lsn)` metadata. Loading one replaces replaying the
//!   log from the beginning of time.
//!
//! Both stores open their file per operation and tolerate a missing file.

pub mod snapshot;
pub mod wal;

#[cfg(test)]
mod tests;

pub use snapshot::SnapshotStore;
pub use wal::WalStore;
