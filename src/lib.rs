//! Replicated Geospatial Store Library
//!
//! This library crate defines the core modules that make up a replica group
//! of in-memory geospatial feature stores. It serves as the foundation for
//! the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of seven loosely coupled subsystems:
//!
//! - **`feature`**: The value types — validated GeoJSON payloads, feature
//!   records stamped with `(origin, lsn)`, and the transactions that carry
//!   mutations through the WAL and the replication wire.
//! - **`index`**: The R-tree of feature bounding rectangles backing spatial
//!   range queries.
//! - **`storage`**: Crash recovery — the append-only WAL and the whole-state
//!   snapshot file.
//! - **`engine`**: The single-writer command loop owning the feature map,
//!   the index, and the vector clock; applies transactions at most once
//!   under dominance.
//! - **`replication`**: The peer sink registry and the ordered per-peer
//!   delivery tasks fanning accepted local transactions out to replicas.
//! - **`gateway`**: The HTTP surface — per-node endpoints plus the public
//!   dispatch router that redirects reads to any replica and writes to a
//!   leader.
//! - **`node`**: Per-replica orchestration tying an engine, its stores, its
//!   sinks and its routes together.

pub mod engine;
pub mod error;
pub mod feature;
pub mod gateway;
pub mod index;
pub mod node;
pub mod replication;
pub mod storage;
