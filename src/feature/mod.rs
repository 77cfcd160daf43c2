//! Feature Model Module
//!
//! Value types shared by the engine, the stores and the replication wire.
//!
//! ## Core Concepts
//! - **Payload**: a GeoJSON feature validated at parse time — a string `id` and
//!   a geometry with a computable 2-D bounding rectangle are mandatory.
//! - **Record**: a payload plus the `(origin, lsn)` pair stamped by the node
//!   that first accepted it; this is what the vector clock tracks.
//! - **Transaction**: a tagged Upsert/Delete carrying a record's fields; one
//!   per WAL line and one per replication message, round-tripping
//!   byte-for-byte so the WAL stays replayable across restarts.

pub mod types;


pub use types::{Action, FeaturePayload, FeatureRecord, Transaction};
