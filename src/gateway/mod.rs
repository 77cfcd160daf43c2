//! HTTP Gateway Module
//!
//! The request surface in front of the engines.
//!
//! ## Core Concepts
//! - **Per-node endpoints**: every node exposes `select`, `insert`,
//!   `replace`, `delete`, `snapshot` and the internal `replication` ingest
//!   under its own name prefix. Handlers translate HTTP into engine
//!   commands and engine errors back into status codes.
//! - **Dispatch router**: the public, unprefixed endpoints redirect reads to
//!   a random replica, writes to a random leader, and fan a snapshot
//!   request out to every node.
//! - **Load shedding**: a node tracking too many in-flight selects
//!   redirects further reads to a random peer with a decrementing `ttl`.

pub mod handlers;
pub mod protocol;
pub mod router;

#[cfg(test)]
mod tests;
