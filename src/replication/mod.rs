//! Replication Module
//!
//! Outbound fan-out of accepted transactions to peer replicas.
//!
//! ## Core Concepts
//! - **Peer sink**: an outbound, order-preserving message channel to one
//!   peer. The engine only ever writes to it.
//! - **Registry**: thread-safe name → sink map shared between the engine
//!   (broadcast) and the transport (add/remove). A failing sink is evicted
//!   after the broadcast iteration, never during it.
//! - **Broadcast authority**: a node propagates only transactions stamped
//!   with its own origin. Transactions learned from peers are applied
//!   locally but never re-broadcast, which keeps the peer graph cycle-free.
//! - **Transport**: one sender task per peer drains a queue into HTTP POSTs
//!   against the peer's replication ingest route, with bounded
//!   retry/backoff. The engine never sees the URL scheme.

pub mod registry;
pub mod transport;


pub use registry::{PeerRegistry, PeerSink};
pub use transport::open_peer_sinks;
