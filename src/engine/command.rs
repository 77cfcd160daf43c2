use std::collections::HashMap;

use geo_types::Rect;
use tokio::sync::oneshot;

use crate::error::EngineError;
use crate::feature::{Action, FeaturePayload, Transaction};

/// A queued engine command with its single-use reply channel.
///
/// Dropping the command (queue closed, engine stopped) drops the reply
/// sender, which the awaiting caller observes as [`EngineError::Stopped`].
pub enum EngineCommand {
    /// Snapshot of the whole map at dequeue time.
    GetAll {
        reply: oneshot::Sender<HashMap<String, FeaturePayload>>,
    },

    /// Features whose bounding rectangle intersects the query rectangle.
    GetRect {
        rect: Rect<f64>,
        reply: oneshot::Sender<HashMap<String, FeaturePayload>>,
    },

    Exists {
        id: String,
        reply: oneshot::Sender<bool>,
    },

    /// Mutation originated on this node; the loop stamps it with the next
    /// local LSN before applying.
    ApplyLocal {
        action: Action,
        payload: FeaturePayload,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },

    /// Mutation received from a peer, carrying the origin stamp assigned
    /// where it was first accepted. Applied iff dominant; never re-broadcast
    /// past the registry's authority filter.
    ApplyForeign {
        tx: Transaction,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },

    /// Write the snapshot file, then truncate the WAL.
    Snapshot {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
}
