//! Gateway Wire Protocol
//!
//! Endpoint names shared by the per-node routers and the public dispatch
//! router, plus parsing for the select query parameters.

use geo_types::{Coord, Rect};
use serde::Deserialize;

/// Read endpoint; any replica can serve it.
pub const ENDPOINT_SELECT: &str = "/select";
/// Write endpoints; only a leader accepts them.
pub const ENDPOINT_INSERT: &str = "/insert";
pub const ENDPOINT_REPLACE: &str = "/replace";
pub const ENDPOINT_DELETE: &str = "/delete";
/// Persists the node's state and truncates its WAL.
pub const ENDPOINT_SNAPSHOT: &str = "/snapshot";
/// Internal ingest route peers post replicated transactions to.
pub const ENDPOINT_REPLICATION: &str = "/replication";

/// Query parameters accepted by the select endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SelectParams {
    /// Optional `minX,minY,maxX,maxY` query rectangle; absent means all.
    pub rect: Option<String>,
    /// Remaining redirect hops when a loaded node sheds the read.
    pub ttl: Option<i32>,
}

/// Parse a `minX,minY,maxX,maxY` parameter into a query rectangle.
pub fn parse_rect_param(raw: &str) -> Result<Rect<f64>, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 4 {
        return Err("rect parameter must contain exactly 4 values".to_string());
    }

    let mut values = [0f64; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|err| format!("invalid rect coordinate {:?}: {}", part, err))?;
    }

    Ok(Rect::new(
        Coord { x: values[0], y: values[1] },
        Coord { x: values[2], y: values[3] },
    ))
}
