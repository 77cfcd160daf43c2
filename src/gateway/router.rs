//! Public Dispatch Router
//!
//! The unprefixed entry points clients hit first. Reads can be served by any
//! replica and are redirected to a random one; writes only by a leader. The
//! public snapshot endpoint fans out to every node so the whole group
//! persists together.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Extension, RawQuery};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Redirect;
use axum::routing::{get, post};
use rand::Rng;

use super::protocol::{
    ENDPOINT_DELETE, ENDPOINT_INSERT, ENDPOINT_REPLACE, ENDPOINT_SELECT, ENDPOINT_SNAPSHOT,
};

/// Topology the dispatch layer routes by: every node can answer reads, only
/// leaders accept writes.
pub struct Dispatch {
    pub nodes: Vec<String>,
    pub leaders: Vec<String>,
}

impl Dispatch {
    fn any_node(&self) -> &str {
        &self.nodes[rand::thread_rng().gen_range(0..self.nodes.len())]
    }

    fn any_leader(&self) -> &str {
        &self.leaders[rand::thread_rng().gen_range(0..self.leaders.len())]
    }
}

pub fn dispatch_routes(dispatch: Arc<Dispatch>) -> Router {
    Router::new()
        .route(ENDPOINT_SELECT, get(dispatch_select))
        .route(ENDPOINT_INSERT, post(dispatch_insert))
        .route(ENDPOINT_REPLACE, post(dispatch_replace))
        .route(ENDPOINT_DELETE, post(dispatch_delete))
        .route(ENDPOINT_SNAPSHOT, get(dispatch_snapshot))
        .layer(Extension(dispatch))
}

/// Any replica can return the data; pick one and preserve the query.
async fn dispatch_select(
    Extension(dispatch): Extension<Arc<Dispatch>>,
    RawQuery(query): RawQuery,
) -> Redirect {
    let mut target = format!("/{}{}", dispatch.any_node(), ENDPOINT_SELECT);
    if let Some(query) = query {
        target.push('?');
        target.push_str(&query);
    }
    Redirect::temporary(&target)
}

// 307 keeps the method and body across the redirect hop.

async fn dispatch_insert(Extension(dispatch): Extension<Arc<Dispatch>>) -> Redirect {
    Redirect::temporary(&format!("/{}{}", dispatch.any_leader(), ENDPOINT_INSERT))
}

async fn dispatch_replace(Extension(dispatch): Extension<Arc<Dispatch>>) -> Redirect {
    Redirect::temporary(&format!("/{}{}", dispatch.any_leader(), ENDPOINT_REPLACE))
}

async fn dispatch_delete(Extension(dispatch): Extension<Arc<Dispatch>>) -> Redirect {
    Redirect::temporary(&format!("/{}{}", dispatch.any_leader(), ENDPOINT_DELETE))
}

/// Every node makes its own snapshot; a failed one is logged and the rest
/// still run.
async fn dispatch_snapshot(
    Extension(dispatch): Extension<Arc<Dispatch>>,
    headers: HeaderMap,
) -> StatusCode {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("127.0.0.1:8080");

    let client = reqwest::Client::new();
    for node in &dispatch.nodes {
        let url = format!("http://{}/{}{}", host, node, ENDPOINT_SNAPSHOT);
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::error!("Snapshot on {} answered {}", node, response.status());
            }
            Err(err) => {
                tracing::error!("Failed to trigger snapshot on {}: {}", node, err);
            }
        }
    }

    StatusCode::OK
}
