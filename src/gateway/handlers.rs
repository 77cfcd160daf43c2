//! Per-Node API Handlers
//!
//! HTTP endpoints that expose one engine to clients and peers. Handlers
//! translate requests into engine commands and map the error taxonomy onto
//! status codes: invalid payload → 400, missing feature → 404, storage
//! failure → 500, stopped engine → 503.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use rand::Rng;

use super::protocol::{ENDPOINT_SELECT, SelectParams, parse_rect_param};
use crate::error::EngineError;
use crate::feature::{Action, FeaturePayload, Transaction};
use crate::node::Node;

/// In-flight selects at which a node starts shedding reads to a peer.
pub const MAX_CONCURRENT_SELECTS: i32 = 3;

/// Read handler. Serves the whole map or a `rect` query from the local
/// engine, shedding to a random peer when too many selects are in flight.
pub async fn handle_select(
    Extension(node): Extension<Arc<Node>>,
    Query(params): Query<SelectParams>,
) -> Response {
    let in_flight = node.begin_select();
    let response = select_response(&node, in_flight, &params).await;
    node.end_select();
    response
}

async fn select_response(node: &Node, in_flight: i32, params: &SelectParams) -> Response {
    if in_flight >= MAX_CONCURRENT_SELECTS && !node.peers.is_empty() {
        let ttl = params.ttl.unwrap_or(MAX_CONCURRENT_SELECTS);
        if ttl <= 0 {
            return (StatusCode::TOO_MANY_REQUESTS, "redirect ttl exhausted").into_response();
        }

        let peer = &node.peers[rand::thread_rng().gen_range(0..node.peers.len())];
        let mut target = format!("/{}{}?ttl={}", peer, ENDPOINT_SELECT, ttl - 1);
        if let Some(rect) = &params.rect {
            target.push_str("&rect=");
            target.push_str(rect);
        }
        return Redirect::temporary(&target).into_response();
    }

    let features = match &params.rect {
        None => node.engine.get_all().await,
        Some(raw) => match parse_rect_param(raw) {
            Ok(rect) => node.engine.get_rect(rect).await,
            Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
        },
    };

    match features {
        Ok(features) => {
            let collection = geojson::FeatureCollection {
                bbox: None,
                features: features.into_values().map(FeaturePayload::into_geojson).collect(),
                foreign_members: None,
            };
            Json(collection).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn handle_insert(
    Extension(node): Extension<Arc<Node>>,
    Json(feature): Json<geojson::Feature>,
) -> Response {
    upsert(&node, feature, false).await
}

/// Like insert, but the feature must already exist.
pub async fn handle_replace(
    Extension(node): Extension<Arc<Node>>,
    Json(feature): Json<geojson::Feature>,
) -> Response {
    upsert(&node, feature, true).await
}

async fn upsert(node: &Node, feature: geojson::Feature, must_exist: bool) -> Response {
    if !node.leader {
        tracing::warn!("{} is not a leader, rejecting write", node.name);
        return (StatusCode::FORBIDDEN, "node is not a leader").into_response();
    }

    let payload = match FeaturePayload::try_from(feature) {
        Ok(payload) => payload,
        Err(message) => return error_response(EngineError::InvalidPayload(message)),
    };

    if must_exist {
        match node.engine.exists(payload.id()).await {
            Ok(true) => {}
            Ok(false) => {
                return (StatusCode::NOT_FOUND, "feature does not exist").into_response();
            }
            Err(err) => return error_response(err),
        }
    }

    match node.engine.apply_local(Action::Upsert, payload).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn handle_delete(
    Extension(node): Extension<Arc<Node>>,
    Json(feature): Json<geojson::Feature>,
) -> Response {
    if !node.leader {
        tracing::warn!("{} is not a leader, rejecting delete", node.name);
        return (StatusCode::FORBIDDEN, "node is not a leader").into_response();
    }

    let payload = match FeaturePayload::try_from(feature) {
        Ok(payload) => payload,
        Err(message) => return error_response(EngineError::InvalidPayload(message)),
    };

    match node.engine.exists(payload.id()).await {
        Ok(true) => {}
        Ok(false) => return (StatusCode::NOT_FOUND, "feature does not exist").into_response(),
        Err(err) => return error_response(err),
    }

    match node.engine.apply_local(Action::Delete, payload).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

pub async fn handle_snapshot(Extension(node): Extension<Arc<Node>>) -> Response {
    match node.engine.snapshot().await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            tracing::error!("{}: snapshot failed: {}", node.name, err);
            error_response(err)
        }
    }
}

/// Peer ingest. The transaction keeps the origin stamp it arrived with and
/// is applied iff dominant; the engine never re-broadcasts it.
pub async fn handle_replication(
    Extension(node): Extension<Arc<Node>>,
    Json(tx): Json<Transaction>,
) -> Response {
    match node.engine.apply_foreign(tx).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => {
            tracing::error!("{}: failed to apply replicated transaction: {}", node.name, err);
            error_response(err)
        }
    }
}

fn error_response(err: EngineError) -> Response {
    match err {
        EngineError::InvalidPayload(message) => {
            (StatusCode::BAD_REQUEST, message).into_response()
        }
        EngineError::Storage(err) => {
            tracing::error!("Storage failure: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
        }
        EngineError::Stopped => {
            (StatusCode::SERVICE_UNAVAILABLE, "engine stopped").into_response()
        }
    }
}
