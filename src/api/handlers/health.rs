use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::api::GIT_COMMIT_HASH;
use crate::auth::AuthState;
use crate::datastore::Datastore;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    auth_provider: String,
    datastore: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Auth provider and datastore are reachable", body = [Health]),
        (status = 503, description = "Auth provider or datastore is unreachable", body = [Health])
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(
    method: Method,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
) -> impl IntoResponse {
    let auth_ok = auth_state.provider().ping().await;
    let store_ok = store.ping().await;
    let is_healthy = auth_ok && store_ok;

    let status_str = |ok: bool| if ok { "ok" } else { "error" };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        auth_provider: status_str(auth_ok).to_string(),
        datastore: status_str(store_ok).to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            error!("Failed to parse X-App header: {}", err);
        });

    let headers = headers.unwrap_or_else(|()| HeaderMap::new());

    if auth_ok {
        debug!("Auth provider is healthy");
    } else {
        debug!("Auth provider is unhealthy");
    }
    if store_ok {
        debug!("Datastore is healthy");
    } else {
        debug!("Datastore is unhealthy");
    }

    if is_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}
