//! Public job listings and the admin CRUD behind them.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::require_admin;
use crate::auth::AuthState;
use crate::datastore::types::{Job, NewJob};
use crate::datastore::Datastore;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobsQuery {
    /// Keyword matched against title, description, and tags.
    #[serde(default)]
    pub search: Option<String>,
}

/// Newest-first job listing with optional keyword search.
#[utoipa::path(
    get,
    path = "/v1/jobs",
    params(JobsQuery),
    responses(
        (status = 200, description = "Job listing", body = [Job])
    ),
    tag = "jobs"
)]
pub async fn list_jobs(
    store: Extension<Arc<Datastore>>,
    query: Query<JobsQuery>,
) -> impl IntoResponse {
    match store.list_jobs(query.search.as_deref()).await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(err) => {
            error!("Failed to list jobs: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load jobs".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job details", body = Job),
        (status = 404, description = "No such job", body = String)
    ),
    tag = "jobs"
)]
pub async fn get_job(store: Extension<Arc<Datastore>>, id: Path<Uuid>) -> impl IntoResponse {
    match store.job(*id).await {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "No such job".to_string()).into_response(),
        Err(err) => {
            error!("Failed to load job {}: {err}", *id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load job".to_string(),
            )
                .into_response()
        }
    }
}

/// Jobs for one location page.
#[utoipa::path(
    get,
    path = "/v1/jobs/location/{location}",
    params(("location" = String, Path, description = "Location name")),
    responses(
        (status = 200, description = "Jobs in the location", body = [Job])
    ),
    tag = "jobs"
)]
pub async fn jobs_by_location(
    store: Extension<Arc<Datastore>>,
    location: Path<String>,
) -> impl IntoResponse {
    match store.jobs_by_location(&location).await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(err) => {
            error!("Failed to load jobs for {}: {err}", *location);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load jobs".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/jobs",
    request_body = NewJob,
    responses(
        (status = 201, description = "Job created", body = Job),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "jobs"
)]
pub async fn create_job(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    payload: Option<Json<NewJob>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    let Some(Json(job)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    match store.create_job(&job).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => {
            error!("Failed to create job: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create job".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = NewJob,
    responses(
        (status = 204, description = "Job updated"),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "jobs"
)]
pub async fn update_job(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    id: Path<Uuid>,
    payload: Option<Json<NewJob>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    let Some(Json(job)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    match store.update_job(*id, &job).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to update job {}: {err}", *id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update job".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "jobs"
)]
pub async fn delete_job(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    id: Path<Uuid>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    match store.delete_job(*id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to delete job {}: {err}", *id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete job".to_string(),
            )
                .into_response()
        }
    }
}

/// Vacancy counts per location for the home page cards.
#[utoipa::path(
    get,
    path = "/v1/locations",
    responses(
        (status = 200, description = "Vacancy counts", body = [crate::datastore::types::LocationInfo])
    ),
    tag = "jobs"
)]
pub async fn location_infos(store: Extension<Arc<Datastore>>) -> impl IntoResponse {
    match store.location_infos().await {
        Ok(infos) => Json(infos).into_response(),
        Err(err) => {
            error!("Failed to load location infos: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load locations".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use secrecy::SecretString;

    fn store() -> Extension<Arc<Datastore>> {
        Extension(Arc::new(
            Datastore::new("https://backend.test", SecretString::from("key".to_string()))
                .expect("datastore"),
        ))
    }

    fn auth_state() -> Extension<Arc<AuthState>> {
        let provider = crate::auth::provider::AuthClient::new(
            "https://backend.test",
            SecretString::from("anon".to_string()),
        )
        .expect("client");
        Extension(Arc::new(AuthState::new(
            AuthConfig::new("https://hirely.dev".to_string()),
            provider,
            None,
        )))
    }

    #[tokio::test]
    async fn create_job_requires_bearer_token() {
        let response = create_job(HeaderMap::new(), auth_state(), store(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn delete_job_requires_bearer_token() {
        let response = delete_job(
            HeaderMap::new(),
            auth_state(),
            store(),
            Path(Uuid::nil()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
