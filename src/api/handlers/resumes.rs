//! Resume submission and the admin review queue.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{authenticate, require_admin, valid_email};
use crate::auth::AuthState;
use crate::datastore::types::{NewResume, Resume, ResumeStatus};
use crate::datastore::Datastore;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResumeSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StatusUpdate {
    pub status: ResumeStatus,
}

/// Submit a resume for the signed-in user. Country, position, and the
/// introduction are folded into the cover letter, as the form always did.
#[utoipa::path(
    post,
    path = "/v1/resumes",
    request_body = ResumeSubmission,
    responses(
        (status = 201, description = "Resume submitted"),
        (status = 400, description = "Invalid submission", body = String),
        (status = 401, description = "Missing session", body = String)
    ),
    tag = "resumes"
)]
pub async fn submit_resume(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    payload: Option<Json<ResumeSubmission>>,
) -> impl IntoResponse {
    let user = match authenticate(&headers, &auth_state).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };
    let Some(Json(submission)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    if submission.name.trim().is_empty() || !valid_email(&submission.email) {
        return (StatusCode::BAD_REQUEST, "Invalid name or email".to_string()).into_response();
    }

    let cover_letter = format!(
        "国家/地区: {}\n申请职位: {}\n个人介绍: {}",
        submission.country, submission.position, submission.introduction
    );
    let resume = NewResume {
        full_name: submission.name,
        email: submission.email,
        phone: submission.phone,
        education: submission.education,
        experience: submission.experience,
        skills: submission.skills,
        cover_letter,
        user_id: user.id,
        status: ResumeStatus::Pending,
    };

    match store.insert_resume(&resume).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => {
            error!("Failed to submit resume: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to submit resume".to_string(),
            )
                .into_response()
        }
    }
}

/// The signed-in user's resume, if any.
#[utoipa::path(
    get,
    path = "/v1/resumes/me",
    responses(
        (status = 200, description = "Resume", body = Resume),
        (status = 204, description = "No resume on file"),
        (status = 401, description = "Missing session", body = String)
    ),
    tag = "resumes"
)]
pub async fn my_resume(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
) -> impl IntoResponse {
    let user = match authenticate(&headers, &auth_state).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };
    match store.resume_for_user(&user.id).await {
        Ok(Some(resume)) => Json(resume).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to load resume: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load resume".to_string(),
            )
                .into_response()
        }
    }
}

/// Admin review queue, newest first.
#[utoipa::path(
    get,
    path = "/v1/resumes",
    responses(
        (status = 200, description = "All resumes", body = [Resume]),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "resumes"
)]
pub async fn list_resumes(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    match store.resumes().await {
        Ok(resumes) => Json(resumes).into_response(),
        Err(err) => {
            error!("Failed to list resumes: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load resumes".to_string(),
            )
                .into_response()
        }
    }
}

/// Approve or reject a submission.
#[utoipa::path(
    patch,
    path = "/v1/resumes/{id}/status",
    params(("id" = i64, Path, description = "Resume id")),
    request_body = StatusUpdate,
    responses(
        (status = 204, description = "Status updated"),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "resumes"
)]
pub async fn update_resume_status(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    id: Path<i64>,
    payload: Option<Json<StatusUpdate>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    let Some(Json(update)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    match store.update_resume_status(*id, update.status).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to update resume {}: {err}", *id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update resume".to_string(),
            )
                .into_response()
        }
    }
}
