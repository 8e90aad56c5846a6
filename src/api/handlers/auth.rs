//! Auth endpoints: registration, login, code verification, resends, OAuth,
//! and session introspection. The flow logic lives in [`crate::auth::flow`];
//! these handlers translate HTTP into flow calls and outcomes into responses.

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use super::{authenticate, extract_bearer_token, request_lang};
use crate::auth::flow::{
    self, FlowStep, LoginOutcome, RegisterOutcome, ResendOutcome, VerifyOutcome,
};
use crate::auth::provider::AuthApi;
use crate::auth::session::SessionEvent;
use crate::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Router-state return target, if the frontend carried one.
    #[serde(default)]
    pub return_to: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
    pub password: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReturnToQuery {
    /// Query-string return target.
    #[serde(rename = "returnTo", default)]
    pub return_to: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthMessage {
    pub message: String,
    /// Set when the failure can be fixed by resending the confirmation email.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub resend_available: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    /// Always `code`: the client moves to the verification step.
    pub step: String,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    /// Destination to navigate to, replacing history.
    pub redirect_to: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub message: String,
    pub redirect_to: String,
    /// How long the success message stays visible before navigating.
    pub pause_ms: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CooldownResponse {
    pub seconds_remaining: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OauthResponse {
    /// Provider authorize URL; navigating there causes a full-page redirect.
    pub url: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerificationStatus {
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
}

/// Start a registration: send the verification email and enter the code step.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Verification step started", body = RegisterResponse),
        (status = 400, description = "Missing fields or provider rejection", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    let lang = request_lang(&headers);
    let password = SecretString::from(request.password);
    let signup_redirect = auth_state.config().signup_redirect();

    let outcome = flow::submit_register(
        auth_state.provider(),
        auth_state.codes(),
        auth_state.sessions(),
        Some(signup_redirect.as_str()),
        &request.email,
        &password,
        lang,
    )
    .await;

    match outcome {
        RegisterOutcome::VerificationStarted { message } => Json(RegisterResponse {
            step: "code".to_string(),
            message,
        })
        .into_response(),
        RegisterOutcome::Rejected { message } => {
            (StatusCode::BAD_REQUEST, message).into_response()
        }
    }
}

/// Password login. The response carries the resolved destination; privileged
/// accounts always land on the admin dashboard.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    params(ReturnToQuery),
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Rejected credentials", body = String),
        (status = 403, description = "Email not confirmed", body = AuthMessage)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    query: Query<ReturnToQuery>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    let lang = request_lang(&headers);
    let password = SecretString::from(request.password);

    let outcome = flow::submit_login(
        auth_state.provider(),
        auth_state.config().policy(),
        &request.email,
        &password,
        query.return_to.as_deref(),
        request.return_to.as_deref(),
        lang,
    )
    .await;

    match outcome {
        LoginOutcome::SignedIn { user, destination } => {
            auth_state.hub().publish(SessionEvent::SignedIn {
                user_id: user.user.id.clone(),
                email: user.user.email.clone(),
            });
            Json(LoginResponse {
                user_id: user.user.id,
                email: user.user.email,
                access_token: user.access_token.expose_secret().to_string(),
                redirect_to: destination,
            })
            .into_response()
        }
        LoginOutcome::EmailNotConfirmed { message } => (
            StatusCode::FORBIDDEN,
            Json(AuthMessage {
                message,
                resend_available: true,
            }),
        )
            .into_response(),
        LoginOutcome::Rejected { message } => {
            (StatusCode::UNAUTHORIZED, message).into_response()
        }
    }
}

/// Verify the emailed 6-digit code and finish the registration.
#[utoipa::path(
    post,
    path = "/v1/auth/verify-code",
    request_body = VerifyCodeRequest,
    params(ReturnToQuery),
    responses(
        (status = 200, description = "Verified", body = VerifyResponse),
        (status = 400, description = "Code rejected", body = String),
        (status = 404, description = "No pending verification", body = String),
        (status = 409, description = "Another attempt is in flight", body = String),
        (status = 422, description = "Incomplete code", body = String),
        (status = 503, description = "Verification functions not configured", body = String)
    ),
    tag = "auth"
)]
pub async fn verify_code(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    query: Query<ReturnToQuery>,
    payload: Option<Json<VerifyCodeRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    let Some(codes) = auth_state.codes() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Code verification is not configured".to_string(),
        )
            .into_response();
    };
    let lang = request_lang(&headers);
    let password = SecretString::from(request.password);

    let outcome = flow::verify_code(
        codes,
        auth_state.sessions(),
        auth_state.config().policy(),
        &request.email,
        &request.code,
        &password,
        query.return_to.as_deref(),
        request.return_to.as_deref(),
        lang,
    )
    .await;

    match outcome {
        VerifyOutcome::Verified {
            message,
            destination,
            pause,
        } => Json(VerifyResponse {
            message,
            redirect_to: destination,
            pause_ms: u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
        })
        .into_response(),
        VerifyOutcome::RejectedLocally { message } => {
            (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
        }
        VerifyOutcome::NoSession { message } => {
            (StatusCode::NOT_FOUND, message).into_response()
        }
        VerifyOutcome::Busy { message } => (StatusCode::CONFLICT, message).into_response(),
        VerifyOutcome::Failed { message } => (StatusCode::BAD_REQUEST, message).into_response(),
    }
}

/// Re-send the verification code. Suppressed while the cooldown runs.
#[utoipa::path(
    post,
    path = "/v1/auth/resend-code",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Code sent", body = AuthMessage),
        (status = 404, description = "No pending verification", body = String),
        (status = 429, description = "Cooldown active", body = CooldownResponse),
        (status = 503, description = "Verification functions not configured", body = String)
    ),
    tag = "auth"
)]
pub async fn resend_code(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<EmailRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    let Some(codes) = auth_state.codes() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Code verification is not configured".to_string(),
        )
            .into_response();
    };
    let lang = request_lang(&headers);

    let outcome = flow::resend_code(codes, auth_state.sessions(), &request.email, lang).await;
    resend_response(outcome)
}

/// Re-send the provider's signup confirmation email (link mode).
#[utoipa::path(
    post,
    path = "/v1/auth/resend-confirmation",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Confirmation sent", body = AuthMessage),
        (status = 400, description = "Missing email or provider rejection", body = String)
    ),
    tag = "auth"
)]
pub async fn resend_confirmation(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<EmailRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    let lang = request_lang(&headers);

    let outcome =
        flow::resend_confirmation(auth_state.provider(), &request.email, lang).await;
    resend_response(outcome)
}

fn resend_response(outcome: ResendOutcome) -> axum::response::Response {
    match outcome {
        ResendOutcome::Sent { message } => Json(AuthMessage {
            message,
            resend_available: false,
        })
        .into_response(),
        ResendOutcome::CoolingDown { seconds_remaining } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(CooldownResponse { seconds_remaining }),
        )
            .into_response(),
        ResendOutcome::NoSession { message } => {
            (StatusCode::NOT_FOUND, message).into_response()
        }
        ResendOutcome::Busy { message } => (StatusCode::CONFLICT, message).into_response(),
        ResendOutcome::Failed { message } => (StatusCode::BAD_REQUEST, message).into_response(),
    }
}

/// Compose the Google OAuth authorize URL for the caller to navigate to.
#[utoipa::path(
    get,
    path = "/v1/auth/oauth/google",
    params(ReturnToQuery),
    responses(
        (status = 200, description = "Authorize URL", body = OauthResponse)
    ),
    tag = "auth"
)]
pub async fn oauth_google(
    auth_state: Extension<Arc<AuthState>>,
    query: Query<ReturnToQuery>,
) -> impl IntoResponse {
    let target = flow::oauth_redirect_target(
        auth_state.config().site_url(),
        query.return_to.as_deref(),
    );
    match auth_state.provider().authorize_url("google", &target) {
        Ok(url) => Json(OauthResponse { url }).into_response(),
        Err(err) => {
            error!("Failed to build authorize URL: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build authorize URL".to_string(),
            )
                .into_response()
        }
    }
}

/// Where a given email currently is in the verification flow.
#[utoipa::path(
    get,
    path = "/v1/auth/verification",
    params(EmailQuery),
    responses(
        (status = 200, description = "Flow step", body = VerificationStatus)
    ),
    tag = "auth"
)]
pub async fn verification_status(
    auth_state: Extension<Arc<AuthState>>,
    query: Query<EmailQuery>,
) -> impl IntoResponse {
    let status = match auth_state.sessions().step(&query.email) {
        FlowStep::Credentials => VerificationStatus {
            step: "credentials".to_string(),
            cooldown_seconds: None,
        },
        FlowStep::Verifying { cooldown_seconds } => VerificationStatus {
            step: "verifying".to_string(),
            cooldown_seconds: Some(cooldown_seconds),
        },
        FlowStep::Done => VerificationStatus {
            step: "done".to_string(),
            cooldown_seconds: None,
        },
    };
    Json(status)
}

/// Abandon the verification step; the session state is discarded.
#[utoipa::path(
    post,
    path = "/v1/auth/verification/cancel",
    request_body = EmailRequest,
    responses(
        (status = 204, description = "Session discarded")
    ),
    tag = "auth"
)]
pub async fn cancel_verification(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<EmailRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    auth_state.sessions().cancel(&request.email);
    StatusCode::NO_CONTENT.into_response()
}

/// Sign out of the provider session.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_bearer_token(&headers) {
        let secret = SecretString::from(token.clone());
        if let Ok(user) = auth_state.provider().get_user(&token).await {
            auth_state
                .hub()
                .publish(SessionEvent::SignedOut { user_id: user.id });
        }
        if let Err(err) = auth_state.provider().sign_out(&secret).await {
            error!("Sign-out failed: {err}");
        }
    }
    // Clearing an absent session is still a success.
    StatusCode::NO_CONTENT
}

/// Current session, resolved through the provider.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match authenticate(&headers, &auth_state).await {
        Ok(user) => Json(SessionResponse {
            user_id: user.id,
            email: user.email,
        })
        .into_response(),
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use axum::http::StatusCode;

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
    async fn register_missing_payload() {
        let response = register(HeaderMap::new(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_missing_payload() {
        let response = login(
            HeaderMap::new(),
            auth_state(),
            Query(ReturnToQuery::default()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_code_unconfigured_functions() {
        let response = verify_code(
            HeaderMap::new(),
            auth_state(),
            Query(ReturnToQuery::default()),
            Some(Json(VerifyCodeRequest {
                email: "a@b.com".to_string(),
                code: "123456".to_string(),
                password: "secret1".to_string(),
                return_to: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn resend_code_requires_payload() {
        let response = resend_code(HeaderMap::new(), auth_state(), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verification_status_defaults_to_credentials() {
        let state = auth_state();
        state.sessions().begin("pending@b.com");

        let response = verification_status(
            state.clone(),
            Query(EmailQuery {
                email: "fresh@b.com".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = verification_status(
            state,
            Query(EmailQuery {
                email: "pending@b.com".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cancel_verification_discards_session() {
        let state = auth_state();
        state.sessions().begin("a@b.com");

        let response = cancel_verification(
            state.clone(),
            Some(Json(EmailRequest {
                email: "a@b.com".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            state.sessions().step("a@b.com"),
            crate::auth::flow::FlowStep::Credentials
        );
    }

    #[tokio::test]
    async fn oauth_url_includes_return_target() {
        let response = oauth_google(
            auth_state(),
            Query(ReturnToQuery {
                return_to: Some("/submit-resume".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
