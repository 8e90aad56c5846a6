//! Customer-service contact settings (WhatsApp/Telegram links).

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::require_admin;
use crate::auth::AuthState;
use crate::datastore::types::CustomerServiceSettings;
use crate::datastore::Datastore;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub whatsapp_link: String,
    #[serde(default)]
    pub telegram_link: String,
}

/// Contact links for the public footer. Missing settings read as empty links.
#[utoipa::path(
    get,
    path = "/v1/settings/customer-service",
    responses(
        (status = 200, description = "Contact links", body = CustomerServiceSettings)
    ),
    tag = "settings"
)]
pub async fn customer_service(store: Extension<Arc<Datastore>>) -> impl IntoResponse {
    match store.customer_service_settings().await {
        Ok(Some(settings)) => Json(settings).into_response(),
        Ok(None) => Json(CustomerServiceSettings {
            id: None,
            whatsapp_link: String::new(),
            telegram_link: String::new(),
        })
        .into_response(),
        Err(err) => {
            error!("Failed to load customer service settings: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load settings".to_string(),
            )
                .into_response()
        }
    }
}

/// Replace the contact links (admin only).
#[utoipa::path(
    put,
    path = "/v1/settings/customer-service",
    request_body = SettingsUpdate,
    responses(
        (status = 204, description = "Settings saved"),
        (status = 401, description = "Missing session", body = String),
        (status = 403, description = "Not an admin", body = String)
    ),
    tag = "settings"
)]
pub async fn update_customer_service(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<Datastore>>,
    payload: Option<Json<SettingsUpdate>>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&headers, &auth_state).await {
        return rejection.into_response();
    }
    let Some(Json(update)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };
    match store
        .upsert_customer_service(&update.whatsapp_link, &update.telegram_link)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!("Failed to save customer service settings: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save settings".to_string(),
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

    #[tokio::test]
    async fn update_requires_session() {
        let provider = crate::auth::provider::AuthClient::new(
            "https://backend.test",
            SecretString::from("anon".to_string()),
        )
        .expect("client");
        let auth_state = Extension(Arc::new(AuthState::new(
            AuthConfig::new("https://hirely.dev".to_string()),
            provider,
            None,
        )));
        let store = Extension(Arc::new(
            Datastore::new("https://backend.test", SecretString::from("key".to_string()))
                .expect("datastore"),
        ));

        let response = update_customer_service(HeaderMap::new(), auth_state, store, None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
