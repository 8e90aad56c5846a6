//! Home-page gallery items.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::error;

use crate::datastore::types::CarouselItem;
use crate::datastore::Datastore;

#[utoipa::path(
    get,
    path = "/v1/carousel",
    responses(
        (status = 200, description = "Gallery items in display order", body = [CarouselItem])
    ),
    tag = "settings"
)]
pub async fn carousel_items(store: Extension<Arc<Datastore>>) -> impl IntoResponse {
    match store.carousel_items().await {
        Ok(items) => Json(items).into_response(),
        Err(err) => {
            error!("Failed to load carousel items: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load carousel".to_string(),
            )
                .into_response()
        }
    }
}
