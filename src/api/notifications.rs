//! Notification creation endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{Category, Record};
use crate::AppState;

/// Lowercase ASCII slug of `text`: alphanumerics kept, every other run becomes one `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Give a record without an id one derived from its title, or a random one.
fn assign_id(record: &mut Record) {
    if !record.id.trim().is_empty() {
        record.id = record.id.trim().to_string();
        return;
    }
    let slug = slugify(record.display_title());
    record.id = if slug.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        slug
    };
}

/// POST /api/notifications - Store a notification as sent.
pub async fn create_notification(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Record>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if !body.is_object() {
        return Err(AppError::Validation(
            "Notification must be a JSON object".to_string(),
        ));
    }

    let mut record: Record = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid notification: {}", e)))?;
    assign_id(&mut record);

    let created = state
        .store
        .create(Category::Notifications.collection(), &record)
        .await?;
    tracing::info!("Created notification {}", created.id);

    Ok(ApiResponse::created(created, "Notification created"))
}
