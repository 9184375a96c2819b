//! Read endpoints shared by every store-backed category.

use crate::errors::AppError;
use crate::models::{Category, Record};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/{segment} - Every record of the category in store order.
pub async fn list_records(state: AppState, category: Category) -> ApiResult<Vec<Record>> {
    let records = state.store.find(category.collection()).await?;
    tracing::debug!("Listed {} {:?} records", records.len(), category);
    success(records)
}

/// GET /api/{segment}/{id} - One record by its id.
pub async fn get_record(state: AppState, category: Category, id: String) -> ApiResult<Record> {
    match state.store.find_one(category.collection(), &id).await? {
        Some(record) => success(record),
        None => Err(AppError::NotFound(format!(
            "{} {} not found",
            category.singular(),
            id
        ))),
    }
}
