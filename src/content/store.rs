//! Binding that reads straight from the content store.

use std::sync::Arc;

use async_trait::async_trait;

use super::ContentRepository;
use crate::db::ContentStore;
use crate::errors::AppError;
use crate::models::{Category, Record};

pub struct StoreRepository {
    store: Arc<ContentStore>,
    category: Category,
}

impl StoreRepository {
    pub fn new(store: Arc<ContentStore>, category: Category) -> Self {
        Self { store, category }
    }
}

#[async_trait]
impl ContentRepository for StoreRepository {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        self.store.find(self.category.collection()).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, AppError> {
        self.store.find_one(self.category.collection(), id).await
    }
}
