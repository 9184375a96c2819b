//! Read model shared by every page.
//!
//! A `ContentRepository` lists a category's records and resolves one by id. Pages never
//! know which transport sits behind it; the binding is chosen per category by configuration.

mod files;
mod remote;
mod store;

pub use files::*;
pub use remote::*;
pub use store::*;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Binding, Config};
use crate::db::ContentStore;
use crate::errors::AppError;
use crate::models::{Category, Record};

/// Source of one category's records.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Every record in source-native order.
    async fn list(&self) -> Result<Vec<Record>, AppError>;

    /// The record whose `id` equals `id`, or `None`.
    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, AppError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }
}

/// Parse a bundled data file: it must be a JSON array of records.
///
/// Entries that are not readable records are skipped with a warning.
pub fn parse_collection(bytes: &[u8]) -> Result<Vec<Record>, AppError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let serde_json::Value::Array(items) = value else {
        return Err(AppError::MalformedResponse(
            "Expected a JSON array of records".to_string(),
        ));
    };
    Ok(records_from_values(items))
}

/// Convert JSON entries to records, skipping unreadable ones.
pub fn records_from_values(items: Vec<serde_json::Value>) -> Vec<Record> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Record>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable record at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// One repository per category, wired from configuration.
#[derive(Clone)]
pub struct Catalog {
    repositories: HashMap<Category, Arc<dyn ContentRepository>>,
}

impl Catalog {
    pub fn from_config(config: &Config, store: Arc<ContentStore>, client: reqwest::Client) -> Self {
        let mut repositories: HashMap<Category, Arc<dyn ContentRepository>> = HashMap::new();

        for category in Category::ALL {
            let mut binding = config.binding(category);
            if category.api_segment().is_none()
                && matches!(binding, Binding::Store | Binding::RemoteApi)
            {
                tracing::warn!(
                    "{:?} has no read API; using filesystem binding instead of {}",
                    category,
                    binding
                );
                binding = Binding::Filesystem;
            }

            let repo: Arc<dyn ContentRepository> = match binding {
                Binding::Store => Arc::new(StoreRepository::new(store.clone(), category)),
                Binding::RemoteApi => Arc::new(RemoteApiRepository::new(
                    client.clone(),
                    &config.base_url,
                    category,
                )),
                Binding::StaticAsset => Arc::new(StaticAssetRepository::new(
                    client.clone(),
                    &config.base_url,
                    category,
                )),
                Binding::Filesystem => {
                    Arc::new(FilesystemRepository::new(&config.static_dir, category))
                }
            };

            tracing::debug!("{:?} pages read through the {} binding", category, binding);
            repositories.insert(category, repo);
        }

        Self { repositories }
    }

    pub fn repository(&self, category: Category) -> Result<&Arc<dyn ContentRepository>, AppError> {
        self.repositories
            .get(&category)
            .ok_or_else(|| AppError::Internal(format!("No repository for {:?}", category)))
    }

    /// List a category; any failure is logged and reads as "no records".
    pub async fn list_or_empty(&self, category: Category) -> Vec<Record> {
        let result = match self.repository(category) {
            Ok(repo) => repo.list().await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!("Listing {:?} failed, showing no records: {}", category, e);
            Vec::new()
        })
    }

    /// Resolve one record; any failure is logged and reads as "not found".
    pub async fn find_or_none(&self, category: Category, id: &str) -> Option<Record> {
        let result = match self.repository(category) {
            Ok(repo) => repo.get_by_id(id).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!("Resolving {:?}/{} failed, treating as not found: {}", category, id, e);
            None
        })
    }
}
