//! Binding that reads a bundled data file from the local static directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{parse_collection, ContentRepository};
use crate::errors::AppError;
use crate::models::{Category, Record};

pub struct FilesystemRepository {
    path: PathBuf,
}

impl FilesystemRepository {
    pub fn new(static_dir: &Path, category: Category) -> Self {
        Self {
            path: static_dir.join(category.static_file()),
        }
    }
}

#[async_trait]
impl ContentRepository for FilesystemRepository {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let bytes = tokio::fs::read(&self.path).await?;
        parse_collection(&bytes)
    }
}
