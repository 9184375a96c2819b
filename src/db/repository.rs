//! Content store repository for document reads and inserts.
//!
//! The connection is opened on first use and reused for the life of the process.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;

use super::init_database;
use crate::errors::AppError;
use crate::models::{Category, Record};

/// Document store holding one collection per category.
pub struct ContentStore {
    db_path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl ContentStore {
    /// Create a store that connects lazily on first use.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            pool: OnceCell::new(),
        }
    }

    /// Get the shared pool, opening it and running migrations exactly once.
    ///
    /// A failed attempt is not cached; the next caller tries again.
    pub async fn connection(&self) -> Result<&SqlitePool, AppError> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!("Opening content store at {:?}", self.db_path);
                init_database(&self.db_path).await.map_err(AppError::from)
            })
            .await
    }

    /// All documents of a collection in insertion order.
    pub async fn find(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        let pool = self.connection().await?;
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = ? ORDER BY seq")
            .bind(collection)
            .fetch_all(pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let body: String = row.get("body");
            match serde_json::from_str::<Record>(&body) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable document {}/{}: {}", collection, id, e),
            }
        }

        Ok(records)
    }

    /// The document with the given id, if any.
    pub async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError> {
        let pool = self.connection().await?;
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let body: String = row.get("body");
        match serde_json::from_str::<Record>(&body) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("Skipping unreadable document {}/{}: {}", collection, id, e);
                Ok(None)
            }
        }
    }

    /// Insert a document; the id must be unique within the collection.
    pub async fn create(&self, collection: &str, record: &Record) -> Result<Record, AppError> {
        let pool = self.connection().await?;
        let body = serde_json::to_string(record)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO documents (collection, id, body, inserted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&record.id)
        .bind(&body)
        .bind(&now)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(record.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict(format!(
                    "Record {} already exists in {}",
                    record.id, collection
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert every record of `{collection}.json` files in `dir`, skipping ids already present.
    ///
    /// Returns the number of documents inserted.
    pub async fn seed_from_dir(&self, dir: &Path) -> Result<usize, AppError> {
        let pool = self.connection().await?;
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut inserted = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(category) = Category::from_collection(stem) else {
                tracing::warn!("Ignoring seed file for unknown collection: {:?}", path);
                continue;
            };

            let bytes = tokio::fs::read(&path).await?;
            let records: Vec<Record> = match serde_json::from_slice(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("Ignoring seed file {:?}: {}", path, e);
                    continue;
                }
            };

            let now = Utc::now().to_rfc3339();
            for record in &records {
                if record.id.trim().is_empty() {
                    tracing::warn!("Skipping seed record without id in {:?}", path);
                    continue;
                }
                let result = sqlx::query(
                    "INSERT OR IGNORE INTO documents (collection, id, body, inserted_at) VALUES (?, ?, ?, ?)",
                )
                .bind(category.collection())
                .bind(&record.id)
                .bind(serde_json::to_string(record)?)
                .bind(&now)
                .execute(pool)
                .await?;
                inserted += result.rows_affected() as usize;
            }

            tracing::info!(
                "Seeded {} from {:?} ({} records in file)",
                category.collection(),
                path,
                records.len()
            );
        }

        Ok(inserted)
    }
}
