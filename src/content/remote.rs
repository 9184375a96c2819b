//! Bindings that read over HTTP: the Read API, or a bundled data file served as a static asset.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::{parse_collection, records_from_values, ContentRepository};
use crate::errors::AppError;
use crate::models::{Category, Record};

/// Reads `GET {base}/api/{segment}` and `GET {base}/api/{segment}/{id}`.
pub struct RemoteApiRepository {
    client: Client,
    url: String,
}

impl RemoteApiRepository {
    pub fn new(client: Client, base_url: &str, category: Category) -> Self {
        let segment = category
            .api_segment()
            .unwrap_or_else(|| category.collection());
        Self {
            client,
            url: format!("{}/api/{}", base_url.trim_end_matches('/'), segment),
        }
    }

    fn item_url(&self, id: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| AppError::Config(format!("Invalid base URL {}: {}", self.url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Base URL {} cannot carry a path", self.url)))?
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl ContentRepository for RemoteApiRepository {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let body: Value = response.json().await?;
        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut envelope) => match envelope.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(AppError::MalformedResponse(format!(
                        "{} returned an envelope without a data array",
                        self.url
                    )))
                }
            },
            _ => {
                return Err(AppError::MalformedResponse(format!(
                    "{} returned neither an array nor an envelope",
                    self.url
                )))
            }
        };

        Ok(records_from_values(items))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, AppError> {
        let url = self.item_url(id)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!("{} returned {}", url, status)));
        }

        let body: Value = response.json().await?;
        let Value::Object(mut envelope) = body else {
            return Err(AppError::MalformedResponse(format!(
                "{} returned a non-object record",
                url
            )));
        };

        if envelope.contains_key("data") {
            match envelope.remove("data") {
                Some(Value::Null) | None => Ok(None),
                Some(data) => Ok(Some(serde_json::from_value(data)?)),
            }
        } else {
            Ok(Some(serde_json::from_value(Value::Object(envelope))?))
        }
    }
}

/// Reads `GET {base}/{file}` and scans it in memory.
pub struct StaticAssetRepository {
    client: Client,
    url: String,
}

impl StaticAssetRepository {
    pub fn new(client: Client, base_url: &str, category: Category) -> Self {
        Self {
            client,
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                category.static_file()
            ),
        }
    }
}

#[async_trait]
impl ContentRepository for StaticAssetRepository {
    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "{} returned {}",
                self.url, status
            )));
        }
        let bytes = response.bytes().await?;
        parse_collection(&bytes)
    }
}
