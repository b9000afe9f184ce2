use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin REST client over the document store. Exposes the four operations
/// the cells need: find-by-id, find-by-query, create, update-by-id.
pub struct DocumentStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DocumentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fetch a single document by id. Returns `None` when absent.
    pub async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let path = format!("/rest/v1/{}?id=eq.{}", collection, id);
        let result: Vec<Value> = self.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    /// Fetch documents matching a raw filter string, e.g. `user_id=eq.42`.
    pub async fn find(&self, collection: &str, filter: &str) -> Result<Vec<Value>> {
        let path = if filter.is_empty() {
            format!("/rest/v1/{}", collection)
        } else {
            format!("/rest/v1/{}?{}", collection, filter)
        };
        self.request(Method::GET, &path, None).await
    }

    /// Insert a new document and return the stored representation.
    pub async fn insert(&self, collection: &str, document: Value) -> Result<Value> {
        let path = format!("/rest/v1/{}", collection);

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .request_with_headers(Method::POST, &path, Some(document), Some(headers))
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no document", collection))
    }

    /// Apply a partial update to the document with the given id.
    /// The store replies with no body (`return=minimal`).
    pub async fn update_by_id(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        let path = format!("/rest/v1/{}?id=eq.{}", collection, id);
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.headers();
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let response = self
            .client
            .request(Method::PATCH, &url)
            .headers(headers)
            .json(&patch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);
            return Err(anyhow!("Store error ({}): {}", status, error_text));
        }

        Ok(())
    }
}
