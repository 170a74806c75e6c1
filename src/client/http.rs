//! Static platform resources fetched over HTTPS.
//!
//! A handful of documents (professional monitoring terms, marketing
//! copy) live on the platform's static CDN rather than the message bus.

use serde::Deserialize;

use super::ClientError;

/// A static document: a title plus body paragraphs
#[derive(Debug, Clone, Deserialize)]
pub struct StaticDocument {
    pub title: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

/// Client for the platform's static resource base
#[derive(Debug, Clone)]
pub struct StaticResources {
    base_url: String,
    http: reqwest::Client,
}

impl StaticResources {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch a JSON document relative to the resource base
    pub async fn fetch_document(&self, path: &str) -> Result<StaticDocument, ClientError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ClientError::transport(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        response
            .json::<StaticDocument>()
            .await
            .map_err(|e| ClientError::malformed(e.to_string()))
    }

    /// The professional monitoring information document shown during signup
    pub async fn promon_info(&self) -> Result<StaticDocument, ClientError> {
        self.fetch_document("promonitoring/info.json").await
    }
}
