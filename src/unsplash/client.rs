//! Unsplash REST API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PhotoId, PhotoSource};
use crate::config::UnsplashSettings;

/// Subset of the `GET /photos/:id` response that the site uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsplashPhoto {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub blur_hash: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub urls: PhotoUrls,
    pub user: PhotoUser,
    #[serde(default)]
    pub links: Option<PhotoLinks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUser {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub links: Option<PhotoLinks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoLinks {
    pub html: String,
}

impl UnsplashPhoto {
    /// Best available alt text
    pub fn alt(&self) -> Option<&str> {
        self.alt_description
            .as_deref()
            .or(self.description.as_deref())
    }
}

/// Unsplash API client
pub struct UnsplashClient {
    /// Access key (sent as `Client-ID`)
    access_key: String,
    /// API base URL without trailing slash
    api_base: String,
    /// HTTP client
    client: reqwest::Client,
}

impl UnsplashClient {
    /// Create a new client
    pub fn new(settings: &UnsplashSettings) -> Result<Self> {
        let access_key = settings
            .access_key
            .clone()
            .context("Unsplash access key is not configured (set UNSPLASH_ACCESS_KEY)")?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            access_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PhotoSource for UnsplashClient {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn fetch_photo(&self, id: &PhotoId) -> Result<UnsplashPhoto> {
        let url = self.api_url(&format!("photos/{}", id));
        tracing::debug!(%id, "Fetching photo from Unsplash");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()
            .await
            .with_context(|| format!("Failed to request Unsplash photo {}", id))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Unsplash API error for photo {}: HTTP {}", id, status.as_u16());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Unsplash response for photo {}", id))
    }
}
