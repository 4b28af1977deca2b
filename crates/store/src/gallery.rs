//! Remote extension gallery.
//!
//! The gallery resolves names to installable candidates. Transport failures
//! keep the server's response body so callers can surface its reason.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GalleryPage, GalleryQuery};

#[cfg(feature = "http")]
pub use http::{create_default_client, download, HttpGallery, DEFAULT_TIMEOUT_SECS, USER_AGENT};

/// Catalog of installable extensions
#[async_trait]
pub trait ExtensionGallery: Send + Sync {
    /// Query the catalog; results are fetched fresh on every call
    async fn query(&self, query: &GalleryQuery) -> Result<GalleryPage>;
}

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;
    use url::Url;

    use super::ExtensionGallery;
    use crate::error::{Result, StoreError, TransportError};
    use crate::models::{GalleryPage, GalleryQuery};

    pub const USER_AGENT: &str = concat!("quay/", env!("CARGO_PKG_VERSION"));
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const QUERY_ENDPOINT: &str = "extensionquery";

    /// Create an HTTP client with the gallery user agent and a request timeout
    pub fn create_default_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))
    }

    /// Turn a non-success response into a transport error carrying its body
    async fn error_for_response(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown error");
        let mut error = TransportError::new(format!("HTTP {} {}", status.as_u16(), reason))
            .with_status(status.as_u16());

        match response.text().await {
            Ok(text) if !text.is_empty() => error = error.with_response_text(text),
            Ok(_) => {}
            Err(e) => debug!("Failed to read error response body: {}", e),
        }
        StoreError::Transport(error)
    }

    fn request_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Transport(TransportError::new(e.to_string()))
        }
    }

    /// Download the bytes behind a gallery download URL
    pub async fn download(client: &Client, url: &str) -> Result<Vec<u8>> {
        let response = client.get(url).send().await.map_err(request_error)?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        let bytes = response.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }

    /// Gallery reached over HTTP
    pub struct HttpGallery {
        client: Client,
        service_url: Url,
    }

    impl HttpGallery {
        pub fn new(service_url: Url) -> Result<Self> {
            let client = create_default_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
            Ok(Self::with_client(client, service_url))
        }

        pub fn with_client(client: Client, service_url: Url) -> Self {
            Self {
                client,
                service_url,
            }
        }

        pub fn query_url(&self) -> Result<Url> {
            self.service_url
                .join(QUERY_ENDPOINT)
                .map_err(|e| StoreError::ConfigError(format!("Invalid gallery URL: {}", e)))
        }
    }

    #[async_trait]
    impl ExtensionGallery for HttpGallery {
        async fn query(&self, query: &GalleryQuery) -> Result<GalleryPage> {
            let url = self.query_url()?;
            debug!("Querying gallery {} for {:?}", url, query.names);

            let response = self
                .client
                .post(url)
                .json(query)
                .send()
                .await
                .map_err(request_error)?;

            if !response.status().is_success() {
                return Err(error_for_response(response).await);
            }

            let text = response.text().await.map_err(request_error)?;
            serde_json::from_str(&text).map_err(|e| {
                StoreError::Transport(
                    TransportError::new(format!("Malformed gallery response: {}", e))
                        .with_response_text(text),
                )
            })
        }
    }

}
