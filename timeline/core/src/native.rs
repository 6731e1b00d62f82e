use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::ViewerConfig;
use crate::error::{LoadError, Result};
use crate::fetcher::http_client;

/// The panel's own resource loader, used for everything that is not the
/// timeline asset.
#[async_trait]
pub trait NativeLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<String>;
}

/// Native loader backed by a plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpNativeLoader {
    client: Client,
}

impl HttpNativeLoader {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NativeLoader for HttpNativeLoader {
    async fn load(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::NativeLoader(format!(
                "HTTP error: {} for {url}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}
