use crate::config::RegistryConfig;
use crate::registry::{DescriptorFetcher, ReleaseError, ReleaseRegistry, ReleaseResult};
use crate::types::{GithubRelease, ReleaseInfo};
use async_trait::async_trait;
use tracing::debug;

/// Release registry backed by the GitHub releases API.
///
/// The same HTTP client downloads release assets, so this type is also the
/// default [`DescriptorFetcher`].
pub struct GithubRegistry {
    http_client: reqwest::Client,
    config: RegistryConfig,
}

impl GithubRegistry {
    pub fn new(config: RegistryConfig) -> ReleaseResult<Self> {
        config
            .validate()
            .map_err(|message| ReleaseError::InvalidConfig { message })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ReleaseError::InvalidConfig {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn with_default_config() -> ReleaseResult<Self> {
        Self::new(RegistryConfig::default())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    async fn get(&self, url: &str) -> ReleaseResult<reqwest::Response> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ReleaseError::Unavailable {
                    message: format!("Request to {} timed out", url),
                }
            } else if e.is_connect() {
                ReleaseError::Unavailable {
                    message: format!("Cannot connect to {}", url),
                }
            } else {
                ReleaseError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ReleaseRegistry for GithubRegistry {
    async fn latest_release(&self) -> ReleaseResult<ReleaseInfo> {
        let url = self.config.latest_release_url();
        debug!(url = %url, "Fetching latest release");

        let release: GithubRelease = self.get(&url).await?.json().await?;
        let info = ReleaseInfo::from_release(release, &self.config.descriptor_asset);

        debug!(
            version = %info.version,
            has_descriptor = info.descriptor_url.is_some(),
            "Latest release retrieved"
        );
        Ok(info)
    }

    fn registry_name(&self) -> &'static str {
        "github"
    }
}

#[async_trait]
impl DescriptorFetcher for GithubRegistry {
    async fn fetch_descriptor(&self, url: &str) -> ReleaseResult<Vec<u8>> {
        debug!(url = %url, "Downloading deployment descriptor");

        let bytes = self.get(url).await?.bytes().await?;

        debug!(size = bytes.len(), "Deployment descriptor downloaded");
        Ok(bytes.to_vec())
    }
}
