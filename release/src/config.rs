use serde::{Deserialize, Serialize};
use std::time::Duration;

/// GitHub repository whose releases drive the deployment.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://api.github.com/repos/Electron-Minecraft-Launcher/EML-AdminTool-v2";

/// Release asset holding the production compose file.
pub const DEFAULT_DESCRIPTOR_ASSET: &str = "docker-compose.prod.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub descriptor_asset: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("eml-updater/", env!("CARGO_PKG_VERSION")).to_string(),
            descriptor_asset: DEFAULT_DESCRIPTOR_ASSET.to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_descriptor_asset(mut self, asset: impl Into<String>) -> Self {
        self.descriptor_asset = asset.into();
        self
    }

    /// URL of the "latest release" endpoint.
    pub fn latest_release_url(&self) -> String {
        format!("{}/releases/latest", self.base_url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("User agent cannot be empty".to_string());
        }

        if self.descriptor_asset.is_empty() {
            return Err("Descriptor asset name cannot be empty".to_string());
        }

        Ok(())
    }
}
