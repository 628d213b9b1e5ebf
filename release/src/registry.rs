use crate::types::ReleaseInfo;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Source of release metadata.
#[async_trait]
pub trait ReleaseRegistry: Send + Sync {
    async fn latest_release(&self) -> ReleaseResult<ReleaseInfo>;

    fn registry_name(&self) -> &'static str;
}

/// Downloads the raw bytes of a deployment descriptor.
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    async fn fetch_descriptor(&self, url: &str) -> ReleaseResult<Vec<u8>>;
}
