pub mod config;
pub mod github;
pub mod registry;
pub mod types;

pub use config::{RegistryConfig, DEFAULT_DESCRIPTOR_ASSET, DEFAULT_REGISTRY_URL};
pub use github::GithubRegistry;
pub use registry::{DescriptorFetcher, ReleaseError, ReleaseRegistry, ReleaseResult};
pub use types::{publish_date, strip_version_prefix, GithubAsset, GithubRelease, ReleaseInfo};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::github::*;
    pub use crate::registry::*;
    pub use crate::types::*;
}
