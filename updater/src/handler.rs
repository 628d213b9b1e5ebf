use crate::config::{Environment, UpdaterConfig};
use crate::error::{SyncError, UpdateError, UpdateResult};
use deploy::DeploymentRunner;
use release::{DescriptorFetcher, ReleaseInfo, ReleaseRegistry};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Result of an authorized update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Development mode: the release was resolved but nothing was changed.
    Simulated { version: String },
    /// The descriptor (if any) was synced and the deployment refreshed.
    Applied { version: String },
}

impl UpdateOutcome {
    pub fn version(&self) -> &str {
        match self {
            Self::Simulated { version } | Self::Applied { version } => version,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Simulated { version } => format!("Mock update to {} successful", version),
            Self::Applied { .. } => "Update applied".to_string(),
        }
    }
}

/// Runs the lookup, sync and refresh sequence against its collaborators.
pub struct Updater {
    config: Arc<UpdaterConfig>,
    registry: Arc<dyn ReleaseRegistry>,
    fetcher: Arc<dyn DescriptorFetcher>,
    runner: Arc<dyn DeploymentRunner>,
    // Held for a whole update so concurrent triggers never share the descriptor file.
    guard: Mutex<()>,
}

impl Updater {
    pub fn new(
        config: UpdaterConfig,
        registry: Arc<dyn ReleaseRegistry>,
        fetcher: Arc<dyn DescriptorFetcher>,
        runner: Arc<dyn DeploymentRunner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            fetcher,
            runner,
            guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Check the raw `Authorization` header against the shared secret.
    pub fn authorize(&self, authorization: Option<&str>) -> UpdateResult<()> {
        match authorization {
            Some(value) if value == self.config.expected_authorization() => Ok(()),
            _ => {
                warn!("Unauthorized access attempt");
                Err(UpdateError::Unauthorized)
            }
        }
    }

    pub async fn run_update(&self) -> UpdateResult<UpdateOutcome> {
        let _guard = self.guard.lock().await;

        let release = self.registry.latest_release().await.map_err(|e| {
            error!(
                registry = self.registry.registry_name(),
                error = %e,
                "Unable to fetch latest release"
            );
            UpdateError::RegistryUnavailable(e)
        })?;

        info!(
            version = %release.version,
            published_on = ?release.published_on,
            changelog = %release.changelog,
            "Latest release found"
        );

        match self.config.environment {
            Environment::Development => {
                info!(version = %release.version, "Mock update: nothing is done");
                Ok(UpdateOutcome::Simulated {
                    version: release.version,
                })
            }
            Environment::Production => self.apply(release).await,
        }
    }

    async fn apply(&self, release: ReleaseInfo) -> UpdateResult<UpdateOutcome> {
        match &release.descriptor_url {
            Some(url) => self.sync_descriptor(url).await?,
            None => info!("Release ships no descriptor, keeping the current one"),
        }

        let image = release.image_reference(&self.config.image);
        self.runner.pull_image(&image).await.map_err(|e| {
            error!(image = %image, error = %e, "Error during update");
            UpdateError::DeploymentFailed(e)
        })?;

        self.runner
            .compose_up(&self.config.descriptor_path)
            .await
            .map_err(|e| {
                error!(error = %e, "Error during update");
                UpdateError::DeploymentFailed(e)
            })?;

        info!(version = %release.version, "Update applied");
        Ok(UpdateOutcome::Applied {
            version: release.version,
        })
    }

    /// Overwrite the local descriptor with the bytes served at `url`.
    pub async fn sync_descriptor(&self, url: &str) -> UpdateResult<()> {
        let path = &self.config.descriptor_path;

        let result: Result<(), SyncError> = async {
            let content = self.fetcher.fetch_descriptor(url).await?;
            tokio::fs::write(path, &content)
                .await
                .map_err(|source| SyncError::Write {
                    path: path.clone(),
                    source,
                })
        }
        .await;

        match result {
            Ok(()) => {
                info!(path = %path.display(), "New descriptor saved");
                Ok(())
            }
            Err(e) => {
                error!(url = %url, error = %e, "Unable to sync descriptor");
                Err(e.into())
            }
        }
    }
}
