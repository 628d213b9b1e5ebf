//! Update errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deploy::DeployError;
use release::ReleaseError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unable to download descriptor: {0}")]
    Download(#[from] ReleaseError),

    #[error("Unable to write descriptor to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Release registry unavailable: {0}")]
    RegistryUnavailable(#[source] ReleaseError),

    #[error("Descriptor sync failed: {0}")]
    DescriptorSyncFailed(#[from] SyncError),

    #[error("Deployment failed: {0}")]
    DeploymentFailed(#[from] DeployError),

    #[error("Update task aborted: {0}")]
    TaskAborted(#[from] tokio::task::JoinError),
}

pub type UpdateResult<T> = Result<T, UpdateError>;

impl UpdateError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RegistryUnavailable(_)
            | Self::DescriptorSyncFailed(_)
            | Self::DeploymentFailed(_)
            | Self::TaskAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Deployment details stay in the logs.
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::RegistryUnavailable(_) => "Unable to fetch release",
            Self::DescriptorSyncFailed(_) => "Failed to download compose",
            Self::DeploymentFailed(_) | Self::TaskAborted(_) => "See logs",
        }
    }
}

/// JSON body shared by every `/update` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(UpdateResponse::failure(self.public_message())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            UpdateError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            UpdateError::DeploymentFailed(DeployError::UnknownRuntime {
                name: "lxc".into()
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn deployment_details_are_not_exposed() {
        let error = UpdateError::DeploymentFailed(DeployError::CommandFailed {
            command: "docker pull internal.registry/app:1.0.0".into(),
            status: "exit status: 1".into(),
            stderr: "denied: token expired".into(),
        });
        assert!(error.to_string().contains("denied: token expired"));
        assert_eq!(error.public_message(), "See logs");
    }

    #[test]
    fn sync_error_messages() {
        let error = UpdateError::from(SyncError::Write {
            path: PathBuf::from("/app/compose/docker-compose.prod.yml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(error.to_string().contains("/app/compose/docker-compose.prod.yml"));
        assert_eq!(error.public_message(), "Failed to download compose");
    }

    #[test]
    fn response_body_shape() {
        let body = serde_json::to_value(UpdateResponse::failure("Unauthorized")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Unauthorized"})
        );

        let body = serde_json::to_value(UpdateResponse::success("Update applied")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Update applied"})
        );
    }
}
