use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default location of the environment file.
pub const DEFAULT_ENV_FILE: &str = "/app/env/.env";

/// Image refreshed on every update; the release version becomes its tag.
pub const DEFAULT_IMAGE: &str = "ghcr.io/electron-minecraft-launcher/eml-admintool";

/// Compose file that is overwritten by release descriptors and re-applied.
pub const DEFAULT_DESCRIPTOR_PATH: &str = "/app/compose/docker-compose.prod.yml";

pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
pub const TOKEN_VAR: &str = "UPDATER_HTTP_API_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No environment file found at {}", .path.display())]
    MissingEnvFile { path: PathBuf },

    #[error("Failed to read environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Invalid ENVIRONMENT value '{value}', expected 'production' or 'development'")]
    InvalidEnvironment { value: String },

    #[error("UPDATER_HTTP_API_TOKEN must be set to a non-empty value")]
    MissingToken,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Whether updates touch real infrastructure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Production,
    /// Resolve the release but skip the descriptor sync and deployment refresh.
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            _ => Err(ConfigError::InvalidEnvironment {
                value: s.to_string(),
            }),
        }
    }
}

/// Process-wide settings, built once at startup and shared read-only with the handler.
#[derive(Clone)]
pub struct UpdaterConfig {
    pub image: String,
    pub environment: Environment,
    pub token: String,
    pub descriptor_path: PathBuf,
}

impl fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdaterConfig")
            .field("image", &self.image)
            .field("environment", &self.environment)
            .field("token", &"<redacted>")
            .field("descriptor_path", &self.descriptor_path)
            .finish()
    }
}

impl UpdaterConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            environment: Environment::default(),
            token: token.into(),
            descriptor_path: PathBuf::from(DEFAULT_DESCRIPTOR_PATH),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_descriptor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptor_path = path.into();
        self
    }

    /// Load from an environment file.
    ///
    /// The file is parsed without touching the process environment. Variables
    /// already present in the process environment win over file values.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::MissingEnvFile {
                path: path.to_path_buf(),
            });
        }

        let mut file_vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            file_vars.insert(key, value);
        }

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENVIRONMENT_VAR) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self::new(token).with_environment(environment))
    }

    /// Exact `Authorization` header value a caller must present.
    pub fn expected_authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
