pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{
    ConfigError, ConfigResult, Environment, UpdaterConfig, DEFAULT_DESCRIPTOR_PATH,
    DEFAULT_ENV_FILE, DEFAULT_IMAGE,
};
pub use error::{SyncError, UpdateError, UpdateResponse, UpdateResult};
pub use handler::{UpdateOutcome, Updater};
pub use server::{router, serve};
