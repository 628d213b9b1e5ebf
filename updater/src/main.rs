use clap::Parser;
use deploy::{CliDeploymentRunner, ContainerRuntime};
use release::GithubRegistry;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use updater::{serve, ConfigError, Updater, UpdaterConfig, DEFAULT_ENV_FILE};

#[derive(Parser)]
#[command(name = "updater")]
#[command(about = "Webhook that deploys the latest published release")]
struct Cli {
    /// Environment file holding ENVIRONMENT and UPDATER_HTTP_API_TOKEN
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: SocketAddr,
    /// Container runtime used for the deployment refresh (docker or podman)
    #[arg(long, default_value = "docker")]
    runtime: ContainerRuntime,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match UpdaterConfig::load(&cli.env_file) {
        Ok(config) => config,
        Err(ConfigError::MissingEnvFile { path }) => {
            info!(path = %path.display(), "No environment file found, exiting");
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    info!(
        env_file = %cli.env_file.display(),
        environment = %config.environment,
        image = %config.image,
        runtime = %cli.runtime,
        "Configuration loaded"
    );

    let registry = Arc::new(GithubRegistry::with_default_config()?);
    let runner = Arc::new(CliDeploymentRunner::new(cli.runtime));
    let updater = Arc::new(Updater::new(config, registry.clone(), registry, runner));

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    if let Err(e) = serve(listener, updater, shutdown_signal()).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Updater shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C");
        }
        () = terminate => {
            info!("Received SIGTERM");
        }
    }
}
