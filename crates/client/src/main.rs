//! gatewayctl
//!
//! Command-line front end for the gateway client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gateway_client::config::{default_config_path, Config};
use gateway_client::{
    FileIdentityStore, GatewayClient, IdentityProvider, RestartHandler, RestartReport,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// gatewayctl - talk to and supervise the local agent gateway.
#[derive(Parser, Debug)]
#[command(name = "gatewayctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one request and print its result
    Call {
        /// Gateway method name
        method: String,

        /// Request parameters as a JSON object
        #[arg(long, short, default_value = "{}")]
        params: String,

        /// Response deadline in milliseconds (defaults to the configured request timeout)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// How long to wait for authentication in milliseconds
        #[arg(long, default_value = "10000")]
        connect_timeout_ms: u64,
    },

    /// Print gateway events as JSON lines until interrupted
    Watch {
        /// Run the health monitor and restart the gateway when it stops responding
        #[arg(long)]
        health: bool,
    },

    /// Show the device identity, creating it if needed
    Identity,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.to_lowercase()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Using config file: {:?}", config_path);
    config.validate()?;

    match cli.command {
        Commands::Call {
            method,
            params,
            timeout_ms,
            connect_timeout_ms,
        } => {
            let params: Value =
                serde_json::from_str(&params).context("--params must be valid JSON")?;
            run_call(
                &config,
                &method,
                params,
                timeout_ms.map(Duration::from_millis),
                Duration::from_millis(connect_timeout_ms),
            )
            .await?;
        }
        Commands::Watch { health } => {
            run_watch(&config, health || config.health.enabled).await?;
        }
        Commands::Identity => {
            let store = FileIdentityStore::new(config.identity_path());
            let identity = store.load_or_create()?;
            println!("Device ID:  {}", identity.device_id());
            println!("Public key: {}", identity.public_key_base64url());
            println!("Stored at:  {}", store.path().display());
        }
        Commands::Config(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save(&config_path)?;
            println!("Wrote default configuration to {}", config_path.display());
        }
        Commands::Config(ConfigCommands::Show) => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn build_client(config: &Config) -> GatewayClient {
    GatewayClient::builder(config.client_config())
        .settings(config.settings())
        .identity_provider(Arc::new(FileIdentityStore::new(config.identity_path())))
        .build()
}

async fn run_call(
    config: &Config,
    method: &str,
    params: Value,
    timeout: Option<Duration>,
    connect_timeout: Duration,
) -> anyhow::Result<()> {
    let client = build_client(config);
    client.start();

    if let Err(e) = client.wait_until_connected(connect_timeout).await {
        client.stop();
        return Err(e).with_context(|| {
            format!("Could not authenticate with gateway at {}", config.client_config().ws_url())
        });
    }

    let result = match timeout {
        Some(timeout) => client.request_with_timeout(method, params, timeout).await,
        None => client.request(method, params).await,
    };
    client.stop();

    let payload = result.with_context(|| format!("Request {} failed", method))?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn run_watch(config: &Config, health: bool) -> anyhow::Result<()> {
    let client = build_client(config);

    client.set_event_handler(|event| match serde_json::to_string(&event) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!(error = %e, event = %event.event, "failed to encode event"),
    });

    if health {
        if config.restart.command.is_empty() {
            tracing::warn!("health monitor enabled without [restart].command; failures are only logged");
        } else {
            client.set_restart_callback(command_restart_handler(config.restart.command.clone()));
        }
        client.set_notify_callback(|report: RestartReport| async move {
            if report.succeeded {
                tracing::info!(failures = report.failures, "gateway restarted");
            } else {
                tracing::error!(
                    failures = report.failures,
                    error = report.error.as_deref().unwrap_or("unknown"),
                    "gateway restart failed"
                );
            }
        });
        client.set_health_check_enabled(true);
    }

    client.start();
    tracing::info!("Watching gateway events, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    client.stop();
    Ok(())
}

/// Restarts the gateway by running an external command.
fn command_restart_handler(argv: Vec<String>) -> impl RestartHandler + 'static {
    move || {
        let argv = argv.clone();
        async move {
            let (program, args) = argv.split_first().context("restart command is empty")?;
            tracing::info!(command = %argv.join(" "), "running restart command");

            let status = tokio::process::Command::new(program)
                .args(args)
                .status()
                .await
                .with_context(|| format!("Failed to run {}", program))?;
            if !status.success() {
                bail!("{} exited with {}", program, status);
            }
            Ok::<(), anyhow::Error>(())
        }
    }
}
