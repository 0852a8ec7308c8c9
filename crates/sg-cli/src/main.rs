//! swarmgate CLI
//!
//! Lists and prunes swarm resources on a daemon reached through an SSH
//! tunnel (with a configured remote) or through DOCKER_HOST.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sg_client::{CallContext, ClientHandle, EnvSettings};
use sg_core::config::{self, ConfigFile, RemoteConfig, SshAuth};
use swarmgate::commands::{self, parse_filter};
use swarmgate::output::print_error;

#[derive(Parser)]
#[command(name = "swarmgate")]
#[command(author, version, about = "Query and prune swarm resources over an SSH tunnel")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Remote SSH host (host, host:port or [v6]:port); overrides config
    #[arg(short = 'H', long, global = true, env = "SWARMGATE_HOST")]
    host: Option<String>,

    /// Daemon socket path on the remote host
    #[arg(long, global = true)]
    socket: Option<String>,

    /// SSH user
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// SSH private key file (otherwise the configured method is used)
    #[arg(short, long, global = true)]
    key: Option<PathBuf>,

    /// Daemon API version (MAJOR.MINOR)
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Per-call deadline in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Reuse one SSH session for every connection
    #[arg(long, global = true)]
    pooled: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the daemon is reachable
    Ping,

    /// List services
    #[command(alias = "ls")]
    Services {
        /// Filter as KEY=VALUE (repeatable; repeated keys accumulate)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Only services whose name matches this regular expression
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List tasks
    Tasks {
        /// Only tasks of the service with this exact ID
        #[arg(short, long)]
        service: Option<String>,
        /// Filter as KEY=VALUE (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// List nodes
    Nodes {
        /// Filter as KEY=VALUE (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// List networks
    Networks {
        /// Filter as KEY=VALUE (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// List containers
    Containers {
        /// Filter as KEY=VALUE (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Remove every service whose name matches a regular expression
    Rm {
        /// Service name pattern
        pattern: String,
        /// Remove without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show => commands::config_show(cli.config.as_ref())?,
            ConfigAction::Path => commands::config_path(cli.config.as_ref()),
            ConfigAction::Init { force } => commands::config_init(cli.config.as_ref(), *force)?,
        }
        return Ok(());
    }

    let file = load_config_file(cli.config.as_ref())?;

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling...");
            cancel_clone.cancel();
        }
    });

    let mut ctx = CallContext::with_token(cancel);
    if let Some(timeout) = cli.timeout.map(Duration::from_secs).or(file.request_timeout) {
        ctx = ctx.with_call_timeout(timeout);
    }

    let handle = build_handle(&cli, file.remote, ctx)?;

    let result = match cli.command {
        Commands::Ping => commands::ping_command(&handle).await,
        Commands::Services { filters, name } => {
            commands::services_command(&handle, &filters, name.as_deref()).await
        }
        Commands::Tasks { service, filters } => {
            commands::tasks_command(&handle, service.as_deref(), &filters).await
        }
        Commands::Nodes { filters } => commands::nodes_command(&handle, &filters).await,
        Commands::Networks { filters } => commands::networks_command(&handle, &filters).await,
        Commands::Containers { filters } => {
            commands::containers_command(&handle, &filters).await
        }
        Commands::Rm { pattern, force } => commands::rm_command(&handle, &pattern, force).await,
        Commands::Config { .. } => Ok(()),
    };

    if let Err(e) = &result {
        print_error(&format!("{:#}", e));
    }
    result
}

/// Load the config file, tolerating a missing default file
fn load_config_file(explicit: Option<&PathBuf>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config file: {:?}", path)),
        None => {
            let path = config::default_config_path();
            if path.exists() {
                config::load_config(&path)
                    .with_context(|| format!("Failed to load config file: {:?}", path))
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

/// Build a handle from the config file and command-line overrides
///
/// With no remote host anywhere, the daemon settings come from the
/// environment.
fn build_handle(cli: &Cli, remote: Option<RemoteConfig>, ctx: CallContext) -> Result<ClientHandle> {
    let mut remote = remote.unwrap_or_default();

    if let Some(host) = &cli.host {
        remote.host = host.clone();
    }
    if let Some(socket) = &cli.socket {
        remote.socket_path = socket.clone();
    }
    if let Some(user) = &cli.user {
        remote.ssh.user = user.clone();
    }
    if let Some(key) = &cli.key {
        remote.ssh.auth = SshAuth::KeyFile {
            path: key.clone(),
            passphrase: None,
        };
    }
    if let Some(version) = &cli.api_version {
        remote.api_version = version.clone();
    }

    if remote.host.trim().is_empty() {
        tracing::debug!("No remote host configured, using environment");
        let mut settings = EnvSettings::from_env()?;
        if let Some(version) = &cli.api_version {
            settings.version = version.parse()?;
        }
        return Ok(ClientHandle::from_settings(ctx, settings)?);
    }

    tracing::debug!(
        "Tunneling to {} on {} as {}",
        remote.socket_path,
        remote.host,
        remote.ssh.user
    );
    Ok(ClientHandle::from_remote(ctx, &remote, cli.pooled)?)
}
