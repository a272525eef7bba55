// # splitdnsd - split-DNS synchronizer daemon
//
// Thin integration layer: parse flags, initialize logging, build the API
// client, and drive the sync engine once or on an interval. All resolution
// and update logic lives in splitdns-core.
//
// ## Example
//
// ```bash
// export SPLITDNS_API_KEY=tskey-api-...
//
// # Single pass
// splitdnsd --config /etc/splitdns/config.json --tailnet example.com
//
// # Daemon mode, one pass every five minutes
// splitdnsd --config /etc/splitdns/config.json --tailnet example.com --interval 300
// ```

use clap::Parser;
use splitdns_core::{SplitDnsConfig, Syncer};
use splitdns_tailnet::{Credentials, TailnetClient};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "splitdnsd",
    version,
    about = "Keep a tailnet split-DNS table in sync with service and device addresses"
)]
struct Cli {
    /// Path to the domain -> nameserver-reference config file
    #[arg(long, default_value = "/config.json")]
    config: PathBuf,

    /// Tailnet name ("-" selects the default tailnet of the credentials)
    #[arg(long, default_value = "-")]
    tailnet: String,

    /// API key; ignored when OAuth client credentials are set
    #[arg(long, env = "SPLITDNS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "SPLITDNS_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "SPLITDNS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// API base URL
    #[arg(long, default_value = "https://api.tailscale.com")]
    base_url: String,

    /// Run continuously, updating every N seconds (omit for a single pass)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Resolve and log, but skip the split-DNS submission
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SPLITDNS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("invalid log level: {}", other);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let config = match SplitDnsConfig::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load config: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };
    info!(
        "loaded {} domain(s) from {}",
        config.len(),
        cli.config.display()
    );

    let credentials = Credentials {
        api_key: cli.api_key.clone(),
        client_id: cli.client_id.clone(),
        client_secret: cli.client_secret.clone(),
    };
    let client = match TailnetClient::new(cli.tailnet.as_str(), &cli.base_url, credentials) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to create API client: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    let syncer = Syncer::new(Box::new(client), config).with_dry_run(cli.dry_run);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let outcome = rt.block_on(async {
        match cli.interval {
            Some(secs) if secs > 0 => match syncer.run(Duration::from_secs(secs)).await {
                Ok(()) => DaemonExitCode::CleanShutdown,
                Err(e) => {
                    error!("daemon error: {}", e);
                    DaemonExitCode::RuntimeError
                }
            },
            _ => match syncer.run_once().await {
                Ok(()) => DaemonExitCode::CleanShutdown,
                Err(e) => {
                    error!("failed to update split DNS: {}", e);
                    DaemonExitCode::RuntimeError
                }
            },
        }
    });

    outcome.into()
}
