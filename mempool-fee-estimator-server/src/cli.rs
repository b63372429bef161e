//! Command-line interface configuration

use clap::Parser;

use crate::config::AppConfig;

/// Default log filter for the server binary
pub const DEFAULT_LOG_FILTER: &str = "mempool_fee_estimator_server=info,mempool_fee_estimator=info";

/// Mempool Fee Estimator Server CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // Server options
    /// Host to bind the server to (overrides the configuration file)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    // Chain
    /// Block height to start from before the first block arrives
    #[arg(long, default_value_t = 0)]
    pub start_height: u32,

    // Logging
    /// Log filter (e.g., "mempool_fee_estimator_server=debug,mempool_fee_estimator=info")
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
