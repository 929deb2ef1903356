//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use patient_records_core::StoreConfig;

/// Log filter used when neither `RUST_LOG` nor `--log-filter` is set.
pub const DEFAULT_LOG_FILTER: &str =
    "patient_records_server=info,patient_records_core=info,tower_http=info";

#[derive(Parser, Debug, Clone)]
#[command(name = "patient-records")]
#[command(version)]
#[command(about = "Patient records JSON service", long_about = None)]
pub struct Cli {
    /// SQLite database file (created on first start)
    #[arg(long, env = "PATIENT_RECORDS_DB", default_value = "patients.db")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "PATIENT_RECORDS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// How long a writer waits for another writer's lock, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// tracing filter directive; RUST_LOG takes precedence
    #[arg(long, env = "PATIENT_RECORDS_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub log_filter: String,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: cli.bind,
            store: StoreConfig {
                database_path: cli.database,
                busy_timeout: Duration::from_millis(cli.busy_timeout_ms),
            },
            log_filter: cli.log_filter,
        }
    }
}
