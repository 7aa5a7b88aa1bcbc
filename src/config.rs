use clap::Parser;

use crate::collectors::runner::FetchPolicy;
use crate::models::filter::{DEFAULT_HOST, QueryFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "jobsearch", about = "Job listing search with a result cache")]
pub struct Config {
    /// Source host used when a query does not name one
    #[arg(long, env = "JOBSEARCH_HOST", default_value = DEFAULT_HOST)]
    pub default_host: String,

    /// How long a completed search stays cached, in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "3600")]
    pub cache_ttl_secs: u64,

    /// Interval between background sweeps of expired cache entries, in seconds
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value = "600")]
    pub sweep_interval_secs: u64,

    /// Per-request timeout against the source, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Multiplier applied to the retry backoff after a 429 response
    #[arg(long, env = "RATE_LIMIT_BACKOFF_FACTOR", default_value = "1")]
    pub rate_limit_backoff_factor: u32,

    /// Bearer token required by the HTTP API (open when unset)
    #[arg(long, env = "API_TOKEN")]
    pub api_token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the web server (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
    /// Run one search and print the records as JSON
    Query {
        #[command(flatten)]
        filter: QueryFilter,
    },
}

impl Config {
    /// Fetch pacing and retry policy with the configured overrides.
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            rate_limit_backoff_factor: self.rate_limit_backoff_factor.max(1),
            ..FetchPolicy::default()
        }
    }

    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}
