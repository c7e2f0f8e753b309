//! Command line configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};

use trolley::{
    csrf::{self, CsrfToken},
    gateway::HttpGatewayConfig,
};

/// Trolley storefront cart client
#[derive(Debug, Parser)]
#[command(name = "trolley", about = "Storefront cart client", long_about = None)]
pub(crate) struct CliConfig {
    /// Storefront connection settings.
    #[command(flatten)]
    pub storefront: StorefrontConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Storefront settings.
#[derive(Debug, Args)]
pub(crate) struct StorefrontConfig {
    /// Storefront base address; required by commands that reach the storefront
    #[arg(long = "storefront-url", env = "STOREFRONT_URL")]
    pub url: Option<String>,

    /// Anti-forgery token, used when no cookie header is given
    #[arg(long, env = "CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// `Cookie` header holding the anti-forgery token
    #[arg(long, env = "CSRF_COOKIE", hide_env_values = true)]
    pub csrf_cookie: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 10)]
    pub timeout_seconds: u64,
}

impl StorefrontConfig {
    /// Gateway settings for these options, or `None` without a storefront address.
    pub fn gateway_config(&self) -> Option<HttpGatewayConfig> {
        let base_url = self.url.clone()?;

        Some(HttpGatewayConfig {
            base_url,
            csrf_token: CsrfToken::resolve(
                self.csrf_cookie.as_deref(),
                csrf::DEFAULT_COOKIE_NAME,
                self.csrf_token.as_deref(),
            ),
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Cart operations.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Show the cart with recomputed totals.
    Show {
        /// YAML cart fixture
        #[arg(long)]
        cart: PathBuf,
    },

    /// Commit a new quantity for a line.
    Update {
        /// YAML cart fixture
        #[arg(long)]
        cart: PathBuf,

        /// Line to update
        #[arg(long)]
        line: String,

        /// Quantity as typed
        #[arg(long, allow_hyphen_values = true)]
        quantity: String,
    },

    /// Remove a line from the cart.
    Remove {
        /// YAML cart fixture
        #[arg(long)]
        cart: PathBuf,

        /// Line to remove
        #[arg(long)]
        line: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a product to the cart.
    Add {
        /// YAML cart fixture
        #[arg(long)]
        cart: PathBuf,

        /// Product to add
        #[arg(long)]
        product: String,

        /// Quantity to add; defaults to 1
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        quantity: String,
    },

    /// Validate a search query.
    Search {
        /// Query as typed
        query: String,
    },
}
