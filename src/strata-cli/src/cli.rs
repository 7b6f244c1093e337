//! CLI argument structures.

use clap::{Args, Parser, Subcommand};

use crate::defaults;

/// Strata CLI - manage Strata application services from the terminal.
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about = "CLI for the Strata hosted platform")]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the Strata platform
    Login(LoginArgs),
    /// End the current session and clear stored credentials
    Logout,
    /// Print the username of the logged-in account
    Whoami,
    /// Show connection status and selected service contexts
    Status,
    /// Work with managed stream instances
    Streams {
        #[command(subcommand)]
        command: StreamsCommands,
    },
    /// Work with registry instances
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

#[derive(Args)]
pub struct LoginArgs {
    /// URL or alias (production, staging) of the API gateway
    #[arg(long = "api-gateway", default_value = defaults::PRODUCTION_API_URL)]
    pub api_gateway: String,

    /// URL or alias of the primary authentication server
    #[arg(long = "auth-url", default_value = defaults::PRODUCTION_AUTH_URL)]
    pub auth_url: String,

    /// URL or alias of the secondary authentication server
    #[arg(long = "secondary-auth-url", default_value = defaults::PRODUCTION_SECONDARY_AUTH_URL)]
    pub secondary_auth_url: String,

    /// OpenID client identifier
    #[arg(long = "client-id", default_value = defaults::CLIENT_ID)]
    pub client_id: String,

    /// OpenID scope; repeat to request several (replaces the defaults)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Log in non-interactively with a long-lived offline token
    #[arg(long = "token", short = 't')]
    pub offline_token: Option<String>,

    /// Disable verification of TLS certificates and host names
    #[arg(long)]
    pub insecure: bool,

    /// Print the SSO URL instead of opening a browser
    #[arg(long = "print-sso-url")]
    pub print_sso_url: bool,
}

#[derive(Subcommand)]
pub enum StreamsCommands {
    /// List stream instances
    List,
    /// List the topics of one stream instance
    Topics {
        /// Stream instance ID
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RegistryCommands {
    /// List registry instances
    List,
}
