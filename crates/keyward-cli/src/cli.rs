use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keyward")]
#[command(about = "Keyward - auth token lifecycle tool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (overrides KEYWARD_CONFIG; defaults to keyward.toml)
    #[arg(short, long, global = true, env = "KEYWARD_CONFIG")]
    pub config: Option<String>,

    /// Use the process-local revocation store instead of Redis
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a token pair for a configured identity
    Issue(IssueArgs),
    /// Issue a token pair for a new guest identity
    Guest,
    /// Verify an access token and print its claims
    Verify(TokenArgs),
    /// Exchange a refresh token for a new pair
    Rotate(TokenArgs),
    /// Revoke an access or refresh token
    Revoke(TokenArgs),
    /// List the permissions granted to a role
    Permissions(PermissionsArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct IssueArgs {
    /// Identity ID
    #[arg(long)]
    pub subject: Option<String>,

    /// Identity username
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Token string
    pub token: String,
}

#[derive(Args)]
pub struct PermissionsArgs {
    /// Role name (admin, researcher, student, guest)
    pub role: String,
}
