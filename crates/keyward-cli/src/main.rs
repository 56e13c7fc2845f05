mod cli;
mod commands;
mod config;
mod observability;
mod output;
mod store;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use keyward_auth::{AuthorizationResolver, InMemoryIdentityProvider, TokenService};

use cli::{Cli, Commands};
use config::StoreBackend;
use output::print_error;
use store::Store;

#[tokio::main]
async fn main() {
    // Load .env if present; a missing file is not an error.
    if let Err(e) = dotenvy::dotenv()
        && !matches!(&e, dotenvy::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: failed to load .env: {e}");
    }

    observability::init_tracing("warn");

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Role lookups need no configuration.
    if let Commands::Permissions(args) = &cli.command {
        return commands::authz::permissions(&AuthorizationResolver::new(), &args.role);
    }

    let mut cfg = config::loader::load_config(cli.config.as_deref())?;
    observability::apply_logging_level(&cfg.logging.level);
    if cli.memory {
        cfg.store.backend = StoreBackend::Memory;
    }

    if let Commands::Config = cli.command {
        return output::print_json(&cfg.redacted()?);
    }

    let store = Store::open(cfg.store.backend, &cfg.redis).await?;
    let identities = Arc::new(InMemoryIdentityProvider::with_identities(
        cfg.identities.clone(),
    ));
    tracing::debug!(count = cfg.identities.len(), "Loaded identities");

    let service = TokenService::new(cfg.auth.clone(), store.handle(), identities)?;

    let result = match &cli.command {
        Commands::Issue(args) => {
            commands::tokens::issue(&service, args.subject.as_deref(), args.username.as_deref())
                .await
        }
        Commands::Guest => commands::tokens::guest(&service),
        Commands::Verify(args) => commands::tokens::verify(&service, &args.token).await,
        Commands::Rotate(args) => commands::tokens::rotate(&service, &args.token).await,
        Commands::Revoke(args) => commands::tokens::revoke(&service, &args.token).await,
        Commands::Permissions(_) | Commands::Config => Ok(()),
    };

    store.close();
    result
}
