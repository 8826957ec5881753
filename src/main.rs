use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contactbook::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contactbook=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Login { email, password } => cli::commands::login(config, email, password).await,
        Commands::Register {
            name,
            email,
            password,
        } => cli::commands::register(config, name, email, password).await,
        Commands::Logout => cli::commands::logout(config).await,
        Commands::Status { format } => cli::commands::status(config, format).await,
        Commands::Profile { action } => cli::commands::profile(config, action).await,
        Commands::Contacts { action } => cli::commands::contacts(config, action).await,
        Commands::Orgs { action } => cli::commands::orgs(config, action).await,
        Commands::Roles { format } => cli::commands::roles(config, format).await,
    }
}
