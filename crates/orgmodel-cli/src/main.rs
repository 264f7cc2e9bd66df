//! orgmodel CLI
//!
//! Command-line interface for the organisation model store

use clap::{Parser, Subcommand};
use orgmodel_core::logging_facility::{self, Profile};
use orgmodel_core::ExError;
use orgmodel_core_types::RequestContext;
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "orgmodel")]
#[command(about = "orgmodel - Organisation model store", long_about = None)]
struct Cli {
    /// Configuration file (default: orgmodel.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Logging profile: dev or prod
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply schema migrations
    Migrate,
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Localized text lookups
    Text(commands::text::TextArgs),
    /// Localized category listings
    Categories(commands::categories::CategoriesArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Migrate => "migrate",
            Commands::Seed(_) => "seed",
            Commands::Text(_) => "text",
            Commands::Categories(_) => "categories",
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app_config = config::load(cli.config.as_deref())?;
    app_config.apply_overrides(cli.db, cli.log);

    logging_facility::init(app_config.log.profile);

    let ctx = RequestContext::new(cli.command.name());
    let span = tracing::info_span!("orgmodel", request_id = %ctx.request_id, command = ctx.command);
    let _entered = span.enter();
    tracing::debug!(db = %app_config.store.path.display(), "configuration loaded");

    let result = match cli.command {
        Commands::Migrate => commands::migrate::execute(&app_config),
        Commands::Seed(args) => commands::seed::execute(args, &app_config),
        Commands::Text(args) => commands::text::execute(args, &app_config),
        Commands::Categories(args) => commands::categories::execute(args, &app_config),
    };

    result.map_err(|e| match e.downcast::<ExError>() {
        Ok(ex) => anyhow::Error::new(ex.with_request_id(ctx.request_id.clone())),
        Err(e) => e,
    })
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
