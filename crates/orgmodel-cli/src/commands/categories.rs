//! Category listing command
//!
//! Usage: orgmodel categories list [--locale <TAG>]

use crate::commands::{load_model, parse_locale};
use crate::config::AppConfig;
use clap::{Args, Subcommand};
use orgmodel_core::model::{sort_localized, LocalizedCategory};

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List localized categories in localized order
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Language tag such as sv-SE; defaults to each category's standard locale
    #[arg(long)]
    pub locale: Option<String>,
}

pub fn execute(args: CategoriesArgs, config: &AppConfig) -> anyhow::Result<()> {
    match args.command {
        CategoriesCommand::List(list_args) => execute_list(list_args, config),
    }
}

fn execute_list(args: ListArgs, config: &AppConfig) -> anyhow::Result<()> {
    let locale = parse_locale(args.locale.as_deref())?;
    let store = load_model(config)?;

    let mut categories: Vec<LocalizedCategory> = store
        .list::<LocalizedCategory>()
        .map(|c| LocalizedCategory::clone(c))
        .collect();
    sort_localized(&mut categories, locale.as_ref())?;

    for category in &categories {
        println!(
            "{}\t{}\t{}",
            category.classification(locale.as_ref())?,
            category.name(locale.as_ref())?,
            category.description(locale.as_ref())?
        );
    }
    Ok(())
}
