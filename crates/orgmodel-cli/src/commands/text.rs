//! Text lookup command
//!
//! Usage: orgmodel text get --suite <ID> [--locale <TAG>] [--classifier <C>] [--required]

use crate::commands::{load_model, parse_locale};
use crate::config::AppConfig;
use clap::{Args, Subcommand};
use orgmodel_core::model::{required_text, DEFAULT_CLASSIFIER};

#[derive(Debug, Args)]
pub struct TextArgs {
    #[command(subcommand)]
    pub command: TextCommand,
}

#[derive(Debug, Subcommand)]
pub enum TextCommand {
    /// Print one text of a text suite
    Get(GetArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Text suite identifier
    #[arg(long)]
    pub suite: String,

    /// Language tag such as sv-SE; defaults to the suite's standard locale
    #[arg(long)]
    pub locale: Option<String>,

    #[arg(long, default_value = DEFAULT_CLASSIFIER)]
    pub classifier: String,

    /// Fail when the text is missing instead of printing nothing
    #[arg(long)]
    pub required: bool,
}

pub fn execute(args: TextArgs, config: &AppConfig) -> anyhow::Result<()> {
    match args.command {
        TextCommand::Get(get_args) => execute_get(get_args, config),
    }
}

fn execute_get(args: GetArgs, config: &AppConfig) -> anyhow::Result<()> {
    let locale = parse_locale(args.locale.as_deref())?;
    let store = load_model(config)?;
    let suite = store
        .find_text_suite(&args.suite)
        .ok_or_else(|| anyhow::anyhow!("No text suite named {}", args.suite))?;

    if args.required {
        let text = required_text(suite, &args.suite, &args.classifier, locale.as_ref())?;
        println!("{}", text);
    } else if let Some(text) = suite.text(locale.as_ref(), Some(&args.classifier)) {
        println!("{}", text);
    } else {
        tracing::info!(suite = %args.suite, classifier = %args.classifier, "no text found");
    }
    Ok(())
}
