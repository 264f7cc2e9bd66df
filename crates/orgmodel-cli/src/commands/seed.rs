//! Seed import command
//!
//! Usage: orgmodel seed import <PATH>

use crate::commands::open_store;
use crate::config::AppConfig;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file into the database
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,
}

pub fn execute(args: SeedArgs, config: &AppConfig) -> anyhow::Result<()> {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args, config),
    }
}

fn execute_import(args: ImportArgs, config: &AppConfig) -> anyhow::Result<()> {
    let mut conn = open_store(config)?;

    let seed_files = if args.path.is_dir() {
        seed_files_in(&args.path)?
    } else {
        vec![args.path]
    };

    for seed_file in seed_files {
        println!("Importing {}...", seed_file.display());
        let digest = orgmodel_store::seed::import_seed(&seed_file, &mut conn)?;
        println!("Imported (digest: {})", digest);
    }
    Ok(())
}

/// YAML files directly inside `dir`, sorted by name
fn seed_files_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut seed_files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .collect();
    seed_files.sort();

    if seed_files.is_empty() {
        anyhow::bail!("No seed files found in {}", dir.display());
    }
    Ok(seed_files)
}
