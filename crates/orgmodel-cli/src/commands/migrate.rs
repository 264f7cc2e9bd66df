//! Migrate command
//!
//! Usage: orgmodel migrate

use crate::config::AppConfig;

pub fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let mut conn = orgmodel_store::db::open_configured(&config.store)?;
    let applied = orgmodel_store::migrations::apply_migrations(&mut conn)?;

    if applied.is_empty() {
        println!("Schema is up to date");
    }
    for id in applied {
        println!("Applied {}", id);
    }
    Ok(())
}
