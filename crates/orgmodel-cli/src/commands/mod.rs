//! CLI subcommands

pub mod categories;
pub mod migrate;
pub mod seed;
pub mod text;

use crate::config::AppConfig;
use orgmodel_core::{Locale, Store};
use rusqlite::Connection;

/// Open the configured database with the schema brought up to date
pub(crate) fn open_store(config: &AppConfig) -> anyhow::Result<Connection> {
    let mut conn = orgmodel_store::db::open_configured(&config.store)?;
    orgmodel_store::migrations::apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Hydrate the whole model from the configured database
pub(crate) fn load_model(config: &AppConfig) -> anyhow::Result<Store> {
    let conn = open_store(config)?;
    Ok(orgmodel_store::repo::load_store(&conn)?)
}

pub(crate) fn parse_locale(tag: Option<&str>) -> anyhow::Result<Option<Locale>> {
    Ok(tag.map(Locale::from_language_tag).transpose()?)
}
