//! CLI command implementations for folio.
//!
//! Each submodule implements one command of the `folio` binary:
//!
//! - [`serve`] - Admin API server
//! - [`seed`] - One-time bulk import from a manifest
//! - [`export`] - Site data for the static build
//! - [`config_cmd`] - Configuration validation

pub mod config_cmd;
pub mod export;
pub mod seed;
pub mod serve;

use anyhow::{Context, Result};
use tracing::info;

use crate::admin::services::sql::SqlService;
use crate::admin::store::Catalog;
use crate::config::Config;

/// Opens the catalog at the configured database path, or in memory when
/// `ephemeral` is set.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn open_catalog(config: &Config, ephemeral: bool) -> Result<Catalog> {
    let sql = if ephemeral {
        info!("Using in-memory database");
        SqlService::memory()?
    } else {
        let path = config.database_path()?;
        info!(path = %path.display(), "Opening database");
        SqlService::file(&path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?
    };
    Catalog::open(sql).await
}
