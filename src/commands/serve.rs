//! `folio serve` - run the admin API.

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

use crate::admin::http::{self, AppState};
use crate::config::Config;

/// Installs the global Prometheus recorder.
///
/// Returns `None` (and logs) if a recorder is already installed.
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics recorder not installed, /metrics disabled");
            None
        },
    }
}

/// Validates configuration, opens the catalog and image host, and serves
/// until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database or image
/// host cannot be set up, or the server fails.
pub async fn execute(config: Config, ephemeral: bool, metrics: bool) -> Result<()> {
    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let addr = config.socket_addr()?;
    let catalog = super::open_catalog(&config, ephemeral).await?;
    let images = config.image_service()?;
    let metrics = if metrics { install_metrics() } else { None };

    let state = AppState::new(catalog, images)
        .with_credentials(config.credentials())
        .with_metrics(metrics)
        .shared();

    http::serve(state, addr).await
}
