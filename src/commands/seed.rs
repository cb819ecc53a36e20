//! `folio seed` - one-time bulk import.
//!
//! Reads a TOML manifest listing image files and projects, uploads each
//! image to the image host, saves its record, then creates the projects.
//! Uploads are separated by a fixed delay. The first failure aborts the
//! run; records already written stay, and a rerun skips them.
//!
//! ```toml
//! [[images]]
//! file = "photos/cedar-01.jpg"
//! id = "cedar-house-1"          # defaults to the file name
//! alt = "Cedar House, south facade"
//! focal_point = { x = 0.4, y = 0.6 }
//!
//! [[projects]]
//! title = "Cedar House"
//! category = "architecture"
//! thumbnail = "cedar-house-1"
//! images = ["cedar-house-1"]
//! ```

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

use crate::admin::services::images::{ImageHostService, read_dimensions};
use crate::admin::store::Catalog;
use crate::config::Config;
use crate::model::{FocalPoint, NewImage, ProjectDraft};
use crate::utils::{format_bytes, format_elapsed, key_from_filename};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub images: Vec<ImageEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    /// Path relative to the manifest's directory.
    pub file: PathBuf,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub focal_point: FocalPoint,
}

impl ImageEntry {
    fn key(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| key_from_filename(&self.file))
    }
}

impl Manifest {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub uploaded: usize,
    pub skipped_images: usize,
    pub projects: usize,
    pub skipped_projects: usize,
    pub bytes: u64,
}

/// Imports `manifest`, resolving files against `base_dir`.
///
/// # Errors
///
/// Returns the first failure: unreadable file, unsupported image, image
/// host error, or catalog error.
pub async fn run(
    catalog: &Catalog,
    images: &ImageHostService,
    manifest: &Manifest,
    base_dir: &Path,
    delay: Duration,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for entry in &manifest.images {
        let key = entry
            .key()
            .with_context(|| format!("No usable id for {}", entry.file.display()))?;
        if catalog.get_image(&key).await?.is_some() {
            info!(%key, "Image already in catalog, skipping");
            report.skipped_images += 1;
            continue;
        }

        if report.uploaded > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let path = base_dir.join(&entry.file);
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let (width, height) = read_dimensions(&data)
            .with_context(|| format!("Not a supported image: {}", path.display()))?;
        let filename = entry
            .file
            .file_name()
            .map_or_else(|| key.clone(), |n| n.to_string_lossy().into_owned());
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        let size = data.len() as u64;

        let uploaded = images
            .upload(&filename, &content_type, Bytes::from(data))
            .await
            .with_context(|| format!("Upload failed for {}", path.display()))?;
        catalog
            .save_image(
                &NewImage {
                    id: Some(key.clone()),
                    cloudflare_id: uploaded.id.clone(),
                    focal_point: entry.focal_point,
                    alt: entry.alt.clone(),
                    filename,
                    width,
                    height,
                },
                images.account_hash(),
            )
            .await
            .with_context(|| {
                format!(
                    "Uploaded {} as {} but saving '{key}' failed",
                    path.display(),
                    uploaded.id
                )
            })?;

        info!(%key, cloudflare_id = %uploaded.id, size = %format_bytes(size), "Image seeded");
        report.uploaded += 1;
        report.bytes += size;
    }

    for draft in &manifest.projects {
        let existing = catalog.list_projects(Some(draft.category)).await?;
        if existing.iter().any(|p| p.title == draft.title.trim()) {
            info!(title = %draft.title, "Project already in catalog, skipping");
            report.skipped_projects += 1;
            continue;
        }
        let project = catalog
            .create_project(draft)
            .await
            .with_context(|| format!("Failed to create project '{}'", draft.title))?;
        info!(id = project.id, title = %project.title, rank = project.rank, "Project seeded");
        report.projects += 1;
    }

    Ok(report)
}

/// Entry point of `folio seed`.
///
/// # Errors
///
/// Returns an error if setup fails or the import aborts.
pub async fn execute(
    config: Config,
    manifest_path: &Path,
    delay: Duration,
    ephemeral: bool,
) -> Result<()> {
    let started = Instant::now();
    let manifest = Manifest::load(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let catalog = super::open_catalog(&config, ephemeral).await?;
    let images = config.image_service()?;

    let report = run(&catalog, &images, &manifest, base_dir, delay).await?;
    println!(
        "Seeded {} images ({}), {} projects in {}",
        report.uploaded,
        format_bytes(report.bytes),
        report.projects,
        format_elapsed(started.elapsed())
    );
    if report.skipped_images + report.skipped_projects > 0 {
        println!(
            "Skipped {} images and {} projects already present",
            report.skipped_images, report.skipped_projects
        );
    }
    Ok(())
}
