//! `folio export` - write the site data consumed by the static build.
//!
//! Projects are grouped by category in rank order. Image keys are resolved
//! to delivery URLs for every configured variant, with the focal point
//! rendered as a CSS `object-position`. With `--warm`, every delivery URL
//! is fetched once afterwards (thumbnails first) so the CDN has them
//! cached before the site goes live.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::admin::services::images::ImageHostService;
use crate::admin::store::Catalog;
use crate::config::Config;
use crate::gallery::{HttpFetcher, Preloader, Priority};
use crate::model::{Category, ImageRecord, Project};
use crate::utils::{format_bytes, format_elapsed};

/// An image as the site templates use it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteImage {
    pub id: String,
    /// URL of the first configured variant.
    pub url: String,
    /// URL per variant name.
    pub variants: BTreeMap<String, String>,
    pub alt: String,
    /// CSS `object-position` derived from the focal point.
    pub object_position: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteProject {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub rank: i64,
    pub short_description: String,
    pub long_description: String,
    pub year: String,
    pub location: String,
    pub project_type: String,
    pub thumbnail: Option<SiteImage>,
    pub images: Vec<SiteImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub generated_at: DateTime<Utc>,
    pub account_hash: String,
    pub categories: BTreeMap<Category, Vec<SiteProject>>,
}

impl SiteData {
    /// Delivery URLs in preload priority: thumbnails, then each project's
    /// lead image, then the rest.
    #[must_use]
    pub fn preload_plan(&self) -> Vec<(String, Priority)> {
        let mut plan = Vec::new();
        for project in self.categories.values().flatten() {
            if let Some(thumb) = &project.thumbnail {
                plan.push((thumb.url.clone(), Priority::Visible));
            }
            for (i, image) in project.images.iter().enumerate() {
                let priority = if i == 0 {
                    Priority::NearViewport
                } else {
                    Priority::OnDemand
                };
                plan.push((image.url.clone(), priority));
            }
        }
        plan
    }
}

fn site_image(record: &ImageRecord, images: &ImageHostService) -> SiteImage {
    let variants = images
        .variants()
        .iter()
        .map(|v| (v.clone(), images.delivery_url(&record.cloudflare_id, v)))
        .collect();
    SiteImage {
        id: record.id.clone(),
        url: images.default_url(&record.cloudflare_id),
        variants,
        alt: record.alt.clone(),
        object_position: record.focal_point.object_position(),
        width: record.width,
        height: record.height,
    }
}

fn site_project(
    project: &Project,
    records: &HashMap<String, ImageRecord>,
    images: &ImageHostService,
) -> SiteProject {
    let resolve = |key: &str| match records.get(key) {
        Some(record) => Some(site_image(record, images)),
        None => {
            warn!(project = %project.title, image = key, "Dangling image reference, skipped");
            None
        },
    };
    SiteProject {
        id: project.id,
        slug: project.slug(),
        title: project.title.clone(),
        rank: project.rank,
        short_description: project.short_description.clone(),
        long_description: project.long_description.clone(),
        year: project.year.clone(),
        location: project.location.clone(),
        project_type: project.project_type.clone(),
        thumbnail: project.thumbnail.as_deref().and_then(resolve),
        images: project.images.iter().filter_map(|k| resolve(k)).collect(),
    }
}

/// Builds the site data from the catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub async fn build_site_data(catalog: &Catalog, images: &ImageHostService) -> Result<SiteData> {
    let records: HashMap<String, ImageRecord> = catalog
        .list_images()
        .await?
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect();

    let mut categories = BTreeMap::new();
    for category in Category::ALL {
        let projects = catalog.list_projects(Some(category)).await?;
        categories.insert(
            category,
            projects
                .iter()
                .map(|p| site_project(p, &records, images))
                .collect(),
        );
    }

    Ok(SiteData {
        generated_at: Utc::now(),
        account_hash: images.account_hash().to_string(),
        categories,
    })
}

/// Entry point of `folio export`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or the file cannot be
/// written.
pub async fn execute(config: Config, out: &Path, warm: bool) -> Result<()> {
    let started = Instant::now();
    let catalog = super::open_catalog(&config, false).await?;
    let images = config.image_service()?;

    let data = build_site_data(&catalog, &images).await?;
    let json = serde_json::to_string_pretty(&data).context("Failed to serialize site data")?;
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;

    let count: usize = data.categories.values().map(Vec::len).sum();
    println!(
        "Exported {count} projects to {} in {}",
        out.display(),
        format_elapsed(started.elapsed())
    );

    if warm {
        let preloader = Preloader::new(HttpFetcher::new(Duration::from_secs(30))?);
        for (url, priority) in data.preload_plan() {
            preloader.push(&url, priority);
        }
        let report = preloader.drain().await;
        println!(
            "Warmed {} URLs ({}), {} failed",
            report.loaded,
            format_bytes(report.bytes),
            report.failed
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FocalPoint, NewImage, ProjectDraft};

    async fn seeded() -> (Catalog, ImageHostService) {
        let catalog = Catalog::memory().await.unwrap();
        let images = ImageHostService::memory("hash")
            .with_variants(vec!["public".to_string(), "thumb".to_string()]);
        for (key, cf) in [("cedar-1", "cf-1"), ("cedar-2", "cf-2")] {
            catalog
                .save_image(
                    &NewImage {
                        id: Some(key.to_string()),
                        cloudflare_id: cf.to_string(),
                        focal_point: FocalPoint::new(0.25, 0.75),
                        alt: format!("alt {key}"),
                        ..Default::default()
                    },
                    "hash",
                )
                .await
                .unwrap();
        }
        for title in ["Cedar House", "Stone Barn"] {
            catalog
                .create_project(&ProjectDraft {
                    title: title.to_string(),
                    category: Category::Architecture,
                    thumbnail: Some("cedar-1".to_string()),
                    short_description: String::new(),
                    long_description: String::new(),
                    year: "2021".to_string(),
                    location: String::new(),
                    project_type: String::new(),
                    images: vec!["cedar-1".to_string(), "cedar-2".to_string()],
                })
                .await
                .unwrap();
        }
        (catalog, images)
    }

    #[tokio::test]
    async fn test_site_data_grouped_and_resolved() {
        let (catalog, images) = seeded().await;
        let data = build_site_data(&catalog, &images).await.unwrap();

        let arch = &data.categories[&Category::Architecture];
        assert_eq!(arch.len(), 2);
        assert_eq!(arch[0].slug, "cedar-house");
        assert_eq!(arch[1].rank, 1);
        assert!(data.categories[&Category::Photography].is_empty());

        let thumb = arch[0].thumbnail.as_ref().unwrap();
        assert_eq!(thumb.url, "https://imagedelivery.net/hash/cf-1/public");
        assert_eq!(thumb.variants["thumb"], "https://imagedelivery.net/hash/cf-1/thumb");
        assert_eq!(thumb.object_position, "25.0% 75.0%");
        assert_eq!(arch[0].images.len(), 2);
    }

    #[tokio::test]
    async fn test_preload_plan_priorities() {
        let (catalog, images) = seeded().await;
        let plan = build_site_data(&catalog, &images)
            .await
            .unwrap()
            .preload_plan();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan[0].1, Priority::Visible);
        assert_eq!(plan[1].1, Priority::NearViewport);
        assert_eq!(plan[2].1, Priority::OnDemand);
    }
}
