//! Image record operations.

use anyhow::Context;
use chrono::{DateTime, Utc};

use super::{Catalog, StoreError, StoreResult};
use crate::admin::services::sql::{Row, Value};
use crate::model::{FocalPoint, ImageRecord, NewImage};

const IMAGE_COLUMNS: &str =
    "id, cloudflare_id, account_hash, focal_x, focal_y, alt, filename, width, height, uploaded_at";

fn image_from_row(row: &Row) -> anyhow::Result<ImageRecord> {
    let uploaded_at = row.text("uploaded_at")?;
    let uploaded_at = DateTime::parse_from_rfc3339(&uploaded_at)
        .with_context(|| format!("Invalid uploaded_at timestamp: {uploaded_at}"))?
        .with_timezone(&Utc);

    Ok(ImageRecord {
        id: row.text("id")?,
        cloudflare_id: row.text("cloudflare_id")?,
        account_hash: row.text("account_hash")?,
        focal_point: FocalPoint::new(
            row.real("focal_x")?.unwrap_or(0.5),
            row.real("focal_y")?.unwrap_or(0.5),
        ),
        alt: row.text("alt")?,
        filename: row.text("filename")?,
        width: u32::try_from(row.integer("width")?).unwrap_or(0),
        height: u32::try_from(row.integer("height")?).unwrap_or(0),
        uploaded_at,
    })
}

impl Catalog {
    /// Lists all images, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_images(&self) -> StoreResult<Vec<ImageRecord>> {
        let rows = self
            .sql
            .query(
                &format!("SELECT {IMAGE_COLUMNS} FROM images ORDER BY uploaded_at DESC, id"),
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(image_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Fetches one image by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_image(&self, id: &str) -> StoreResult<Option<ImageRecord>> {
        let row = self
            .sql
            .query_one(
                &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"),
                &[id.into()],
            )
            .await?;
        Ok(row.as_ref().map(image_from_row).transpose()?)
    }

    /// Saves image metadata with upsert semantics.
    ///
    /// A key already bound to a different host image is a duplicate and is
    /// rejected; the same key and host image is a metadata edit that keeps
    /// the original upload timestamp. Returns the stored record and whether
    /// it was newly created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a missing/duplicate key or a
    /// missing host id, [`StoreError::Database`] if the write fails.
    pub async fn save_image(
        &self,
        image: &NewImage,
        account_hash: &str,
    ) -> StoreResult<(ImageRecord, bool)> {
        let key = image
            .key()
            .ok_or_else(|| StoreError::Validation("Image id is required".to_string()))?;
        let cloudflare_id = image.cloudflare_id.trim();
        if cloudflare_id.is_empty() {
            return Err(StoreError::Validation(
                "cloudflare_id is required".to_string(),
            ));
        }

        let inserted = self
            .sql
            .execute(
                "INSERT INTO images (id, cloudflare_id, account_hash, focal_x, focal_y, alt, \
                 filename, width, height, uploaded_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO NOTHING",
                &[
                    key.into(),
                    cloudflare_id.into(),
                    account_hash.into(),
                    image.focal_point.x().into(),
                    image.focal_point.y().into(),
                    image.alt.as_str().into(),
                    image.filename.as_str().into(),
                    image.width.into(),
                    image.height.into(),
                    Value::Text(Utc::now().to_rfc3339()),
                ],
            )
            .await?;
        let created = inserted == 1;

        if !created {
            // Only the row that owns this host id may be edited.
            let updated = self
                .sql
                .execute(
                    "UPDATE images SET focal_x = ?, focal_y = ?, alt = ?, filename = ?, \
                     width = ?, height = ? WHERE id = ? AND cloudflare_id = ?",
                    &[
                        image.focal_point.x().into(),
                        image.focal_point.y().into(),
                        image.alt.as_str().into(),
                        image.filename.as_str().into(),
                        image.width.into(),
                        image.height.into(),
                        key.into(),
                        cloudflare_id.into(),
                    ],
                )
                .await?;
            if updated == 0 {
                return Err(StoreError::Validation(format!(
                    "Image id '{key}' is already used by another image"
                )));
            }
        }

        let stored = self
            .get_image(key)
            .await?
            .ok_or_else(|| StoreError::Database(anyhow::anyhow!("Image '{key}' vanished after save")))?;
        Ok((stored, created))
    }

    /// Removes an image record. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_image(&self, id: &str) -> StoreResult<bool> {
        let affected = self
            .sql
            .execute("DELETE FROM images WHERE id = ?", &[id.into()])
            .await?;
        Ok(affected > 0)
    }

    /// Returns the keys from `keys` that have no image record.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup fails.
    pub async fn missing_images(&self, keys: &[&str]) -> StoreResult<Vec<String>> {
        let mut missing = Vec::new();
        for key in keys {
            if self.get_image(key).await?.is_none() {
                missing.push((*key).to_string());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_image(id: &str, cloudflare_id: &str) -> NewImage {
        NewImage {
            id: Some(id.to_string()),
            cloudflare_id: cloudflare_id.to_string(),
            focal_point: FocalPoint::new(0.3, 0.6),
            alt: "Cedar facade".to_string(),
            filename: "cedar.jpg".to_string(),
            width: 1600,
            height: 1067,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let catalog = Catalog::memory().await.unwrap();
        let (saved, created) = catalog
            .save_image(&new_image("cedar-1", "cf-1"), "hash")
            .await
            .unwrap();
        assert!(created);
        assert_eq!(saved.account_hash, "hash");
        assert_eq!(saved.focal_point, FocalPoint::new(0.3, 0.6));

        let fetched = catalog.get_image("cedar-1").await.unwrap().unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_edit_keeps_upload_time() {
        let catalog = Catalog::memory().await.unwrap();
        let (first, _) = catalog
            .save_image(&new_image("cedar-1", "cf-1"), "hash")
            .await
            .unwrap();

        let mut edit = new_image("cedar-1", "cf-1");
        edit.alt = "New alt".to_string();
        let (second, created) = catalog.save_image(&edit, "hash").await.unwrap();
        assert!(!created);
        assert_eq!(second.alt, "New alt");
        assert_eq!(second.uploaded_at, first.uploaded_at);
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let catalog = Catalog::memory().await.unwrap();
        catalog
            .save_image(&new_image("cedar-1", "cf-1"), "hash")
            .await
            .unwrap();
        let err = catalog
            .save_image(&new_image("cedar-1", "cf-2"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let kept = catalog.get_image("cedar-1").await.unwrap().unwrap();
        assert_eq!(kept.cloudflare_id, "cf-1");
    }

    #[tokio::test]
    async fn test_concurrent_first_saves_claim_key_once() {
        let catalog = Catalog::memory().await.unwrap();
        let img_a = new_image("cedar-1", "cf-a");
        let img_b = new_image("cedar-1", "cf-b");
        let (a, b) = tokio::join!(
            catalog.save_image(&img_a, "hash"),
            catalog.save_image(&img_b, "hash"),
        );
        let (winner, loser) = match (a, b) {
            (Ok(saved), Err(err)) | (Err(err), Ok(saved)) => (saved, err),
            (a, b) => panic!("expected one save to win, got {a:?} and {b:?}"),
        };
        assert!(winner.1);
        assert!(matches!(loser, StoreError::Validation(_)));

        let stored = catalog.get_image("cedar-1").await.unwrap().unwrap();
        assert_eq!(stored.cloudflare_id, winner.0.cloudflare_id);
    }

    #[tokio::test]
    async fn test_missing_key_rejected() {
        let catalog = Catalog::memory().await.unwrap();
        let mut image = new_image("x", "cf-1");
        image.id = None;
        let err = catalog.save_image(&image, "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let catalog = Catalog::memory().await.unwrap();
        catalog
            .save_image(&new_image("a", "cf-a"), "hash")
            .await
            .unwrap();
        assert_eq!(catalog.missing_images(&["a", "b"]).await.unwrap(), vec!["b"]);
        assert!(catalog.delete_image("a").await.unwrap());
        assert!(!catalog.delete_image("a").await.unwrap());
    }
}
