//! Project record operations.

use anyhow::Context;
use std::collections::HashSet;

use super::{Catalog, StoreError, StoreResult};
use crate::admin::services::sql::{Row, Statement, Value};
use crate::model::{Category, Project, ProjectDraft};

const PROJECT_COLUMNS: &str = "id, title, category, thumbnail, short_description, \
     long_description, year, location, project_type, images, rank";

const NEXT_RANK: &str = "(SELECT COALESCE(MAX(rank) + 1, 0) FROM projects WHERE category = ?)";

fn project_from_row(row: &Row) -> anyhow::Result<Project> {
    let category = row.text("category")?;
    let images = row.text("images")?;
    Ok(Project {
        id: row.integer("id")?,
        title: row.text("title")?,
        category: category
            .parse::<Category>()
            .map_err(|e| anyhow::anyhow!(e))?,
        thumbnail: row.opt_text("thumbnail")?,
        short_description: row.text("short_description")?,
        long_description: row.text("long_description")?,
        year: row.text("year")?,
        location: row.text("location")?,
        project_type: row.text("project_type")?,
        images: serde_json::from_str(&images)
            .with_context(|| format!("Invalid images column: {images}"))?,
        rank: row.integer("rank")?,
    })
}

/// Column values shared by insert and update, in `PROJECT_COLUMNS` order
/// minus `id` and `rank`.
fn draft_params(draft: &ProjectDraft) -> anyhow::Result<Vec<Value>> {
    let images = serde_json::to_string(&draft.images).context("Failed to encode image list")?;
    Ok(vec![
        draft.title.trim().into(),
        draft.category.as_str().into(),
        draft
            .thumbnail
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .into(),
        draft.short_description.as_str().into(),
        draft.long_description.as_str().into(),
        draft.year.as_str().into(),
        draft.location.as_str().into(),
        draft.project_type.as_str().into(),
        images.into(),
    ])
}

impl Catalog {
    /// Lists projects ordered by category then rank, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_projects(&self, category: Option<Category>) -> StoreResult<Vec<Project>> {
        let rows = match category {
            Some(category) => {
                self.sql
                    .query(
                        &format!(
                            "SELECT {PROJECT_COLUMNS} FROM projects WHERE category = ? \
                             ORDER BY rank, id"
                        ),
                        &[category.as_str().into()],
                    )
                    .await?
            },
            None => {
                self.sql
                    .query(
                        &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY category, rank, id"),
                        &[],
                    )
                    .await?
            },
        };
        Ok(rows
            .iter()
            .map(project_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Fetches one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_project(&self, id: i64) -> StoreResult<Option<Project>> {
        let row = self
            .sql
            .query_one(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"),
                &[id.into()],
            )
            .await?;
        Ok(row.as_ref().map(project_from_row).transpose()?)
    }

    async fn validate_draft(&self, draft: &ProjectDraft) -> StoreResult<()> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::Validation("Project title is required".to_string()));
        }

        let mut keys: Vec<&str> = draft.images.iter().map(String::as_str).collect();
        if let Some(thumbnail) = draft.thumbnail.as_deref().map(str::trim)
            && !thumbnail.is_empty()
        {
            keys.push(thumbnail);
        }
        let missing = self.missing_images(&keys).await?;
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "Unknown image id(s): {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Creates a project at the end of its category.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for an empty title or unknown image
    /// keys, [`StoreError::Database`] if the write fails.
    pub async fn create_project(&self, draft: &ProjectDraft) -> StoreResult<Project> {
        self.validate_draft(draft).await?;

        let mut params = draft_params(draft)?;
        params.push(draft.category.as_str().into());
        let id = self
            .sql
            .insert(
                &format!(
                    "INSERT INTO projects (title, category, thumbnail, short_description, \
                     long_description, year, location, project_type, images, rank) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, {NEXT_RANK})"
                ),
                &params,
            )
            .await?;

        self.get_project(id)
            .await?
            .ok_or_else(|| StoreError::Database(anyhow::anyhow!("Project {id} vanished after insert")))
    }

    /// Replaces the editable fields of a project.
    ///
    /// The rank is kept when the category is unchanged; a project moved to
    /// the other category is appended at its end.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the project does not exist, and
    /// validation/database errors as for [`Catalog::create_project`].
    pub async fn update_project(&self, id: i64, draft: &ProjectDraft) -> StoreResult<Project> {
        let existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Project {id} not found")))?;
        self.validate_draft(draft).await?;

        let mut params = draft_params(draft)?;
        let rank_sql = if existing.category == draft.category {
            params.push(existing.rank.into());
            "?"
        } else {
            params.push(draft.category.as_str().into());
            NEXT_RANK
        };
        params.push(id.into());

        self.sql
            .execute(
                &format!(
                    "UPDATE projects SET title = ?, category = ?, thumbnail = ?, \
                     short_description = ?, long_description = ?, year = ?, location = ?, \
                     project_type = ?, images = ?, rank = {rank_sql} WHERE id = ?"
                ),
                &params,
            )
            .await?;

        self.get_project(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Project {id} not found")))
    }

    /// Deletes a project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the project does not exist.
    pub async fn delete_project(&self, id: i64) -> StoreResult<()> {
        let affected = self
            .sql
            .execute("DELETE FROM projects WHERE id = ?", &[id.into()])
            .await?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("Project {id} not found")));
        }
        Ok(())
    }

    /// Projects whose thumbnail or gallery lists the image `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn projects_using_image(&self, key: &str) -> StoreResult<Vec<Project>> {
        let projects = self.list_projects(None).await?;
        Ok(projects
            .into_iter()
            .filter(|p| p.referenced_images().contains(&key))
            .collect())
    }

    /// Assigns ranks `0..n-1` to the given projects in order, in one
    /// transaction. The list must name every project of `category` exactly
    /// once and nothing else; anything else is a validation error. Projects
    /// of the other category are not touched. Returns the category's projects in their new order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a bad order list,
    /// [`StoreError::Database`] if the transaction fails.
    pub async fn reorder_projects(
        &self,
        category: Category,
        order: &[i64],
    ) -> StoreResult<Vec<Project>> {
        let mut seen = HashSet::with_capacity(order.len());
        if let Some(dup) = order.iter().find(|id| !seen.insert(**id)) {
            return Err(StoreError::Validation(format!(
                "Project {dup} appears more than once"
            )));
        }

        let members: Vec<i64> = self
            .list_projects(Some(category))
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let foreign: Vec<String> = order
            .iter()
            .filter(|id| !members.contains(*id))
            .map(ToString::to_string)
            .collect();
        if !foreign.is_empty() {
            return Err(StoreError::Validation(format!(
                "Project(s) {} are not in category '{category}'",
                foreign.join(", ")
            )));
        }

        // Ranks must stay unique, so every member needs a new one.
        let missing: Vec<String> = members
            .iter()
            .filter(|id| !seen.contains(*id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "Order must list every project in '{category}'; missing {}",
                missing.join(", ")
            )));
        }

        let statements = order
            .iter()
            .zip(0i64..)
            .map(|(id, rank)| {
                Statement::new(
                    "UPDATE projects SET rank = ? WHERE id = ? AND category = ?",
                    vec![rank.into(), (*id).into(), category.as_str().into()],
                )
            })
            .collect();
        self.sql.transaction(statements).await?;

        self.list_projects(Some(category)).await
    }
}
