//! Typed client for the admin API.
//!
//! Besides wrapping each endpoint, the client mirrors the admin UI's local
//! checks: metadata for a fresh upload is refused before any request when
//! its key is blank or already taken by a known image. The set of known
//! keys is filled by [`AdminClient::refresh_known_ids`] and kept current by
//! the client's own saves and deletes.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::http::types::{
    ClientConfigResponse, DeleteResponse, ErrorResponse, ImageListResponse, ImageResponse,
    ProjectListResponse, ProjectResponse, ReorderRequest, UploadResponse, UploadedFile,
};
use crate::model::{Category, FocalPoint, ImageRecord, NewImage, Project, ProjectDraft};

/// Failures seen by admin client callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No key was given for the image.
    #[error("an image id is required")]
    MissingId,

    /// The key is already used by another image.
    #[error("image id '{0}' is already in use")]
    DuplicateId(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("server returned {status}: {error}")]
    Api {
        status: u16,
        error: String,
        details: Option<serde_json::Value>,
    },
}

/// Metadata the editor fills in after an upload.
#[derive(Debug, Clone, Default)]
pub struct ImageDetails {
    pub id: String,
    pub alt: String,
    pub focal_point: FocalPoint,
}

/// Client for the admin REST API.
pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
    known_ids: HashSet<String>,
}

impl AdminClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base: Url::parse(base_url)?,
            credentials: None,
            known_ids: HashSet::new(),
        })
    }

    /// Sends basic-auth credentials with every request.
    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Keys the client currently believes are taken.
    #[must_use]
    pub fn known_ids(&self) -> &HashSet<String> {
        &self.known_ids
    }

    /// Seeds the known-key set without a request, e.g. from a cached list.
    pub fn remember_ids<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.known_ids.extend(ids);
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    /// URL of one image; the key is always a single escaped path segment.
    fn image_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.url("/api/images")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let text = response.text().await.unwrap_or_default();
        let (error, details) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.error, body.details),
            Err(_) => (text, None),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            error,
            details,
        })
    }

    /// Returns true if the server answers its health check.
    pub async fn is_server_running(&self) -> bool {
        let Ok(url) = self.url("/health") else {
            return false;
        };
        self.http
            .get(url)
            .timeout(Duration::from_millis(500))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    /// Fetches the public client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn config(&self) -> Result<ClientConfigResponse, ClientError> {
        let response = self
            .request(reqwest::Method::GET, self.url("/api/config")?)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Lists images and replaces the known-key set with their keys.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn refresh_known_ids(&mut self) -> Result<Vec<ImageRecord>, ClientError> {
        let images = self.list_images().await?;
        self.known_ids = images.iter().map(|i| i.id.clone()).collect();
        debug!(count = self.known_ids.len(), "Known image ids refreshed");
        Ok(images)
    }

    /// Lists all images.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, self.url("/api/images")?)
            .send()
            .await?;
        let body: ImageListResponse = Self::decode(response).await?;
        Ok(body.images)
    }

    /// Fetches one image.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response (404 if
    /// missing).
    pub async fn get_image(&self, id: &str) -> Result<ImageRecord, ClientError> {
        let url = self.image_url(id)?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let body: ImageResponse = Self::decode(response).await?;
        Ok(body.image)
    }

    /// Uploads a file to the image host through the server.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn upload(&self, filename: &str, data: Bytes) -> Result<UploadedFile, ClientError> {
        let mime = mime_guess::from_path(filename).first_or_octet_stream();
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime.as_ref())?;
        let response = self
            .request(reqwest::Method::POST, self.url("/api/upload")?)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        let body: UploadResponse = Self::decode(response).await?;
        Ok(body.upload)
    }

    /// Saves metadata for a file just uploaded.
    ///
    /// The key is checked locally first: a blank key or one already in
    /// [`AdminClient::known_ids`] fails without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingId`] or [`ClientError::DuplicateId`]
    /// before any request, otherwise transport or API errors.
    pub async fn save_upload(
        &mut self,
        upload: &UploadedFile,
        details: &ImageDetails,
    ) -> Result<ImageRecord, ClientError> {
        let id = details.id.trim();
        if id.is_empty() {
            return Err(ClientError::MissingId);
        }
        if self.known_ids.contains(id) {
            return Err(ClientError::DuplicateId(id.to_string()));
        }

        let image = self
            .save_image(&NewImage {
                id: Some(id.to_string()),
                cloudflare_id: upload.cloudflare_id.clone(),
                focal_point: details.focal_point,
                alt: details.alt.clone(),
                filename: upload.filename.clone(),
                width: upload.width,
                height: upload.height,
            })
            .await?;
        Ok(image)
    }

    /// Saves (creates or edits) image metadata without local key checks.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn save_image(&mut self, image: &NewImage) -> Result<ImageRecord, ClientError> {
        let response = self
            .request(reqwest::Method::POST, self.url("/api/images")?)
            .json(image)
            .send()
            .await?;
        let body: ImageResponse = Self::decode(response).await?;
        self.known_ids.insert(body.image.id.clone());
        Ok(body.image)
    }

    /// Deletes an image (host first, then catalog, server side).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn delete_image(&mut self, id: &str) -> Result<(), ClientError> {
        let url = self.image_url(id)?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        let _: DeleteResponse = Self::decode(response).await?;
        self.known_ids.remove(id);
        Ok(())
    }

    /// Lists projects, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn list_projects(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Project>, ClientError> {
        let mut url = self.url("/api/projects")?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("category", category.as_str());
        }
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let body: ProjectListResponse = Self::decode(response).await?;
        Ok(body.projects)
    }

    /// Fetches one project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn get_project(&self, id: i64) -> Result<Project, ClientError> {
        let url = self.url(&format!("/api/projects/{id}"))?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let body: ProjectResponse = Self::decode(response).await?;
        Ok(body.project)
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ClientError> {
        let response = self
            .request(reqwest::Method::POST, self.url("/api/projects")?)
            .json(draft)
            .send()
            .await?;
        let body: ProjectResponse = Self::decode(response).await?;
        Ok(body.project)
    }

    /// Replaces a project's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn update_project(
        &self,
        id: i64,
        draft: &ProjectDraft,
    ) -> Result<Project, ClientError> {
        let url = self.url(&format!("/api/projects/{id}"))?;
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(draft)
            .send()
            .await?;
        let body: ProjectResponse = Self::decode(response).await?;
        Ok(body.project)
    }

    /// Deletes a project.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/api/projects/{id}"))?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        let _: DeleteResponse = Self::decode(response).await?;
        Ok(())
    }

    /// Submits a new display order for one category.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error response.
    pub async fn reorder_projects(
        &self,
        category: Category,
        order: Vec<i64>,
    ) -> Result<Vec<Project>, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, self.url("/api/projects/reorder")?)
            .json(&ReorderRequest { category, order })
            .send()
            .await?;
        let body: ProjectListResponse = Self::decode(response).await?;
        Ok(body.projects)
    }
}
