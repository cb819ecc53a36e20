//! Shared test host for integration tests.
//!
//! Starts the admin router on an ephemeral port over an in-memory catalog
//! and an in-memory image host, and keeps handles on both so tests can
//! inspect state or inject image host failures.

#![allow(dead_code)]

use anyhow::Result;
use folio::admin::client::AdminClient;
use folio::admin::http::{self, AppState, auth::Credentials};
use folio::admin::services::images::{ImageHostService, MemoryImageHost};
use folio::admin::store::Catalog;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const ACCOUNT_HASH: &str = "test-hash";
pub const USERNAME: &str = "editor";
pub const PASSWORD: &str = "correct horse";

pub struct TestHostBuilder {
    credentials: Option<Credentials>,
    variants: Vec<String>,
}

impl TestHostBuilder {
    /// Requires basic auth with [`USERNAME`]/[`PASSWORD`].
    pub fn with_auth(mut self) -> Self {
        self.credentials = Some(Credentials {
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
        });
        self
    }

    pub fn with_variants(mut self, variants: &[&str]) -> Self {
        self.variants = variants.iter().map(|v| (*v).to_string()).collect();
        self
    }

    pub async fn start(self) -> Result<TestHost> {
        let catalog = Catalog::memory().await?;
        let images = Arc::new(MemoryImageHost::new(ACCOUNT_HASH));
        let service = ImageHostService::shared(images.clone()).with_variants(self.variants);

        let state = AppState::new(catalog.clone(), service)
            .with_credentials(self.credentials)
            .shared();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = http::router(state).into_make_service_with_connect_info::<SocketAddr>();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(TestHost {
            addr,
            http: reqwest::Client::new(),
            catalog,
            images,
            server,
        })
    }
}

pub struct TestHost {
    addr: SocketAddr,
    http: reqwest::Client,
    pub catalog: Catalog,
    pub images: Arc<MemoryImageHost>,
    server: JoinHandle<()>,
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl TestHost {
    pub fn builder() -> TestHostBuilder {
        TestHostBuilder {
            credentials: None,
            variants: Vec::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Admin client pointed at this host (without credentials).
    pub fn client(&self) -> AdminClient {
        AdminClient::new(&self.url("/")).expect("valid base URL")
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.http.get(self.url(path)).send().await
    }

    pub async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.http.delete(self.url(path)).send().await
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Result<reqwest::Response> {
        self.http.post(self.url(path)).json(body).send().await
    }

    pub async fn put_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Result<reqwest::Response> {
        self.http.put(self.url(path)).json(body).send().await
    }

    /// Stores an asset on the image host and returns its host id, as the
    /// upload endpoint would.
    pub async fn upload_asset(&self, filename: &str) -> String {
        use folio::admin::services::images::ImageHost;
        self.images
            .upload(filename, "image/png", bytes::Bytes::from(png(8, 6)))
            .await
            .expect("memory upload")
            .id
    }

    /// Uploads an asset and saves its record under `key`.
    pub async fn seed_image(&self, key: &str) -> String {
        let cloudflare_id = self.upload_asset(&format!("{key}.png")).await;
        let resp = self
            .post_json(
                "/api/images",
                &serde_json::json!({
                    "id": key,
                    "cloudflare_id": cloudflare_id,
                    "alt": format!("{key} alt"),
                    "width": 8,
                    "height": 6,
                }),
            )
            .await
            .expect("save image");
        assert_eq!(resp.status(), 201, "seeding {key}");
        cloudflare_id
    }

    /// Creates a project and returns its id.
    pub async fn seed_project(&self, title: &str, category: &str, images: &[&str]) -> i64 {
        let resp = self
            .post_json(
                "/api/projects",
                &serde_json::json!({
                    "title": title,
                    "category": category,
                    "thumbnail": images.first(),
                    "images": images,
                }),
            )
            .await
            .expect("create project");
        assert_eq!(resp.status(), 201, "seeding {title}");
        let body: serde_json::Value = resp.json().await.expect("json body");
        body["project"]["id"].as_i64().expect("project id")
    }
}

/// A small black PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
