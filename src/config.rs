//! Configuration for the folio admin service.
//!
//! Settings come from a TOML file (`folio.toml` by default) and are then
//! overridden by environment variables:
//!
//! - [`Config`] - Root configuration struct
//! - [`ServerConfig`] - Bind address
//! - [`DatabaseConfig`] - SQLite file location
//! - [`ImagesConfig`] - Image host credentials and delivery variants
//! - [`AuthConfig`] - Admin basic-auth credentials
//!
//! Every section has defaults suitable for local development: no image host
//! credentials means the in-memory host, no admin credentials means an
//! open API. Both are reported as warnings by [`Config::validate`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::admin::http::auth::Credentials;
use crate::admin::services::images::{CloudflareCredentials, ImageHostService};
use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// folio.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub images: ImagesConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; `~/.folio/folio.db` when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub account_id: Option<String>,
    pub api_token: Option<String>,
    pub account_hash: Option<String>,
    /// Delivery variants; the first one is used for previews.
    pub variants: Vec<String>,
    /// API base override, mostly for proxies.
    pub api_base: Option<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            api_token: None,
            account_hash: None,
            variants: vec![constants::DEFAULT_VARIANT.to_string()],
            api_base: None,
        }
    }
}

impl ImagesConfig {
    /// Complete Cloudflare credentials, or `None` when any part is unset.
    #[must_use]
    pub fn credentials(&self) -> Option<CloudflareCredentials> {
        let account_id = non_empty(self.account_id.as_deref())?;
        let api_token = non_empty(self.api_token.as_deref())?;
        let account_hash = non_empty(self.account_hash.as_deref())?;
        let mut creds = CloudflareCredentials::new(account_id, api_token, account_hash);
        if let Some(base) = non_empty(self.api_base.as_deref()) {
            creds.api_base = base.to_string();
        }
        Some(creds)
    }

    fn configured_parts(&self) -> usize {
        [&self.account_id, &self.api_token, &self.account_hash]
            .iter()
            .filter(|v| non_empty(v.as_deref()).is_some())
            .count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Loads `path`, or `folio.toml` in the current directory if it exists,
    /// or defaults; then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if the
    /// chosen file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)?
                } else {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// Unparseable port values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FOLIO_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("FOLIO_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid FOLIO_PORT"),
            }
        }
        if let Some(path) = lookup("FOLIO_DATABASE") {
            self.database.path = Some(PathBuf::from(path));
        }
        let secrets = [
            ("CLOUDFLARE_ACCOUNT_ID", &mut self.images.account_id),
            ("CLOUDFLARE_API_TOKEN", &mut self.images.api_token),
            ("CLOUDFLARE_ACCOUNT_HASH", &mut self.images.account_hash),
            ("ADMIN_USERNAME", &mut self.auth.username),
            ("ADMIN_PASSWORD", &mut self.auth.password),
        ];
        for (key, slot) in secrets {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
    }

    /// Database file, defaulting to `~/.folio/folio.db`.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory
    /// cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home
            .join(constants::DATA_DIR_NAME)
            .join(constants::DEFAULT_DATABASE_FILE))
    }

    /// Address the admin server binds.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server.host: {}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Admin credentials, or `None` when authentication is disabled.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let username = non_empty(self.auth.username.as_deref())?;
        let password = self.auth.password.as_deref().filter(|p| !p.is_empty())?;
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Builds the image host service: Cloudflare when fully configured,
    /// the in-memory host otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the Cloudflare HTTP client cannot be built.
    pub fn image_service(&self) -> Result<ImageHostService> {
        let variants = self.images.variants.clone();
        match self.images.credentials() {
            Some(creds) => {
                debug!(account_hash = %creds.account_hash, "Using Cloudflare Images");
                ImageHostService::cloudflare(creds, variants)
                    .context("Failed to create image host client")
            },
            None => {
                warn!("Image host credentials not configured, uploads stay in memory");
                Ok(ImageHostService::memory(constants::OFFLINE_ACCOUNT_HASH)
                    .with_variants(variants))
            },
        }
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0 or a host that is not an IP address
    /// - Partially configured image host credentials
    /// - Blank variant names
    /// - A username without a password or the reverse
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Server
        if self.server.port == 0 {
            errors.push(
                "Server port cannot be 0. Use a valid port number (1-65535)\n  \
                 Common ports: 3000 (default), 8080, 8000"
                    .to_string(),
            );
        } else if self.server.port < 1024 {
            warnings.push(format!(
                "Server port {} is a system/privileged port (< 1024)\n  \
                 Recommendation: Use ports >= 1024 (e.g., 3000, 8080) to avoid permission issues",
                self.server.port
            ));
        }
        let host: Option<IpAddr> = self.server.host.parse().ok();
        if host.is_none() {
            errors.push(format!(
                "server.host must be an IP address (got: '{}')",
                self.server.host
            ));
        }

        // 2. Image host
        match self.images.configured_parts() {
            0 => warnings.push(
                "Image host credentials are not configured\n  \
                 Uploads will be kept in memory and lost on restart"
                    .to_string(),
            ),
            3 => {},
            _ => errors.push(
                "Image host credentials are incomplete\n  \
                 Set images.account_id, images.api_token and images.account_hash together"
                    .to_string(),
            ),
        }
        if self.images.variants.iter().any(|v| v.trim().is_empty()) {
            errors.push("images.variants cannot contain blank names".to_string());
        }
        if let Some(base) = non_empty(self.images.api_base.as_deref())
            && url::Url::parse(base).is_err()
        {
            errors.push(format!("images.api_base is not a valid URL: {base}"));
        }

        // 3. Authentication
        let has_user = non_empty(self.auth.username.as_deref()).is_some();
        let has_pass = self.auth.password.as_deref().is_some_and(|p| !p.is_empty());
        match (has_user, has_pass) {
            (true, true) => {},
            (false, false) => {
                let exposed = host.is_some_and(|ip| !ip.is_loopback());
                warnings.push(if exposed {
                    format!(
                        "Admin API is unauthenticated and bound to {}\n  \
                         Set auth.username and auth.password (or ADMIN_USERNAME/ADMIN_PASSWORD)",
                        self.server.host
                    )
                } else {
                    "Admin API is unauthenticated".to_string()
                });
            },
            _ => errors.push(
                "auth.username and auth.password must be set together".to_string(),
            ),
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Config {
        toml::from_str(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[images]
account_id = "acc"
api_token = "tok"
account_hash = "hash"
variants = ["public", "thumb"]

[auth]
username = "admin"
password = "pw"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, constants::DEFAULT_PORT);
        assert_eq!(config.server.host, constants::DEFAULT_HOST);
        assert_eq!(config.images.variants, vec!["public".to_string()]);
        assert!(config.credentials().is_none());
        assert!(config.images.credentials().is_none());
    }

    #[test]
    fn test_validate_complete_config() {
        let result = complete().validate().unwrap();
        assert!(!result.has_warnings(), "{:?}", result.warnings);
    }

    #[test]
    fn test_validate_defaults_warn() {
        let result = Config::default().validate().unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("Image host"));
        assert!(result.warnings[1].contains("unauthenticated"));
    }

    #[test]
    fn test_validate_exposed_without_auth() {
        let mut config = complete();
        config.server.host = "0.0.0.0".to_string();
        config.auth = AuthConfig::default();
        let result = config.validate().unwrap();
        assert!(result.warnings[0].contains("bound to 0.0.0.0"));
    }

    #[test]
    fn test_validate_errors() {
        let mut config = complete();
        config.server.port = 0;
        config.images.api_token = None;
        config.auth.password = None;
        config.images.variants.push("  ".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port cannot be 0"));
        assert!(err.contains("incomplete"));
        assert!(err.contains("blank names"));
        assert!(err.contains("set together"));
    }

    #[test]
    fn test_validate_bad_host() {
        let mut config = complete();
        config.server.host = "localhost".to_string();
        assert!(config.validate().is_err());
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FOLIO_PORT", "4100"),
            ("FOLIO_DATABASE", "/tmp/folio-test.db"),
            ("CLOUDFLARE_ACCOUNT_HASH", "override"),
            ("ADMIN_PASSWORD", "env-pw"),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.server.port, 4100);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/folio-test.db")
        );
        assert_eq!(config.images.account_hash.as_deref(), Some("override"));
        assert_eq!(config.credentials().unwrap().password, "env-pw");
        assert_eq!(config.socket_addr().unwrap().port(), 4100);
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = complete();
        config.apply_overrides(|key| (key == "FOLIO_PORT").then(|| "http".to_string()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_image_service_falls_back_to_memory() {
        let service = Config::default().image_service().unwrap();
        assert_eq!(service.account_hash(), constants::OFFLINE_ACCOUNT_HASH);
    }

    #[test]
    fn test_image_service_cloudflare() {
        let service = complete().image_service().unwrap();
        assert_eq!(service.account_hash(), "hash");
        assert_eq!(service.variants(), ["public", "thumb"]);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 3999").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 3999);
        assert!(Config::load_from(dir.path().join("missing.toml")).is_err());
    }
}
