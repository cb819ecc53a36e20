//! Shared constants for the admin service and the gallery engine.
//!
//! Gallery timings mirror the CSS transition durations of the site
//! stylesheet; changing one side without the other desynchronizes the
//! overlay from the page.

/// Default admin server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default admin server bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Name of the data directory under the user's home (`~/.folio`).
pub const DATA_DIR_NAME: &str = ".folio";

/// Default database file name inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "folio.db";

/// Default configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Per-request timeout applied to the admin router.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted upload body (the image host rejects files above 10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Image host delivery base URL.
pub const DELIVERY_BASE_URL: &str = "https://imagedelivery.net";

/// Image host REST API base URL.
pub const IMAGE_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Account hash reported by the in-memory image host.
pub const OFFLINE_ACCOUNT_HASH: &str = "offline";

/// Variant used when none is configured.
pub const DEFAULT_VARIANT: &str = "public";

/// Fixed pause between uploads while seeding.
pub const SEED_UPLOAD_DELAY_MS: u64 = 500;

/// Health status string returned by `/health`.
pub const HEALTH_STATUS_READY: &str = "ready";

// Gallery engine timings and thresholds

/// Duration of the scroll tween between two cards.
pub const SCROLL_DURATION_MS: u64 = 600;

/// Quiet period after the last wheel event before the burst is resolved.
pub const WHEEL_WINDOW_MS: u64 = 50;

/// Minimum accumulated wheel delta that counts as a navigation gesture.
pub const WHEEL_THRESHOLD: f64 = 10.0;

/// Minimum swipe distance in pixels.
pub const SWIPE_MIN_PX: f64 = 50.0;

/// Duration of the shared-element transition (matches `.project-detail` CSS).
pub const TRANSITION_DURATION_MS: u64 = 500;

/// Lookahead margin around the viewport for near-viewport preloading.
pub const PRELOAD_MARGIN_PX: f64 = 200.0;

/// Viewport width at and above which the desktop column layout is used.
pub const DESKTOP_BREAKPOINT_PX: f64 = 768.0;
