//! Prioritized, deduplicated image preloading with one fetch in flight.
//!
//! [`PreloadQueue`] is the bookkeeping: three FIFO lanes (visible, near the
//! viewport, on demand), dedupe by URL, priority upgrades, and a single
//! in-flight slot. [`Preloader`] drains a queue through a [`Fetcher`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::PRELOAD_MARGIN_PX;
use crate::geometry::Rect;

/// Fetch priority, lowest first so that `Ord` ranks `Visible` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    OnDemand,
    NearViewport,
    Visible,
}

impl Priority {
    const ALL_DESC: [Priority; 3] = [Priority::Visible, Priority::NearViewport, Priority::OnDemand];

    fn lane(self) -> usize {
        match self {
            Self::Visible => 0,
            Self::NearViewport => 1,
            Self::OnDemand => 2,
        }
    }
}

/// Priority for an element box relative to the viewport, or `None` if it
/// is farther than `margin` away.
#[must_use]
pub fn classify(rect: Rect, viewport: Rect, margin: f64) -> Option<Priority> {
    if rect.intersects(&viewport) {
        Some(Priority::Visible)
    } else if rect.intersects(&viewport.expand(margin)) {
        Some(Priority::NearViewport)
    } else {
        None
    }
}

/// One observed image element.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub url: String,
    pub rect: Rect,
}

#[derive(Debug, Default)]
pub struct PreloadQueue {
    lanes: [VecDeque<String>; 3],
    queued: HashMap<String, Priority>,
    in_flight: Option<String>,
    done: HashSet<String>,
    failed: HashSet<String>,
}

impl PreloadQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` at `priority`.
    ///
    /// A queued URL only moves up (to the back of the higher lane). URLs in
    /// flight or already loaded are ignored; failed URLs may be queued
    /// again. Returns true if the queue changed.
    pub fn push(&mut self, url: &str, priority: Priority) -> bool {
        if self.in_flight.as_deref() == Some(url) || self.done.contains(url) {
            return false;
        }
        if let Some(current) = self.queued.get(url).copied() {
            if current >= priority {
                return false;
            }
            self.lanes[current.lane()].retain(|u| u != url);
        }
        self.failed.remove(url);
        self.queued.insert(url.to_string(), priority);
        self.lanes[priority.lane()].push_back(url.to_string());
        true
    }

    /// Takes the next URL to fetch, or `None` while a fetch is in flight or
    /// the queue is empty.
    pub fn next(&mut self) -> Option<String> {
        if self.in_flight.is_some() {
            return None;
        }
        let url = Priority::ALL_DESC
            .iter()
            .find_map(|p| self.lanes[p.lane()].pop_front())?;
        self.queued.remove(&url);
        self.in_flight = Some(url.clone());
        Some(url)
    }

    /// Marks the in-flight fetch of `url` as loaded. Returns false if `url`
    /// was not in flight.
    pub fn complete(&mut self, url: &str) -> bool {
        if self.in_flight.as_deref() != Some(url) {
            return false;
        }
        self.in_flight = None;
        self.done.insert(url.to_string());
        true
    }

    /// Marks the in-flight fetch of `url` as failed.
    pub fn fail(&mut self, url: &str) -> bool {
        if self.in_flight.as_deref() != Some(url) {
            return false;
        }
        self.in_flight = None;
        self.failed.insert(url.to_string());
        true
    }

    /// Classifies each entry and queues the ones near enough. Returns how
    /// many changed the queue.
    pub fn observe(&mut self, entries: &[Observation], viewport: Rect, margin: f64) -> usize {
        entries
            .iter()
            .filter_map(|e| classify(e.rect, viewport, margin).map(|p| (e, p)))
            .filter(|(e, p)| self.push(&e.url, *p))
            .count()
    }

    /// [`PreloadQueue::observe`] with the standard [`PRELOAD_MARGIN_PX`] margin.
    pub fn observe_default(&mut self, entries: &[Observation], viewport: Rect) -> usize {
        self.observe(entries, viewport, PRELOAD_MARGIN_PX)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    #[must_use]
    pub fn priority_of(&self, url: &str) -> Option<Priority> {
        self.queued.get(url).copied()
    }

    #[must_use]
    pub fn is_done(&self, url: &str) -> bool {
        self.done.contains(url)
    }

    #[must_use]
    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }
}

/// Loads one URL, returning the number of bytes received.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> anyhow::Result<u64>;
}

/// [`Fetcher`] issuing plain GET requests.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<u64> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.len() as u64)
    }
}

/// Outcome of a [`Preloader::drain`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
    pub bytes: u64,
}

/// Drains a [`PreloadQueue`] one fetch at a time.
pub struct Preloader {
    queue: Mutex<PreloadQueue>,
    fetcher: Arc<dyn Fetcher>,
}

impl Preloader {
    pub fn new<F: Fetcher>(fetcher: F) -> Self {
        Self::shared(Arc::new(fetcher))
    }

    #[must_use]
    pub fn shared(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            queue: Mutex::new(PreloadQueue::new()),
            fetcher,
        }
    }

    pub fn push(&self, url: &str, priority: Priority) -> bool {
        self.queue.lock().push(url, priority)
    }

    pub fn observe(&self, entries: &[Observation], viewport: Rect, margin: f64) -> usize {
        self.queue.lock().observe(entries, viewport, margin)
    }

    pub fn observe_default(&self, entries: &[Observation], viewport: Rect) -> usize {
        self.queue.lock().observe_default(entries, viewport)
    }

    /// Runs `f` with the queue locked.
    pub fn with_queue<R>(&self, f: impl FnOnce(&mut PreloadQueue) -> R) -> R {
        f(&mut self.queue.lock())
    }

    /// Fetches queued URLs in priority order until the queue is empty.
    ///
    /// Returns immediately if another drain holds the in-flight slot.
    /// Failures are logged and counted, never retried here.
    pub async fn drain(&self) -> PreloadReport {
        let mut report = PreloadReport::default();
        loop {
            let next = self.queue.lock().next();
            let Some(url) = next else {
                break;
            };
            match self.fetcher.fetch(&url).await {
                Ok(bytes) => {
                    debug!(%url, bytes, "Preloaded");
                    self.queue.lock().complete(&url);
                    report.loaded += 1;
                    report.bytes += bytes;
                },
                Err(e) => {
                    warn!(%url, error = %e, "Preload failed");
                    self.queue.lock().fail(&url);
                    report.failed += 1;
                },
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_order(queue: &mut PreloadQueue) -> Vec<String> {
        let mut order = Vec::new();
        while let Some(url) = queue.next() {
            queue.complete(&url);
            order.push(url);
        }
        order
    }

    #[test]
    fn test_priority_then_fifo() {
        let mut q = PreloadQueue::new();
        q.push("a", Priority::OnDemand);
        q.push("b", Priority::NearViewport);
        q.push("c", Priority::Visible);
        q.push("d", Priority::NearViewport);
        q.push("e", Priority::Visible);
        assert_eq!(drain_order(&mut q), ["c", "e", "b", "d", "a"]);
    }

    #[test]
    fn test_dedupe_and_upgrade() {
        let mut q = PreloadQueue::new();
        assert!(q.push("a", Priority::NearViewport));
        assert!(q.push("b", Priority::NearViewport));
        assert!(!q.push("a", Priority::NearViewport));
        assert!(!q.push("a", Priority::OnDemand));
        assert_eq!(q.priority_of("a"), Some(Priority::NearViewport));

        assert!(q.push("b", Priority::Visible));
        assert_eq!(q.len(), 2);
        assert_eq!(drain_order(&mut q), ["b", "a"]);
    }

    #[test]
    fn test_single_flight() {
        let mut q = PreloadQueue::new();
        q.push("a", Priority::Visible);
        q.push("b", Priority::Visible);
        assert_eq!(q.next().as_deref(), Some("a"));
        assert_eq!(q.next(), None);
        assert!(!q.complete("b"));
        assert!(q.complete("a"));
        assert_eq!(q.next().as_deref(), Some("b"));
    }

    #[test]
    fn test_in_flight_and_done_not_requeued() {
        let mut q = PreloadQueue::new();
        q.push("a", Priority::OnDemand);
        let url = q.next().unwrap();
        assert!(!q.push("a", Priority::Visible));
        q.complete(&url);
        assert!(!q.push("a", Priority::Visible));
        assert!(q.is_done("a"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_failed_can_be_requeued() {
        let mut q = PreloadQueue::new();
        q.push("a", Priority::Visible);
        let url = q.next().unwrap();
        assert!(q.fail(&url));
        assert!(q.has_failed("a"));
        assert!(q.push("a", Priority::OnDemand));
        assert!(!q.has_failed("a"));
    }

    #[test]
    fn test_classify() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        assert_eq!(
            classify(Rect::new(10.0, 10.0, 100.0, 100.0), viewport, 200.0),
            Some(Priority::Visible)
        );
        assert_eq!(
            classify(Rect::new(10.0, 900.0, 100.0, 100.0), viewport, 200.0),
            Some(Priority::NearViewport)
        );
        assert_eq!(
            classify(Rect::new(10.0, 1000.0, 100.0, 100.0), viewport, 200.0),
            None
        );
    }

    #[test]
    fn test_observe() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let entries = vec![
            Observation {
                url: "far".into(),
                rect: Rect::new(0.0, 5000.0, 100.0, 100.0),
            },
            Observation {
                url: "near".into(),
                rect: Rect::new(0.0, 850.0, 100.0, 100.0),
            },
            Observation {
                url: "seen".into(),
                rect: Rect::new(0.0, 100.0, 100.0, 100.0),
            },
        ];
        let mut q = PreloadQueue::new();
        assert_eq!(q.observe(&entries, viewport, 200.0), 2);
        assert_eq!(q.observe(&entries, viewport, 200.0), 0);
        assert_eq!(drain_order(&mut q), ["seen", "near"]);
    }

    #[test]
    fn test_observe_default_margin() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let entries = vec![
            Observation {
                url: "inside".into(),
                rect: Rect::new(0.0, 950.0, 100.0, 100.0),
            },
            Observation {
                url: "outside".into(),
                rect: Rect::new(0.0, 1050.0, 100.0, 100.0),
            },
        ];
        let preloader = Preloader::new(Arc::new(ScriptedFetcher {
            calls: Mutex::new(Vec::new()),
        }));
        assert_eq!(preloader.observe_default(&entries, viewport), 1);
        assert_eq!(preloader.with_queue(|q| drain_order(q)), ["inside"]);
    }

    struct ScriptedFetcher {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for Arc<ScriptedFetcher> {
        async fn fetch(&self, url: &str) -> anyhow::Result<u64> {
            self.calls.lock().push(url.to_string());
            if url.contains("broken") {
                anyhow::bail!("404 Not Found");
            }
            Ok(url.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_preloader_drains_in_priority_order() {
        let fetcher = Arc::new(ScriptedFetcher {
            calls: Mutex::new(Vec::new()),
        });
        let preloader = Preloader::new(fetcher.clone());
        preloader.push("late", Priority::OnDemand);
        preloader.push("broken", Priority::NearViewport);
        preloader.push("first", Priority::Visible);

        let report = preloader.drain().await;
        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bytes, 9);
        assert_eq!(*fetcher.calls.lock(), ["first", "broken", "late"]);
        assert!(preloader.with_queue(|q| q.has_failed("broken")));
    }
}
