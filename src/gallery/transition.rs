//! Shared-element (FLIP) transition between a grid card and the detail
//! view.
//!
//! [`TransitionState`] is the state machine, with transitions as pure
//! functions returning the next state. [`TransitionController`] drives it
//! against a [`PageState`], taking a [`PageSnapshot`] on open and putting
//! it back verbatim once the close animation has finished.
//!
//! An `open` while a transition is running or the detail view is already
//! shown is rejected, as is a `close` while the view is not fully open.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::easing::{ease_out_cubic, lerp, progress};
use super::layout::{GalleryLayout, StripState};
use crate::constants::TRANSITION_DURATION_MS;
use crate::geometry::Rect;

/// Page class set while the detail view is shown.
pub const DETAIL_OPEN_CLASS: &str = "detail-open";

/// Page class set while the overlay is animating.
pub const TRANSITIONING_CLASS: &str = "is-transitioning";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// A transition is already animating.
    #[error("a transition is already running")]
    Busy,
    #[error("the detail view is already open")]
    AlreadyOpen,
    #[error("the detail view is not open")]
    NotOpen,
}

/// Translate + scale applied to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlipTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl FlipTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Inverted transform making a box laid out at `last` appear at `first`.
    ///
    /// A degenerate `last` box keeps a scale of 1 on that axis.
    #[must_use]
    pub fn between(first: Rect, last: Rect) -> Self {
        let ratio = |a: f64, b: f64| if b > 0.0 { a / b } else { 1.0 };
        Self {
            translate_x: first.x - last.x,
            translate_y: first.y - last.y,
            scale_x: ratio(first.width, last.width),
            scale_y: ratio(first.height, last.height),
        }
    }

    /// Transform at `progress` of the play phase: the inverted transform at
    /// 0, identity at 1, eased in between.
    #[must_use]
    pub fn at(&self, progress: f64) -> Self {
        let t = ease_out_cubic(progress);
        Self {
            translate_x: lerp(self.translate_x, 0.0, t),
            translate_y: lerp(self.translate_y, 0.0, t),
            scale_x: lerp(self.scale_x, 1.0, t),
            scale_y: lerp(self.scale_y, 1.0, t),
        }
    }

    /// Box this transform produces when applied to `base` with a top-left
    /// transform origin.
    #[must_use]
    pub fn apply(&self, base: Rect) -> Rect {
        Rect::new(
            base.x + self.translate_x,
            base.y + self.translate_y,
            base.width * self.scale_x,
            base.height * self.scale_y,
        )
    }
}

impl fmt::Display for FlipTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({}, {})",
            self.translate_x, self.translate_y, self.scale_x, self.scale_y
        )
    }
}

/// Geometry of one open/close cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
    /// Card whose detail view is shown.
    pub card: String,
    /// Box of the grid thumbnail.
    pub source: Rect,
    /// Box of the detail image.
    pub target: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionState {
    Closed,
    Opening { handoff: Handoff, started: Duration },
    Open { handoff: Handoff },
    Closing { handoff: Handoff, started: Duration },
}

impl TransitionState {
    /// `Closed` → `Opening`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while animating,
    /// [`TransitionError::AlreadyOpen`] when open.
    pub fn open(&self, handoff: Handoff, now: Duration) -> Result<Self, TransitionError> {
        match self {
            Self::Closed => Ok(Self::Opening {
                handoff,
                started: now,
            }),
            Self::Opening { .. } | Self::Closing { .. } => Err(TransitionError::Busy),
            Self::Open { .. } => Err(TransitionError::AlreadyOpen),
        }
    }

    /// `Open` → `Closing`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while animating,
    /// [`TransitionError::NotOpen`] when closed.
    pub fn close(&self, now: Duration) -> Result<Self, TransitionError> {
        match self {
            Self::Open { handoff } => Ok(Self::Closing {
                handoff: handoff.clone(),
                started: now,
            }),
            Self::Opening { .. } | Self::Closing { .. } => Err(TransitionError::Busy),
            Self::Closed => Err(TransitionError::NotOpen),
        }
    }

    /// Ends `Opening`/`Closing` once `duration` has elapsed; other states
    /// are returned unchanged.
    #[must_use]
    pub fn tick(&self, now: Duration, duration: Duration) -> Self {
        match self {
            Self::Opening { handoff, started } if now.saturating_sub(*started) >= duration => {
                Self::Open {
                    handoff: handoff.clone(),
                }
            },
            Self::Closing { started, .. } if now.saturating_sub(*started) >= duration => {
                Self::Closed
            },
            other => other.clone(),
        }
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Opening { .. } | Self::Closing { .. })
    }

    #[must_use]
    pub fn handoff(&self) -> Option<&Handoff> {
        match self {
            Self::Closed => None,
            Self::Opening { handoff, .. }
            | Self::Open { handoff }
            | Self::Closing { handoff, .. } => Some(handoff),
        }
    }

    /// Overlay to render at `now`; only exists while animating.
    ///
    /// Opening lays the clone out at the detail box and plays from the
    /// thumbnail box; closing does the reverse.
    #[must_use]
    pub fn overlay(&self, now: Duration, duration: Duration) -> Option<Overlay> {
        let (handoff, started, first, last) = match self {
            Self::Opening { handoff, started } => {
                (handoff, *started, handoff.source, handoff.target)
            },
            Self::Closing { handoff, started } => {
                (handoff, *started, handoff.target, handoff.source)
            },
            Self::Closed | Self::Open { .. } => return None,
        };
        let transform = FlipTransform::between(first, last).at(progress(started, now, duration));
        Some(Overlay {
            card: handoff.card.clone(),
            base: last,
            transform,
        })
    }
}

/// The fixed-position clone of the source element.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub card: String,
    /// Box the clone is laid out at.
    pub base: Rect,
    pub transform: FlipTransform,
}

impl Overlay {
    /// Where the clone currently appears on screen.
    #[must_use]
    pub fn visual_rect(&self) -> Rect {
        self.transform.apply(self.base)
    }
}

/// View state of the page that an open/close cycle must not disturb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub strips: Vec<StripState>,
    pub body_scroll_locked: bool,
    pub active_card: Option<String>,
    pub classes: BTreeSet<String>,
}

/// Mutable page state the controller works on.
#[derive(Debug, Clone)]
pub struct PageState {
    pub layout: GalleryLayout,
    pub body_scroll_locked: bool,
    pub active_card: Option<String>,
    pub classes: BTreeSet<String>,
}

impl PageState {
    #[must_use]
    pub fn new(layout: GalleryLayout) -> Self {
        Self {
            layout,
            body_scroll_locked: false,
            active_card: None,
            classes: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            strips: self.layout.scroll_state(),
            body_scroll_locked: self.body_scroll_locked,
            active_card: self.active_card.clone(),
            classes: self.classes.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &PageSnapshot) {
        self.layout.restore(&snapshot.strips);
        self.body_scroll_locked = snapshot.body_scroll_locked;
        self.active_card.clone_from(&snapshot.active_card);
        self.classes.clone_from(&snapshot.classes);
    }
}

/// Drives [`TransitionState`] against a page.
#[derive(Debug)]
pub struct TransitionController {
    state: TransitionState,
    duration: Duration,
    snapshot: Option<PageSnapshot>,
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(Duration::from_millis(TRANSITION_DURATION_MS))
    }
}

impl TransitionController {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            state: TransitionState::Closed,
            duration,
            snapshot: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// Snapshot taken by the current open, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<&PageSnapshot> {
        self.snapshot.as_ref()
    }

    /// Starts opening the detail view for `card`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the view is closed; the page is untouched
    /// in that case.
    pub fn open(
        &mut self,
        page: &mut PageState,
        card: &str,
        source: Rect,
        target: Rect,
        now: Duration,
    ) -> Result<(), TransitionError> {
        let handoff = Handoff {
            card: card.to_string(),
            source,
            target,
        };
        self.state = self.state.open(handoff, now)?;
        self.snapshot = Some(page.snapshot());

        page.body_scroll_locked = true;
        page.active_card = Some(card.to_string());
        page.classes.insert(DETAIL_OPEN_CLASS.to_string());
        page.classes.insert(TRANSITIONING_CLASS.to_string());
        debug!(card, "Detail view opening");
        Ok(())
    }

    /// Starts closing the detail view.
    ///
    /// # Errors
    ///
    /// Returns an error unless the view is fully open.
    pub fn close(&mut self, page: &mut PageState, now: Duration) -> Result<(), TransitionError> {
        self.state = self.state.close(now)?;
        page.classes.remove(DETAIL_OPEN_CLASS);
        page.classes.insert(TRANSITIONING_CLASS.to_string());
        debug!("Detail view closing");
        Ok(())
    }

    /// Advances the animation; returns the overlay to render, if any.
    ///
    /// When a close finishes the page is restored from the open snapshot.
    pub fn tick(&mut self, page: &mut PageState, now: Duration) -> Option<Overlay> {
        let next = self.state.tick(now, self.duration);
        match (&self.state, &next) {
            (TransitionState::Opening { .. }, TransitionState::Open { .. }) => {
                page.classes.remove(TRANSITIONING_CLASS);
                debug!("Detail view open");
            },
            (TransitionState::Closing { .. }, TransitionState::Closed) => {
                if let Some(snapshot) = self.snapshot.take() {
                    page.restore(&snapshot);
                }
                debug!("Detail view closed");
            },
            _ => {},
        }
        self.state = next;
        self.state.overlay(now, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    const THUMB: Rect = Rect::new(100.0, 300.0, 200.0, 150.0);
    const DETAIL: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn handoff() -> Handoff {
        Handoff {
            card: "cedar-house".to_string(),
            source: THUMB,
            target: DETAIL,
        }
    }

    #[test]
    fn test_flip_between() {
        let t = FlipTransform::between(THUMB, DETAIL);
        assert_eq!(t.translate_x, 100.0);
        assert_eq!(t.translate_y, 300.0);
        assert_eq!(t.scale_x, 0.25);
        assert_eq!(t.scale_y, 0.25);
        assert_eq!(t.apply(DETAIL), THUMB);
        assert_eq!(t.at(0.0), t);
        assert_eq!(t.at(1.0), FlipTransform::IDENTITY);
        assert_eq!(
            t.to_string(),
            "translate(100px, 300px) scale(0.25, 0.25)"
        );
    }

    #[test]
    fn test_flip_degenerate_target() {
        let t = FlipTransform::between(THUMB, Rect::new(0.0, 0.0, 0.0, 10.0));
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 15.0);
    }

    #[test]
    fn test_state_cycle() {
        let d = ms(500);
        let s = TransitionState::Closed.open(handoff(), ms(0)).unwrap();
        assert!(s.is_animating());
        assert_eq!(s.tick(ms(499), d), s);
        let s = s.tick(ms(500), d);
        assert!(matches!(s, TransitionState::Open { .. }));

        let s = s.close(ms(1000)).unwrap();
        assert!(matches!(s, TransitionState::Closing { .. }));
        assert_eq!(s.tick(ms(1500), d), TransitionState::Closed);
    }

    #[test]
    fn test_rejected_transitions() {
        let opening = TransitionState::Closed.open(handoff(), ms(0)).unwrap();
        assert_eq!(
            opening.open(handoff(), ms(10)),
            Err(TransitionError::Busy)
        );
        assert_eq!(opening.close(ms(10)), Err(TransitionError::Busy));

        let open = opening.tick(ms(500), ms(500));
        assert_eq!(
            open.open(handoff(), ms(600)),
            Err(TransitionError::AlreadyOpen)
        );

        let closing = open.close(ms(700)).unwrap();
        assert_eq!(
            closing.open(handoff(), ms(710)),
            Err(TransitionError::Busy)
        );
        assert_eq!(
            TransitionState::Closed.close(ms(0)),
            Err(TransitionError::NotOpen)
        );
    }

    #[test]
    fn test_overlay_only_while_animating() {
        let d = ms(500);
        assert!(TransitionState::Closed.overlay(ms(0), d).is_none());

        let opening = TransitionState::Closed.open(handoff(), ms(0)).unwrap();
        let start = opening.overlay(ms(0), d).unwrap();
        assert_eq!(start.visual_rect(), THUMB);
        assert_eq!(opening.overlay(ms(500), d).unwrap().visual_rect(), DETAIL);

        let open = opening.tick(ms(500), d);
        assert!(open.overlay(ms(600), d).is_none());

        let closing = open.close(ms(1000)).unwrap();
        assert_eq!(closing.overlay(ms(1000), d).unwrap().visual_rect(), DETAIL);
        assert_eq!(closing.overlay(ms(1500), d).unwrap().visual_rect(), THUMB);
    }
}
