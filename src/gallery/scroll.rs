//! Index-based scroll/snap controller for one gallery row or column.
//!
//! The controller owns the list of card extents along its axis and the
//! index of the card currently snapped into place. Gestures are turned into
//! `±1` steps (or jumps for Home/End); each accepted step starts a tween
//! from the current offset to the target card's snap offset. While a tween
//! is running every further request is dropped, nothing is queued.
//!
//! Time is passed in by the caller as a [`Duration`] since any fixed
//! origin, so the controller never reads a clock.

use std::fmt;
use std::time::Duration;
use tracing::trace;

use super::easing::Tween;
use crate::constants::{SCROLL_DURATION_MS, SWIPE_MIN_PX, WHEEL_THRESHOLD, WHEEL_WINDOW_MS};

/// Scroll direction of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Mobile rows.
    Horizontal,
    /// Desktop columns.
    Vertical,
}

/// Navigation keys the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Timing and gesture thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// Length of one snap tween.
    pub duration: Duration,
    /// Quiet period after the last wheel event before the sum is judged.
    pub wheel_window: Duration,
    /// Minimum absolute accumulated wheel delta that counts as a step.
    pub wheel_threshold: f64,
    /// Minimum swipe distance along the axis.
    pub swipe_min_px: f64,
    /// Space between adjacent cards.
    pub gap: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(SCROLL_DURATION_MS),
            wheel_window: Duration::from_millis(WHEEL_WINDOW_MS),
            wheel_threshold: WHEEL_THRESHOLD,
            swipe_min_px: SWIPE_MIN_PX,
            gap: 0.0,
        }
    }
}

/// The `01 / 12` marker shown next to a gallery strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexMarker {
    /// 1-based position of the current card.
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for IndexMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} / {:02}", self.current, self.total)
    }
}

/// Snap offset of each card: the sum of preceding extents and gaps.
#[must_use]
pub fn snap_offsets(extents: &[f64], gap: f64) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(extents.len());
    let mut acc = 0.0;
    for extent in extents {
        offsets.push(acc);
        acc += extent + gap;
    }
    offsets
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    tween: Tween,
    target: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct WheelAccumulator {
    sum: f64,
    last_event: Option<Duration>,
}

/// Scroll/snap state of one strip of cards.
#[derive(Debug, Clone)]
pub struct ScrollController {
    axis: Axis,
    config: ScrollConfig,
    offsets: Vec<f64>,
    index: usize,
    offset: f64,
    flight: Option<Flight>,
    wheel: WheelAccumulator,
    touch_start: Option<(f64, f64)>,
}

impl ScrollController {
    /// Creates a controller over cards of the given extents, snapped to the
    /// first card.
    #[must_use]
    pub fn new(axis: Axis, extents: &[f64], config: ScrollConfig) -> Self {
        Self {
            axis,
            offsets: snap_offsets(extents, config.gap),
            config,
            index: 0,
            offset: 0.0,
            flight: None,
            wheel: WheelAccumulator::default(),
            touch_start: None,
        }
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Index of the card the strip is snapped to (or was, while animating).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Scroll offset as of the last [`tick`](Self::tick).
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    #[must_use]
    pub fn snap_offset(&self, index: usize) -> Option<f64> {
        self.offsets.get(index).copied()
    }

    /// Marker for the current index; `None` for an empty strip.
    #[must_use]
    pub fn marker(&self) -> Option<IndexMarker> {
        (!self.is_empty()).then(|| IndexMarker {
            current: self.index + 1,
            total: self.len(),
        })
    }

    /// Replaces card extents after a resize and snaps to the current card,
    /// clamping the index if cards disappeared. A running tween is dropped.
    pub fn set_extents(&mut self, extents: &[f64]) {
        self.offsets = snap_offsets(extents, self.config.gap);
        self.flight = None;
        self.index = self.index.min(self.len().saturating_sub(1));
        self.offset = self.snap_offset(self.index).unwrap_or(0.0);
    }

    /// Restores index and offset without animating, e.g. from a snapshot.
    pub fn jump_to(&mut self, index: usize, offset: f64) {
        self.flight = None;
        self.index = index.min(self.len().saturating_sub(1));
        self.offset = offset;
    }

    /// Requests a move by `delta` cards.
    ///
    /// The target is clamped to the strip. Returns `false` (and does
    /// nothing) while a tween is in flight or when the clamped target is
    /// the current card.
    pub fn navigate(&mut self, delta: isize, now: Duration) -> bool {
        self.settle(now);
        if self.flight.is_some() || self.is_empty() {
            return false;
        }
        let last = self.len() - 1;
        let target = self.index.saturating_add_signed(delta).min(last);
        self.start_flight(target, now)
    }

    /// Requests a move to `index` (clamped).
    pub fn go_to(&mut self, index: usize, now: Duration) -> bool {
        self.settle(now);
        if self.flight.is_some() || self.is_empty() {
            return false;
        }
        let target = index.min(self.len() - 1);
        self.start_flight(target, now)
    }

    fn start_flight(&mut self, target: usize, now: Duration) -> bool {
        if target == self.index {
            return false;
        }
        let Some(to) = self.snap_offset(target) else {
            return false;
        };
        trace!(from = self.index, to = target, "Scroll tween started");
        self.flight = Some(Flight {
            tween: Tween::new(self.offset, to, now, self.config.duration),
            target,
        });
        true
    }

    /// Finishes a tween whose duration has elapsed.
    fn settle(&mut self, now: Duration) {
        if let Some(flight) = self.flight
            && flight.tween.is_finished(now)
        {
            self.index = flight.target;
            self.offset = flight.tween.target();
            self.flight = None;
        }
    }

    /// Advances time: moves the tween, finishes it when due, and judges
    /// accumulated wheel input once its window has closed. Returns the
    /// offset to render.
    pub fn tick(&mut self, now: Duration) -> f64 {
        if let Some(flight) = self.flight {
            self.offset = flight.tween.value_at(now);
        }
        self.settle(now);

        if let Some(last) = self.wheel.last_event
            && now.saturating_sub(last) >= self.config.wheel_window
        {
            let sum = self.wheel.sum;
            self.wheel = WheelAccumulator::default();
            if sum.abs() >= self.config.wheel_threshold {
                self.navigate(if sum > 0.0 { 1 } else { -1 }, now);
            }
        }
        self.offset
    }

    /// Adds a wheel delta (positive scrolls forward).
    pub fn wheel(&mut self, delta: f64, now: Duration) {
        self.wheel.sum += delta;
        self.wheel.last_event = Some(now);
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        self.touch_start = Some((x, y));
    }

    /// Ends a touch; a swipe long enough along the axis steps one card.
    /// Swiping toward the start of the axis (up or left) moves forward.
    pub fn touch_end(&mut self, x: f64, y: f64, now: Duration) -> bool {
        let Some((sx, sy)) = self.touch_start.take() else {
            return false;
        };
        let distance = match self.axis {
            Axis::Horizontal => sx - x,
            Axis::Vertical => sy - y,
        };
        if distance.abs() < self.config.swipe_min_px {
            return false;
        }
        self.navigate(if distance > 0.0 { 1 } else { -1 }, now)
    }

    /// Handles a key press. Arrows across the axis are ignored.
    pub fn key(&mut self, key: Key, now: Duration) -> bool {
        match (key, self.axis) {
            (Key::ArrowDown, Axis::Vertical) | (Key::ArrowRight, Axis::Horizontal) => {
                self.navigate(1, now)
            },
            (Key::ArrowUp, Axis::Vertical) | (Key::ArrowLeft, Axis::Horizontal) => {
                self.navigate(-1, now)
            },
            (Key::PageDown, _) => self.navigate(1, now),
            (Key::PageUp, _) => self.navigate(-1, now),
            (Key::Home, _) => self.go_to(0, now),
            (Key::End, _) => self.go_to(usize::MAX, now),
            _ => false,
        }
    }
}
