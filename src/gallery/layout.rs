//! Gallery layout: which strips exist and which one receives a gesture.
//!
//! Below the breakpoint every row scrolls horizontally on its own; at or
//! above it every column scrolls vertically on its own. Wheel and touch
//! gestures go to the strip under the pointer, keys go to the strip that
//! last received a pointer gesture.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::scroll::{Axis, Key, ScrollConfig, ScrollController};
use crate::constants::DESKTOP_BREAKPOINT_PX;
use crate::geometry::Rect;

/// Layout mode chosen from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Mobile,
    Desktop,
}

impl LayoutMode {
    #[must_use]
    pub fn for_width(viewport_width: f64) -> Self {
        if viewport_width >= DESKTOP_BREAKPOINT_PX {
            Self::Desktop
        } else {
            Self::Mobile
        }
    }

    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Self::Mobile => Axis::Horizontal,
            Self::Desktop => Axis::Vertical,
        }
    }
}

/// Resting position of one strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StripState {
    pub index: usize,
    pub offset: f64,
}

/// One row or column: its on-screen box and its controller.
#[derive(Debug, Clone)]
pub struct Strip {
    pub bounds: Rect,
    pub controller: ScrollController,
}

/// Input for building a layout: a strip's box and its card extents along
/// the strip's axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripSpec {
    pub bounds: Rect,
    pub extents: Vec<f64>,
}

/// All strips of the gallery plus gesture routing.
#[derive(Debug, Clone)]
pub struct GalleryLayout {
    mode: LayoutMode,
    strips: Vec<Strip>,
    focused: Option<usize>,
    touch_target: Option<usize>,
}

impl GalleryLayout {
    #[must_use]
    pub fn new(viewport_width: f64, specs: &[StripSpec], config: ScrollConfig) -> Self {
        let mode = LayoutMode::for_width(viewport_width);
        let strips = specs
            .iter()
            .map(|spec| Strip {
                bounds: spec.bounds,
                controller: ScrollController::new(mode.axis(), &spec.extents, config),
            })
            .collect::<Vec<_>>();
        debug!(?mode, strips = strips.len(), "Gallery layout built");
        Self {
            mode,
            strips,
            focused: None,
            touch_target: None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    #[must_use]
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    #[must_use]
    pub fn strip(&self, index: usize) -> Option<&Strip> {
        self.strips.get(index)
    }

    pub fn strip_mut(&mut self, index: usize) -> Option<&mut Strip> {
        self.strips.get_mut(index)
    }

    /// Strip that last received a pointer gesture.
    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Strip under the given point.
    #[must_use]
    pub fn strip_at(&self, x: f64, y: f64) -> Option<usize> {
        self.strips.iter().position(|s| s.bounds.contains(x, y))
    }

    /// Routes a wheel delta to the strip under the pointer. Returns false
    /// if no strip is there.
    pub fn wheel_at(&mut self, x: f64, y: f64, delta: f64, now: Duration) -> bool {
        let Some(i) = self.strip_at(x, y) else {
            return false;
        };
        self.focused = Some(i);
        self.strips[i].controller.wheel(delta, now);
        true
    }

    /// Starts a touch on the strip under the pointer.
    pub fn touch_start_at(&mut self, x: f64, y: f64) -> bool {
        self.touch_target = self.strip_at(x, y);
        match self.touch_target {
            Some(i) => {
                self.focused = Some(i);
                self.strips[i].controller.touch_start(x, y);
                true
            },
            None => false,
        }
    }

    /// Ends the touch on the strip where it started.
    pub fn touch_end(&mut self, x: f64, y: f64, now: Duration) -> bool {
        match self.touch_target.take() {
            Some(i) => self.strips[i].controller.touch_end(x, y, now),
            None => false,
        }
    }

    /// Sends a key to the focused strip.
    pub fn key(&mut self, key: Key, now: Duration) -> bool {
        match self.focused {
            Some(i) => self.strips[i].controller.key(key, now),
            None => false,
        }
    }

    /// Advances every strip and returns their offsets in strip order.
    pub fn tick(&mut self, now: Duration) -> Vec<f64> {
        self.strips
            .iter_mut()
            .map(|s| s.controller.tick(now))
            .collect()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.strips.iter().any(|s| s.controller.is_animating())
    }

    /// Resting positions of all strips.
    #[must_use]
    pub fn scroll_state(&self) -> Vec<StripState> {
        self.strips
            .iter()
            .map(|s| StripState {
                index: s.controller.index(),
                offset: s.controller.offset(),
            })
            .collect()
    }

    /// Puts every strip back to a saved position without animating.
    pub fn restore(&mut self, states: &[StripState]) {
        for (strip, state) in self.strips.iter_mut().zip(states) {
            strip.controller.jump_to(state.index, state.offset);
        }
    }
}
