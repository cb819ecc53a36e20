use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Normalized point of interest used to bias cropping.
///
/// Both coordinates are always within `[0, 1]`; every constructor clamps,
/// including deserialization, so out-of-range input from the wire or from
/// a pointer dragged past the image edge cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFocalPoint")]
pub struct FocalPoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawFocalPoint {
    x: f64,
    y: f64,
}

impl From<RawFocalPoint> for FocalPoint {
    fn from(raw: RawFocalPoint) -> Self {
        Self::new(raw.x, raw.y)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl FocalPoint {
    /// Image center.
    pub const CENTER: FocalPoint = FocalPoint { x: 0.5, y: 0.5 };

    /// Creates a focal point, clamping both coordinates into `[0, 1]`.
    /// NaN falls back to the center.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Converts a pointer position (page coordinates) over the displayed
    /// image into a focal point.
    ///
    /// A degenerate image box yields the center.
    #[must_use]
    pub fn from_pointer(pointer_x: f64, pointer_y: f64, image: Rect) -> Self {
        if image.width <= 0.0 || image.height <= 0.0 {
            return Self::CENTER;
        }
        Self::new(
            (pointer_x - image.x) / image.width,
            (pointer_y - image.y) / image.height,
        )
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// CSS `object-position` value, e.g. `"25.0% 75.0%"`.
    #[must_use]
    pub fn object_position(&self) -> String {
        format!("{:.1}% {:.1}%", self.x * 100.0, self.y * 100.0)
    }
}

impl Default for FocalPoint {
    fn default() -> Self {
        Self::CENTER
    }
}
