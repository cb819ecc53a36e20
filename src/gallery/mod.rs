//! Interaction engine of the public gallery.
//!
//! Rendering-independent state machines for the parts of the gallery that
//! carry logic:
//!
//! - [`scroll`] - per-strip snap navigation driven by wheel, touch and keys
//! - [`layout`] - mobile rows vs desktop columns, gesture routing
//! - [`transition`] - FLIP handoff between a card and the detail view
//! - [`preload`] - prioritized image preloading, one fetch at a time
//!
//! Every component takes the current time as a [`std::time::Duration`]
//! from the caller and never reads a clock itself.

pub mod easing;
pub mod layout;
pub mod preload;
pub mod scroll;
pub mod transition;

pub use layout::{GalleryLayout, LayoutMode, StripSpec, StripState};
pub use preload::{Fetcher, HttpFetcher, Observation, PreloadQueue, Preloader, Priority, classify};
pub use scroll::{Axis, IndexMarker, Key, ScrollConfig, ScrollController};
pub use transition::{
    FlipTransform, Overlay, PageSnapshot, PageState, TransitionController, TransitionError,
    TransitionState,
};
