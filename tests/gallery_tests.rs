//! Gallery engine flows: scroll a layout, open a detail view over it and
//! close it again.

use serde::Deserialize;
use std::time::Duration;

use folio::gallery::transition::{DETAIL_OPEN_CLASS, TRANSITIONING_CLASS};
use folio::gallery::{
    Axis, GalleryLayout, Key, LayoutMode, PageState, ScrollConfig, StripSpec,
    TransitionController, TransitionError, TransitionState,
};
use folio::geometry::Rect;

#[derive(Deserialize)]
struct Fixture {
    viewport_width: f64,
    gap: f64,
    strips: Vec<StripSpec>,
    thumbnail: Rect,
    detail: Rect,
}

fn fixture() -> Fixture {
    serde_json::from_str(include_str!("fixtures/cedar-house.json")).expect("valid fixture")
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn layout(fixture: &Fixture, viewport_width: f64) -> GalleryLayout {
    let config = ScrollConfig {
        gap: fixture.gap,
        ..ScrollConfig::default()
    };
    GalleryLayout::new(viewport_width, &fixture.strips, config)
}

/// Scrolls the desktop fixture to a known, non-initial position.
fn scrolled_desktop(fixture: &Fixture) -> GalleryLayout {
    let mut layout = layout(fixture, fixture.viewport_width);
    assert_eq!(layout.mode(), LayoutMode::Desktop);

    // Wheel over the first column; judged once the window closes.
    assert!(layout.wheel_at(100.0, 100.0, 30.0, ms(0)));
    layout.tick(ms(60));
    assert!(layout.is_animating());
    let offsets = layout.tick(ms(660));
    assert_eq!(offsets[0], 416.0);

    // Swipe up on the second column.
    assert!(layout.touch_start_at(900.0, 600.0));
    assert!(layout.touch_end(900.0, 450.0, ms(700)));
    layout.tick(ms(1300));

    // Keys follow the strip last touched.
    assert_eq!(layout.focused(), Some(1));
    assert!(layout.key(Key::End, ms(1400)));
    layout.tick(ms(2000));
    assert!(!layout.is_animating());
    layout
}

#[test]
fn test_desktop_scroll_flow() {
    let fixture = fixture();
    let layout = scrolled_desktop(&fixture);

    let first = &layout.strip(0).unwrap().controller;
    assert_eq!(first.axis(), Axis::Vertical);
    assert_eq!(first.index(), 1);
    assert_eq!(first.marker().unwrap().to_string(), "02 / 03");

    let second = &layout.strip(1).unwrap().controller;
    assert_eq!(second.index(), 3);
    assert_eq!(second.offset(), 1148.0);
    assert_eq!(second.marker().unwrap().to_string(), "04 / 04");
}

#[test]
fn test_mobile_rows_scroll_horizontally() {
    let fixture = fixture();
    let mut layout = layout(&fixture, 375.0);
    assert_eq!(layout.mode(), LayoutMode::Mobile);

    // A vertical swipe is across the axis and ignored.
    assert!(layout.touch_start_at(300.0, 400.0));
    assert!(!layout.touch_end(300.0, 200.0, ms(0)));

    // Swiping left moves forward.
    assert!(layout.touch_start_at(300.0, 400.0));
    assert!(layout.touch_end(150.0, 400.0, ms(10)));
    layout.tick(ms(700));
    assert_eq!(layout.strip(0).unwrap().controller.index(), 1);

    assert!(!layout.key(Key::ArrowDown, ms(800)));
    assert!(layout.key(Key::ArrowRight, ms(800)));
    layout.tick(ms(1400));
    assert_eq!(layout.strip(0).unwrap().controller.index(), 2);
}

#[test]
fn test_open_close_restores_page() {
    let fixture = fixture();
    let mut page = PageState::new(scrolled_desktop(&fixture));
    let before = page.snapshot();
    let mut transition = TransitionController::new(ms(500));

    transition
        .open(&mut page, "cedar-house", fixture.thumbnail, fixture.detail, ms(3000))
        .unwrap();
    assert!(page.body_scroll_locked);
    assert_eq!(page.active_card.as_deref(), Some("cedar-house"));
    assert!(page.classes.contains(DETAIL_OPEN_CLASS));
    assert!(page.classes.contains(TRANSITIONING_CLASS));
    assert_eq!(transition.snapshot(), Some(&before));

    // The clone starts exactly over the thumbnail.
    let overlay = transition.tick(&mut page, ms(3000)).unwrap();
    assert_eq!(overlay.card, "cedar-house");
    assert_eq!(overlay.base, fixture.detail);
    assert_eq!(overlay.visual_rect(), fixture.thumbnail);

    let err = transition
        .open(&mut page, "stone-barn", fixture.thumbnail, fixture.detail, ms(3100))
        .unwrap_err();
    assert!(matches!(err, TransitionError::Busy));
    assert_eq!(page.active_card.as_deref(), Some("cedar-house"));

    assert!(transition.tick(&mut page, ms(3500)).is_none());
    assert!(matches!(transition.state(), TransitionState::Open { .. }));
    assert!(!page.classes.contains(TRANSITIONING_CLASS));
    assert!(page.classes.contains(DETAIL_OPEN_CLASS));

    // Strips underneath move while the detail view is up.
    page.layout.strip_mut(0).unwrap().controller.jump_to(0, 0.0);
    page.layout.strip_mut(1).unwrap().controller.jump_to(0, 0.0);

    transition.close(&mut page, ms(4000)).unwrap();
    assert!(!page.classes.contains(DETAIL_OPEN_CLASS));
    assert!(page.classes.contains(TRANSITIONING_CLASS));

    // Closing plays from the detail box back to the thumbnail.
    let overlay = transition.tick(&mut page, ms(4000)).unwrap();
    assert_eq!(overlay.base, fixture.thumbnail);
    assert_eq!(overlay.visual_rect(), fixture.detail);

    assert!(transition.tick(&mut page, ms(4500)).is_none());
    assert_eq!(transition.state(), &TransitionState::Closed);
    assert_eq!(page.snapshot(), before);
    assert_eq!(page.layout.strip(0).unwrap().controller.offset(), 416.0);
    assert!(transition.snapshot().is_none());

    let err = transition.close(&mut page, ms(5000)).unwrap_err();
    assert!(matches!(err, TransitionError::NotOpen));
}

#[test]
fn test_snapshot_serializes() {
    let fixture = fixture();
    let page = PageState::new(scrolled_desktop(&fixture));
    let json = serde_json::to_value(page.snapshot()).unwrap();
    assert_eq!(json["strips"][0]["index"], 1);
    assert_eq!(json["body_scroll_locked"], false);
}
