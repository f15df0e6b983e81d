use padboard::geometry::{Point, Size, Viewport};
use padboard::window_manager::{
    default_windows, tray, GestureController, GestureKind, Visibility, WindowRegistry,
    AI_WINDOW, DRAWING_WINDOW, PDF_WINDOW,
};

fn registry(width: f32, height: f32) -> WindowRegistry {
    let mut registry =
        WindowRegistry::new(Viewport::new(width, height, 60.0, 40.0), &default_windows());
    for spec in default_windows() {
        registry.open(spec.id).unwrap();
    }
    registry
}

#[test]
fn resize_grows_to_the_viewport_cap() {
    let mut registry = registry(1200.0, 800.0);
    registry
        .set_position(DRAWING_WINDOW, Point::new(100.0, 100.0))
        .unwrap();
    let mut gestures = GestureController::default();
    gestures
        .start_resize(&mut registry, DRAWING_WINDOW, Point::new(700.0, 600.0))
        .unwrap();
    gestures
        .on_pointer_move(&mut registry, Point::new(1700.0, 1600.0))
        .unwrap();
    gestures.on_pointer_up();

    let rect = registry.get(DRAWING_WINDOW).unwrap().rect;
    assert_eq!(rect.size, Size::new(1080.0, 640.0));
    assert!(!gestures.is_active());
}

#[test]
fn dragged_window_stays_between_bands() {
    let mut registry = registry(1000.0, 700.0);
    let mut gestures = GestureController::default();
    let origin = registry.get(PDF_WINDOW).unwrap().rect.origin;
    gestures
        .start_drag(&mut registry, PDF_WINDOW, origin)
        .unwrap();
    assert_eq!(gestures.active(), Some((GestureKind::Drag, PDF_WINDOW)));

    for target in [
        Point::new(-500.0, -500.0),
        Point::new(5000.0, 5000.0),
        Point::new(120.0, 30.0),
    ] {
        gestures.on_pointer_move(&mut registry, target).unwrap();
        let rect = registry.get(PDF_WINDOW).unwrap().rect;
        assert!(rect.left() >= 0.0 && rect.right() <= 1000.0);
        assert!(rect.top() >= 60.0 && rect.bottom() <= 700.0 - 40.0);
    }
}

#[test]
fn z_order_only_grows() {
    let mut registry = registry(1200.0, 800.0);
    let mut last = registry.windows().iter().map(|w| w.z).max().unwrap();
    for id in [AI_WINDOW, DRAWING_WINDOW, AI_WINDOW, PDF_WINDOW] {
        let z = registry.bring_to_front(id).unwrap();
        assert!(z > last);
        last = z;
        assert_eq!(registry.top_visible().unwrap().id, id);
    }
}

#[test]
fn minimize_restore_through_tray() {
    let mut registry = registry(1200.0, 800.0);
    registry.minimize(PDF_WINDOW).unwrap();
    registry.minimize(DRAWING_WINDOW).unwrap();
    let titles: Vec<String> = tray::entries(&registry)
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["PDF Viewer", "Drawing Canvas"]);

    assert!(tray::activate(&mut registry, PDF_WINDOW).unwrap());
    let window = registry.get(PDF_WINDOW).unwrap();
    assert_eq!(window.visibility, Visibility::Visible);
    assert_eq!(registry.top_visible().unwrap().id, PDF_WINDOW);
    assert_eq!(tray::entries(&registry).len(), 1);
}

#[test]
fn maximize_round_trip_restores_geometry() {
    let mut registry = registry(1400.0, 900.0);
    let before = registry.get(AI_WINDOW).unwrap().rect;
    assert!(registry.toggle_maximize(AI_WINDOW).unwrap());
    let maximized = registry.get(AI_WINDOW).unwrap().rect;
    assert_eq!(maximized.origin, Point::new(20.0, 80.0));
    assert_eq!(maximized.size, Size::new(980.0, 760.0));
    assert!(!registry.toggle_maximize(AI_WINDOW).unwrap());
    assert_eq!(registry.get(AI_WINDOW).unwrap().rect, before);
}

#[test]
fn unknown_window_is_an_error() {
    let mut registry = registry(1200.0, 800.0);
    assert!(registry.bring_to_front("missing").is_err());
    assert!(registry.minimize("missing").is_err());
}
