use padboard::draw::{DrawHistory, DrawMode, DrawingCanvas, PointerInput, TouchInput, TouchPhase};
use padboard::geometry::Point;

fn stroke(canvas: &mut DrawingCanvas, from: (f32, f32), to: (f32, f32)) {
    canvas
        .handle_pointer(PointerInput::Down(Point::new(from.0, from.1)))
        .unwrap();
    canvas
        .handle_pointer(PointerInput::Move(Point::new(to.0, to.1)))
        .unwrap();
    canvas.handle_pointer(PointerInput::Up).unwrap();
}

#[test]
fn eraser_after_pen_clears_and_adds_one_entry() {
    let mut canvas = DrawingCanvas::new(120, 80, 50).unwrap();
    stroke(&mut canvas, (10.0, 40.0), (110.0, 40.0));
    assert_eq!(canvas.surface().pixel(60, 40).a, 255);
    let before = canvas.history().len();

    canvas.set_mode(DrawMode::Eraser).unwrap();
    stroke(&mut canvas, (10.0, 40.0), (110.0, 40.0));

    assert_eq!(canvas.surface().pixel(60, 40).a, 0);
    assert_eq!(canvas.history().len(), before + 1);
}

#[test]
fn touch_drives_the_same_stroke_path() {
    let mut canvas = DrawingCanvas::new(80, 80, 50).unwrap();
    let events = [
        TouchInput {
            phase: TouchPhase::Start,
            touches: vec![Point::new(10.0, 10.0)],
        },
        TouchInput {
            phase: TouchPhase::Move,
            touches: vec![Point::new(70.0, 10.0)],
        },
        TouchInput {
            phase: TouchPhase::End,
            touches: vec![],
        },
    ];
    for event in &events {
        if let Some(input) = event.to_pointer() {
            canvas.handle_pointer(input).unwrap();
        }
    }
    assert_eq!(canvas.history().len(), 2);
    assert_eq!(canvas.surface().pixel(40, 10).a, 255);
}

#[test]
fn branch_is_truncated_on_new_commit() {
    let mut history = DrawHistory::new('A', 50);
    history.commit('B');
    history.commit('C');
    assert_eq!(history.undo(), Some(&'B'));
    history.commit('D');
    assert_eq!(history.entries(), &['A', 'B', 'D']);
    assert_eq!(history.redo(), None);
}

#[test]
fn capacity_evicts_oldest_and_shifts_index() {
    let mut history = DrawHistory::new(0u32, 50);
    for i in 1..=60 {
        history.commit(i);
    }
    assert_eq!(history.len(), 50);
    assert_eq!(history.index(), 49);
    assert_eq!(history.entries()[0], 11);
    assert_eq!(history.current(), &60);
}

#[test]
fn undo_redo_round_trip_restores_pixels() {
    let mut canvas = DrawingCanvas::new(60, 60, 50).unwrap();
    stroke(&mut canvas, (5.0, 30.0), (55.0, 30.0));
    let painted = canvas.surface().rgba_pixels().to_vec();

    assert!(canvas.undo().unwrap());
    assert!(canvas.redo().unwrap());
    assert_eq!(canvas.surface().rgba_pixels(), painted.as_slice());
}

#[test]
fn pasted_label_is_committed_and_undoable() {
    let mut canvas = DrawingCanvas::new(40, 40, 50).unwrap();
    let label = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
    let before = canvas.history().len();

    canvas.paste_image(&label, Point::new(8.0, 8.0)).unwrap();
    assert_eq!(canvas.surface().pixel(9, 9).a, 255);
    assert_eq!(canvas.surface().pixel(20, 20).a, 0);
    assert_eq!(canvas.history().len(), before + 1);

    assert!(canvas.undo().unwrap());
    assert_eq!(canvas.surface().pixel(9, 9).a, 0);
}
