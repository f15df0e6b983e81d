use crate::draw::model::ModeConfig;
use crate::draw::surface::RenderTarget;
use crate::geometry::Point;

/// State kept between pointer-down and pointer-up of a single stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSession {
    pub last: Point,
    pub config: ModeConfig,
}

/// Streams pointer positions into painted strokes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeRenderer {
    session: Option<StrokeSession>,
}

impl StrokeRenderer {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    pub fn begin_stroke<T: RenderTarget>(&mut self, target: &mut T, point: Point, config: ModeConfig) {
        target.apply(config);
        self.session = Some(StrokeSession {
            last: point,
            config,
        });
    }

    /// Paint from the last point to `point` right away. Ignored when no
    /// stroke is open.
    pub fn extend_stroke<T: RenderTarget>(&mut self, target: &mut T, point: Point) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        target.stroke_segment(session.last, point);
        session.last = point;
        true
    }

    /// Close the stroke. Returns `true` when a stroke was open, meaning the
    /// caller should commit the surface to history.
    pub fn end_stroke(&mut self) -> bool {
        self.session.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{DrawMode, PenSettings};

    #[derive(Default)]
    struct Recorder {
        applied: Vec<ModeConfig>,
        segments: Vec<(Point, Point)>,
    }

    impl RenderTarget for Recorder {
        fn apply(&mut self, config: ModeConfig) {
            self.applied.push(config);
        }

        fn stroke_segment(&mut self, from: Point, to: Point) {
            self.segments.push((from, to));
        }
    }

    #[test]
    fn segments_chain_from_previous_point() {
        let mut target = Recorder::default();
        let mut renderer = StrokeRenderer::default();
        let config = DrawMode::Highlighter.config(PenSettings::default());

        renderer.begin_stroke(&mut target, Point::new(0.0, 0.0), config);
        renderer.extend_stroke(&mut target, Point::new(5.0, 0.0));
        renderer.extend_stroke(&mut target, Point::new(5.0, 5.0));

        assert_eq!(target.applied, vec![config]);
        assert_eq!(
            target.segments,
            vec![
                (Point::new(0.0, 0.0), Point::new(5.0, 0.0)),
                (Point::new(5.0, 0.0), Point::new(5.0, 5.0)),
            ]
        );
        assert!(renderer.end_stroke());
        assert!(!renderer.end_stroke());
    }

    #[test]
    fn moves_without_stroke_paint_nothing() {
        let mut target = Recorder::default();
        let mut renderer = StrokeRenderer::default();
        assert!(!renderer.extend_stroke(&mut target, Point::new(3.0, 3.0)));
        assert!(target.segments.is_empty());
    }
}
