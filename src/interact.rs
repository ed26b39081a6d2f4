// SPDX: CC0-1.0

use crate::{
    compile,
    eval::Evaluator,
    parse::CompileError,
    render::{self, Surface},
    scan::{self, PixelMask, ScanStats},
    viewport::{Viewport, ViewportErr, ZoomDir},
    Number, Point,
};

/// Pointer drag state. Pressing anchors the pointer; every motion while dragging pans the
/// viewport by the distance since the previous position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Drag {
    #[default]
    Idle,
    Dragging {
        last: Point<Number>,
    },
}

impl Drag {
    pub fn press(&mut self, at: Point<Number>) {
        *self = Self::Dragging { last: at };
    }

    /// Returns the applied delta, or `None` when not dragging.
    pub fn motion(
        &mut self,
        at: Point<Number>,
        viewport: &mut Viewport,
    ) -> Result<Option<Point<Number>>, ViewportErr> {
        let Self::Dragging { last } = self else {
            return Ok(None);
        };
        let delta = Point {
            x: at.x - last.x,
            y: at.y - last.y,
        };
        viewport.pan(delta)?;
        *last = at;
        Ok(Some(delta))
    }

    pub fn release(&mut self) {
        *self = Self::Idle;
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// Input from the hosting UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Redraw,
    Press(Point<Number>),
    Motion(Point<Number>),
    Release,
    /// raw wheel delta; positive scrolls down
    Wheel(Number),
    Zoom(ZoomDir),
    Pan(Point<Number>),
}

/// Owns everything that persists between draws: the viewport, the drag state and the last
/// expression that compiled.
#[derive(Clone, Debug, Default)]
pub struct Session {
    viewport: Viewport,
    drag: Drag,
    evaluator: Option<Evaluator>,
}

impl Session {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            drag: Drag::Idle,
            evaluator: None,
        }
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub const fn drag(&self) -> &Drag {
        &self.drag
    }

    pub const fn evaluator(&self) -> Option<&Evaluator> {
        self.evaluator.as_ref()
    }

    /// Compile `source` and make it current. On failure the previous expression stays.
    pub fn set_expr(&mut self, source: &str) -> Result<&Evaluator, CompileError> {
        match compile(source) {
            Ok(evaluator) => Ok(&*self.evaluator.insert(evaluator)),
            Err(err) => {
                tracing::warn!(expr = source, error = %err, "keeping previous expression");
                Err(err)
            }
        }
    }

    /// Apply one input event. Returns whether the picture needs to be redrawn.
    pub fn handle(&mut self, event: Event) -> Result<bool, ViewportErr> {
        let redraw = match event {
            Event::Redraw => true,
            Event::Press(at) => {
                self.drag.press(at);
                false
            }
            Event::Motion(at) => self.drag.motion(at, &mut self.viewport)?.is_some(),
            Event::Release => {
                self.drag.release();
                false
            }
            Event::Wheel(delta_y) => self.viewport.zoom(ZoomDir::from_wheel(delta_y)),
            Event::Zoom(dir) => self.viewport.zoom(dir),
            Event::Pan(delta) => {
                self.viewport.pan(delta)?;
                true
            }
        };
        tracing::trace!(?event, redraw, "handled event");
        Ok(redraw)
    }

    /// Full redraw onto `surface`; `None` while no expression has compiled yet, in which
    /// case only the grid, axes and labels are drawn.
    pub fn redraw<S: Surface + ?Sized>(&self, surface: &mut S) -> Option<ScanStats> {
        match self.evaluator {
            Some(ref evaluator) => Some(render::redraw(evaluator, &self.viewport, surface)),
            None => {
                render::draw_decorations(surface, &self.viewport);
                None
            }
        }
    }

    pub fn mask(&self) -> Option<(PixelMask, ScanStats)> {
        self.evaluator
            .as_ref()
            .map(|evaluator| scan::scan_mask(evaluator, &self.viewport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: Number, y: Number) -> Point<Number> {
        Point { x, y }
    }

    #[test]
    fn motion_without_press_does_nothing() {
        let mut vp = Viewport::default();
        let mut drag = Drag::default();
        assert_eq!(drag.motion(p(10.0, 10.0), &mut vp), Ok(None));
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn drag_pans_by_incremental_deltas() {
        let mut vp = Viewport::default();
        let mut drag = Drag::Idle;
        drag.press(p(100.0, 100.0));
        assert!(drag.is_dragging());
        assert_eq!(drag.motion(p(110.0, 95.0), &mut vp), Ok(Some(p(10.0, -5.0))));
        assert_eq!(drag.motion(p(120.0, 95.0), &mut vp), Ok(Some(p(10.0, 0.0))));
        drag.release();
        assert!(!drag.is_dragging());
        assert_eq!(drag.motion(p(500.0, 500.0), &mut vp), Ok(None));
        assert_eq!(vp.center(), p(320.0, 295.0));
    }

    #[test]
    fn session_events() {
        let mut session = Session::default();
        assert_eq!(session.handle(Event::Press(p(0.0, 0.0))), Ok(false));
        assert!(session.drag().is_dragging());
        assert_eq!(session.handle(Event::Motion(p(5.0, 5.0))), Ok(true));
        assert_eq!(session.handle(Event::Release), Ok(false));
        assert_eq!(session.handle(Event::Motion(p(9.0, 9.0))), Ok(false));
        assert_eq!(session.viewport().center(), p(305.0, 305.0));

        let scale = session.viewport().scale();
        assert_eq!(session.handle(Event::Wheel(120.0)), Ok(true));
        assert!(session.viewport().scale() > scale);
        assert_eq!(session.handle(Event::Zoom(ZoomDir::In)), Ok(true));
        assert!((session.viewport().scale() - scale).abs() < 1e-15);
        // zoom pivots on the origin, which stays where the drag left it
        assert_eq!(session.viewport().center(), p(305.0, 305.0));
    }

    #[test]
    fn failed_compile_keeps_previous() {
        let mut session = Session::default();
        assert!(session.evaluator().is_none());
        session.set_expr("x - y").unwrap();
        assert!(session.set_expr("x +* y").is_err());
        assert_eq!(session.evaluator().map(Evaluator::src), Some("x - y"));
    }

    #[test]
    fn redraw_without_expression_draws_decorations() {
        let session = Session::default();
        let mut img = image::RgbImage::new(600, 600);
        assert_eq!(session.redraw(&mut img), None);
        assert_eq!(img.get_pixel(300, 7).0, render::AXIS);
        assert_eq!(img.get_pixel(7, 7).0, render::BACKGROUND);
        assert!(session.mask().is_none());
    }
}
