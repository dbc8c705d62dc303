use crate::coords::{Rectangle, Vec2, Viewport, drag_delta};

/// Wheel factor applied for a positive `delta_y` (scroll down).
pub const ZOOM_OUT: f32 = 0.9;

/// Wheel factor applied for a zero or negative `delta_y`.
pub const ZOOM_IN: f32 = 1.1;

/// Accumulates drags and wheel steps into a clip-space placement.
///
/// Holds a `committed` rectangle (last finalized placement) and a `working`
/// rectangle. They are equal whenever no handler is running: a drag move
/// previews `committed + delta` and resets `working` before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureCoordinator {
    committed: Rectangle,
    working: Rectangle,
}

impl Default for GestureCoordinator {
    fn default() -> Self {
        Self::new(Rectangle::FULL_CLIP)
    }
}

impl GestureCoordinator {
    pub fn new(committed: Rectangle) -> Self {
        Self {
            committed,
            working: committed,
        }
    }

    #[inline]
    pub fn committed(&self) -> Rectangle {
        self.committed
    }

    #[inline]
    pub fn working(&self) -> Rectangle {
        self.working
    }

    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.working == self.committed
    }

    /// Replaces both rectangles, e.g. after a fresh layout pass.
    pub fn reset(&mut self, committed: Rectangle) {
        self.committed = committed;
        self.working = committed;
    }

    /// Previews a drag in progress.
    ///
    /// Returns the rectangle to render. State is left unchanged: the preview is
    /// not persisted until [`on_drag_end`](Self::on_drag_end).
    pub fn on_drag_move(&mut self, start: Vec2, end: Vec2, viewport: Viewport) -> Rectangle {
        let delta = drag_delta(start, end, viewport);
        self.working = self.committed.translated(delta);
        let emitted = self.working;
        self.working = self.committed;
        emitted
    }

    /// Commits a finished drag and returns the new committed placement.
    pub fn on_drag_end(&mut self, start: Vec2, end: Vec2, viewport: Viewport) -> Rectangle {
        let delta = drag_delta(start, end, viewport);
        self.committed = self.committed.translated(delta);
        self.working = self.committed;
        log::trace!("drag committed: {:?}", self.committed);
        self.committed
    }

    /// Drops a drag preview and returns the committed placement to redraw.
    pub fn on_drag_cancel(&mut self) -> Rectangle {
        self.working = self.committed;
        self.committed
    }

    /// Zooms by one wheel step and commits the result.
    ///
    /// Positive `delta_y` zooms out by [`ZOOM_OUT`], anything else zooms in by
    /// [`ZOOM_IN`]. Corners scale about the clip-space origin, so an off-centre
    /// rectangle drifts toward (or away from) the middle of the surface.
    pub fn on_wheel(&mut self, delta_y: f32) -> Rectangle {
        let factor = if delta_y > 0.0 { ZOOM_OUT } else { ZOOM_IN };
        self.committed = self.committed.scaled_about_origin(factor);
        self.working = self.committed;
        self.committed
    }
}
