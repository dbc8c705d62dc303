use super::{Vec2, Viewport, to_clip};

/// Axis-aligned rectangle given by two corners `(start, end)`.
///
/// Used both as drawable bounds and as gesture state. Corners are not
/// normalized: `end` may lie left of or above `start`, and geometry built from
/// the rectangle preserves that orientation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub start: Vec2,
    pub end: Vec2,
}

impl Rectangle {
    /// The whole surface in clip space.
    pub const FULL_CLIP: Rectangle = Rectangle::new(-1.0, -1.0, 1.0, 1.0);

    /// The unit square, used for texture coordinates.
    pub const UNIT: Rectangle = Rectangle::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Self {
        Self {
            start: Vec2::new(start_x, start_y),
            end: Vec2::new(end_x, end_y),
        }
    }

    #[inline]
    pub const fn from_corners(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Signed extent along x (`end.x - start.x`).
    #[inline]
    pub fn width(self) -> f32 {
        self.end.x - self.start.x
    }

    /// Signed extent along y (`end.y - start.y`).
    #[inline]
    pub fn height(self) -> f32 {
        self.end.y - self.start.y
    }

    /// Shifts both corners by `delta`.
    #[inline]
    pub fn translated(self, delta: Vec2) -> Self {
        Self::from_corners(self.start + delta, self.end + delta)
    }

    /// Multiplies every corner scalar by `factor`.
    ///
    /// Scaling is relative to the coordinate origin, not the rectangle's centre.
    #[inline]
    pub fn scaled_about_origin(self, factor: f32) -> Self {
        Self::from_corners(self.start * factor, self.end * factor)
    }

    /// Converts a pixel-space rectangle into clip space for `viewport`.
    #[inline]
    pub fn to_clip(self, viewport: Viewport) -> Self {
        Self::new(
            to_clip(self.start.x, viewport.width),
            to_clip(self.start.y, viewport.height),
            to_clip(self.end.x, viewport.width),
            to_clip(self.end.y, viewport.height),
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// `(start_x, start_y, end_x, end_y)`.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.start.x, self.start.y, self.end.x, self.end.y]
    }
}
