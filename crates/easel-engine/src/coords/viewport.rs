/// Size of the rendering surface in pixels.
///
/// This is the basis for every pixel -> clip conversion: x is divided by
/// `width`, y by `height`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. Callers should check [`is_valid`](Self::is_valid) first.
    #[inline]
    pub fn aspect(self) -> f32 {
        self.width / self.height
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
