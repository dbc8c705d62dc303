use crate::coords::{Rectangle, Viewport};

/// Which viewport axis the content fills completely.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Fit {
    /// Content is relatively narrower: full height, centred horizontally (pillarbox).
    Height,
    /// Content is relatively wider: full width, centred vertically (letterbox).
    Width,
    /// Aspect ratios match: the content fills the viewport.
    Exact,
}

/// Places `content_w x content_h` inside `viewport`, preserving aspect ratio.
///
/// Returns the placement in pixel space; run it through
/// [`Rectangle::to_clip`] before using it as geometry.
pub fn letterbox(content_w: f32, content_h: f32, viewport: Viewport) -> Rectangle {
    letterbox_fit(content_w, content_h, viewport).0
}

/// [`letterbox`] that also reports which axis was fitted.
pub fn letterbox_fit(content_w: f32, content_h: f32, viewport: Viewport) -> (Rectangle, Fit) {
    let Viewport { width, height } = viewport;
    let content_ar = content_w / content_h;
    let viewport_ar = width / height;

    let (x1, y1, render_w, render_h, fit) = if content_ar < viewport_ar {
        let render_w = content_w * (height / content_h);
        ((width - render_w) / 2.0, 0.0, render_w, height, Fit::Height)
    } else if content_ar > viewport_ar {
        let render_h = content_h * (width / content_w);
        (0.0, (height - render_h) / 2.0, width, render_h, Fit::Width)
    } else {
        (0.0, 0.0, width, height, Fit::Exact)
    };

    (Rectangle::new(x1, y1, x1 + render_w, y1 + render_h), fit)
}
