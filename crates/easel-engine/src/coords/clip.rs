use super::{Rectangle, Vec2, Viewport};

/// Converts one pixel coordinate to clip space along an axis of `dimension` pixels.
///
/// Pixel `0` maps to `-1`, pixel `dimension` maps to `1`.
#[inline]
pub fn to_clip(px: f32, dimension: f32) -> f32 {
    -1.0 + px / dimension * 2.0
}

/// Moves a clip-space value from `-1..1` into `0..2`.
///
/// Under subtraction the shift cancels out; [`drag_delta`] still applies it so
/// deltas match the historical output bit for bit.
#[inline]
pub fn shift_positive(clip: f32) -> f32 {
    1.0 + clip
}

/// Clip-space displacement between two pixel positions on `viewport`.
pub fn drag_delta(start: Vec2, end: Vec2, viewport: Viewport) -> Vec2 {
    let sx = shift_positive(to_clip(start.x, viewport.width));
    let sy = shift_positive(to_clip(start.y, viewport.height));
    let ex = shift_positive(to_clip(end.x, viewport.width));
    let ey = shift_positive(to_clip(end.y, viewport.height));
    Vec2::new(ex - sx, ey - sy)
}

/// Expresses a pixel rectangle as fractions of the surface (`0..1` per axis).
///
/// Used to derive texture-space coordinates or debug colors from a placement.
pub fn pixel_rect_to_unit(rect: Rectangle, viewport: Viewport) -> Rectangle {
    Rectangle::new(
        rect.start.x / viewport.width,
        rect.start.y / viewport.height,
        rect.end.x / viewport.width,
        rect.end.y / viewport.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    // ── to_clip ───────────────────────────────────────────────────────────

    #[test]
    fn to_clip_maps_edges_exactly() {
        for d in [1.0, 3.0, 600.0, 799.0, 1920.0] {
            assert_eq!(to_clip(0.0, d), -1.0);
            assert_eq!(to_clip(d, d), 1.0);
        }
    }

    #[test]
    fn to_clip_center_is_zero() {
        assert!(to_clip(400.0, 800.0).abs() < EPS);
        assert!(to_clip(300.0, 600.0).abs() < EPS);
    }

    #[test]
    fn to_clip_stays_in_range_for_every_pixel() {
        let d = 777.0;
        let mut px = 0.0;
        while px <= d {
            let c = to_clip(px, d);
            assert!((-1.0..=1.0).contains(&c), "px {px} -> {c}");
            px += 0.5;
        }
    }

    #[test]
    fn to_clip_is_monotonic() {
        let d = 640.0;
        let mut prev = to_clip(0.0, d);
        for i in 1..=640 {
            let c = to_clip(i as f32, d);
            assert!(c > prev);
            prev = c;
        }
    }

    // ── drag_delta ────────────────────────────────────────────────────────

    #[test]
    fn drag_delta_zero_for_same_point() {
        let vp = Viewport::new(800.0, 600.0);
        let p = Vec2::new(123.0, 456.0);
        assert_eq!(drag_delta(p, p, vp), Vec2::zero());
    }

    #[test]
    fn drag_delta_full_width_is_two() {
        let vp = Viewport::new(800.0, 600.0);
        let d = drag_delta(Vec2::new(0.0, 0.0), Vec2::new(800.0, 600.0), vp);
        assert_eq!(d, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn drag_delta_uses_width_for_x_and_height_for_y() {
        let vp = Viewport::new(800.0, 400.0);
        let d = drag_delta(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0), vp);
        assert!((d.x - 0.25).abs() < EPS);
        assert!((d.y - 0.5).abs() < EPS);
    }

    #[test]
    fn shift_does_not_change_delta() {
        let vp = Viewport::new(1024.0, 768.0);
        let (a, b) = (Vec2::new(17.0, 700.0), Vec2::new(900.5, 3.25));
        let plain = Vec2::new(
            to_clip(b.x, vp.width) - to_clip(a.x, vp.width),
            to_clip(b.y, vp.height) - to_clip(a.y, vp.height),
        );
        let shifted = drag_delta(a, b, vp);
        assert!((plain.x - shifted.x).abs() < EPS);
        assert!((plain.y - shifted.y).abs() < EPS);
    }

    #[test]
    fn drag_delta_reverses_sign() {
        let vp = Viewport::new(500.0, 500.0);
        let (a, b) = (Vec2::new(10.0, 20.0), Vec2::new(60.0, 220.0));
        let fwd = drag_delta(a, b, vp);
        let back = drag_delta(b, a, vp);
        assert!((fwd.x + back.x).abs() < EPS);
        assert!((fwd.y + back.y).abs() < EPS);
    }

    // ── pixel_rect_to_unit ────────────────────────────────────────────────

    #[test]
    fn unit_rect_is_fraction_of_surface() {
        let vp = Viewport::new(800.0, 600.0);
        let u = pixel_rect_to_unit(Rectangle::new(0.0, 150.0, 800.0, 450.0), vp);
        assert_eq!(u, Rectangle::new(0.0, 0.25, 1.0, 0.75));
    }
}
