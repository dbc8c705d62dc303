use std::f32::consts::TAU;

use crate::coords::{Vec2, Viewport};

/// Samples `num_points` equally spaced angles over `[0, 2π)` around `center`.
///
/// The vertical radius is `radius_x * viewport.aspect()` so the shape reads as
/// round on non-square surfaces. With `as_line_segments`, every rim point is
/// preceded by `center`, giving `num_points` disjoint centre-to-rim segments
/// (a `LineList`), not a closed outline.
pub fn circle_points(
    center: Vec2,
    radius_x: f32,
    num_points: usize,
    as_line_segments: bool,
    viewport: Viewport,
) -> Vec<Vec2> {
    let radius_y = radius_x / viewport.height * viewport.width;
    let per_point = if as_line_segments { 2 } else { 1 };
    let mut out = Vec::with_capacity(num_points * per_point);

    for i in 0..num_points {
        let angle = TAU * (i as f32 / num_points as f32);
        let rim = Vec2::new(
            center.x + radius_x * angle.cos(),
            center.y + radius_y * angle.sin(),
        );
        if as_line_segments {
            out.push(center);
        }
        out.push(rim);
    }

    out
}

/// Triangle list fanning out from `center`: `(center, p_i, p_{i+1})` for `steps` slices.
///
/// The radius is the same on both axes; the last slice closes back onto the first rim point.
pub fn fan_triangles(center: Vec2, radius: f32, steps: usize) -> Vec<Vec2> {
    let rim = |i: usize| {
        let angle = i as f32 / steps as f32 * TAU;
        Vec2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
    };

    (0..steps).flat_map(|i| [center, rim(i), rim(i + 1)]).collect()
}

/// Flattens points into `x, y, x, y, ...`.
pub fn flatten(points: &[Vec2]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: Viewport = Viewport::new(600.0, 600.0);

    #[test]
    fn outline_has_one_point_per_sample() {
        let pts = circle_points(Vec2::zero(), 0.3, 500, false, SQUARE);
        assert_eq!(pts.len(), 500);
    }

    #[test]
    fn segments_alternate_center_and_rim() {
        let c = Vec2::new(0.1, -0.2);
        let pts = circle_points(c, 0.27, 60, true, SQUARE);
        assert_eq!(pts.len(), 120);
        for pair in pts.chunks(2) {
            assert_eq!(pair[0], c);
            assert_ne!(pair[1], c);
        }
    }

    #[test]
    fn first_sample_is_at_angle_zero() {
        let pts = circle_points(Vec2::zero(), 0.5, 8, false, SQUARE);
        assert_eq!(pts[0], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn vertical_radius_follows_aspect() {
        let wide = Viewport::new(800.0, 400.0);
        // Quarter turn with 4 samples lands on the top of the ellipse.
        let pts = circle_points(Vec2::zero(), 0.25, 4, false, wide);
        assert!((pts[1].y - 0.5).abs() < 1e-6);
        assert!(pts[1].x.abs() < 1e-6);
    }

    #[test]
    fn samples_never_repeat_the_start_angle() {
        let pts = circle_points(Vec2::zero(), 1.0, 12, false, SQUARE);
        let last = pts[11];
        assert!((last.x - pts[0].x).abs() > 1e-3 || (last.y - pts[0].y).abs() > 1e-3);
    }

    #[test]
    fn zero_points_is_empty() {
        assert!(circle_points(Vec2::zero(), 1.0, 0, true, SQUARE).is_empty());
    }

    #[test]
    fn fan_emits_three_vertices_per_step() {
        let fan = fan_triangles(Vec2::zero(), 0.27, 60);
        assert_eq!(fan.len(), 180);
        assert!(fan.chunks(3).all(|t| t[0] == Vec2::zero()));
        // Consecutive slices share their rim edge.
        assert_eq!(fan[2], fan[4]);
    }

    #[test]
    fn flatten_interleaves_components() {
        let flat = flatten(&[Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
