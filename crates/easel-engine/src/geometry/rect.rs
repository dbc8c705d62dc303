use crate::coords::Rectangle;

/// Vertices emitted per rectangle (two triangles).
pub const RECT_VERTICES: usize = 6;

/// Floats emitted per rectangle.
pub const RECT_FLOATS: usize = RECT_VERTICES * 2;

/// Two triangles covering `[start_x, end_x] x [start_y, end_y]`.
///
/// Order is fixed: `(s,s) (e,s) (s,e)` then `(s,e) (e,e) (e,s)`. Renderers
/// run without face culling, but the order is part of the output contract.
#[inline]
pub fn prepare_rect(start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> [f32; RECT_FLOATS] {
    [
        start_x, start_y, end_x, start_y, start_x, end_y, //
        start_x, end_y, end_x, end_y, end_x, start_y,
    ]
}

/// [`prepare_rect`] over a [`Rectangle`].
#[inline]
pub fn rect_vertices(rect: Rectangle) -> [f32; RECT_FLOATS] {
    prepare_rect(rect.start.x, rect.start.y, rect.end.x, rect.end.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_area(v: &[f32]) -> f32 {
        let (ax, ay, bx, by, cx, cy) = (v[0], v[1], v[2], v[3], v[4], v[5]);
        ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs() / 2.0
    }

    #[test]
    fn emits_twelve_floats_in_fixed_order() {
        let v = prepare_rect(1.0, 2.0, 3.0, 4.0);
        assert_eq!(v.len(), 12);
        assert_eq!(
            v,
            [1.0, 2.0, 3.0, 2.0, 1.0, 4.0, 1.0, 4.0, 3.0, 4.0, 3.0, 2.0]
        );
    }

    #[test]
    fn triangles_tile_rect_without_overlap() {
        let (sx, sy, ex, ey) = (-0.75, -0.5, 0.25, 0.9);
        let v = prepare_rect(sx, sy, ex, ey);
        let area = (ex - sx) * (ey - sy);

        let a0 = tri_area(&v[0..6]);
        let a1 = tri_area(&v[6..12]);
        assert!((a0 - area / 2.0).abs() < 1e-6);
        assert!((a1 - area / 2.0).abs() < 1e-6);

        // The two triangles share exactly the (e,s)-(s,e) diagonal, so the
        // halves meet with no gap and no overlap.
        let diag_a = [(v[2], v[3]), (v[4], v[5])];
        let diag_b = [(v[10], v[11]), (v[6], v[7])];
        assert_eq!(diag_a, diag_b);
    }

    #[test]
    fn every_vertex_is_a_corner() {
        let (sx, sy, ex, ey) = (10.0, 20.0, 30.0, 40.0);
        let v = prepare_rect(sx, sy, ex, ey);
        for p in v.chunks(2) {
            assert!(p[0] == sx || p[0] == ex);
            assert!(p[1] == sy || p[1] == ey);
        }
    }

    #[test]
    fn rect_vertices_matches_scalar_form() {
        let r = Rectangle::new(-1.0, -1.0, 1.0, 1.0);
        assert_eq!(rect_vertices(r), prepare_rect(-1.0, -1.0, 1.0, 1.0));
    }
}
