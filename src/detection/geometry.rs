use crate::models::{Quad, Rect};

/// Axis-aligned bounding rectangle of a detected quad.
///
/// Coordinates are truncated to integers before the extremes are taken, so
/// the result does not depend on corner order and rotation is discarded.
pub fn to_rect(quad: &Quad) -> Rect {
    let mut points = quad.points().iter().map(|p| (p.x as i32, p.y as i32));
    // A quad always has four points.
    let (x0, y0) = points.next().unwrap_or_default();
    let init = Rect::new(x0, y0, x0, y0);

    points.fold(init, |rect, (x, y)| Rect {
        left: rect.left.min(x),
        top: rect.top.min(y),
        right: rect.right.max(x),
        bottom: rect.bottom.max(y),
    })
}

/// Clamp a rectangle to an image of the given size and return it as
/// `(x, y, width, height)` for cropping. `None` if nothing is left.
pub fn clamp_to_image(rect: &Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let left = rect.left.max(0) as i64;
    let top = rect.top.max(0) as i64;
    let right = (rect.right as i64).min(width as i64);
    let bottom = (rect.bottom as i64).min(height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn quad(points: [(f32, f32); 4]) -> Quad {
        Quad::new(points.map(|(x, y)| Point::new(x, y)))
    }

    #[test]
    fn rect_is_invariant_to_point_order() {
        let corners = [(10.0, 20.0), (50.0, 18.0), (52.0, 40.0), (12.0, 42.0)];
        let expected = Rect::new(10, 18, 52, 42);

        let mut order = [0usize, 1, 2, 3];
        // Walk every permutation of the four corners (Heap's algorithm).
        let mut c = [0usize; 4];
        assert_eq!(to_rect(&quad(order.map(|i| corners[i]))), expected);
        let mut i = 0;
        while i < 4 {
            if c[i] < i {
                if i % 2 == 0 {
                    order.swap(0, i);
                } else {
                    order.swap(c[i], i);
                }
                assert_eq!(to_rect(&quad(order.map(|i| corners[i]))), expected);
                c[i] += 1;
                i = 0;
            } else {
                c[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn rotated_box_becomes_enclosing_rect() {
        let rect = to_rect(&quad([(30.0, 0.0), (60.0, 30.0), (30.0, 60.0), (0.0, 30.0)]));
        assert_eq!(rect, Rect::new(0, 0, 60, 60));
    }

    #[test]
    fn fractional_coordinates_truncate() {
        let rect = to_rect(&quad([(1.9, 2.7), (9.99, 2.1), (9.5, 7.8), (1.2, 7.01)]));
        assert_eq!(rect, Rect::new(1, 2, 9, 7));
    }

    #[test]
    fn clamp_drops_rects_outside_image() {
        assert_eq!(clamp_to_image(&Rect::new(-2, -2, 5, 5), 10, 10), Some((0, 0, 5, 5)));
        assert_eq!(clamp_to_image(&Rect::new(8, 8, 20, 20), 10, 10), Some((8, 8, 2, 2)));
        assert_eq!(clamp_to_image(&Rect::new(12, 0, 20, 5), 10, 10), None);
    }
}
