use nalgebra::Point2;

/// Four corners of a detected board boundary, in no particular order.
///
/// Contour extraction gives no ordering guarantee, so a `Quad` must be
/// turned into an [`OrderedQuad`] before it can drive a rectification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub points: [Point2<f32>; 4],
}

/// Corners in (top-left, top-right, bottom-right, bottom-left) order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedQuad {
    pub tl: Point2<f32>,
    pub tr: Point2<f32>,
    pub br: Point2<f32>,
    pub bl: Point2<f32>,
}

impl Quad {
    pub fn new(points: [Point2<f32>; 4]) -> Self {
        Self { points }
    }

    /// Order the corners deterministically.
    ///
    /// The four points are split by x-coordinate: the smallest two form
    /// the left edge, the largest two the right edge; within each edge
    /// the smaller y is the top corner.
    ///
    /// Precondition: the split is only well defined when the 2nd and 3rd
    /// points by x do not share an x-coordinate. For near-axis-aligned
    /// degenerate quads the left/right assignment of the tied pair is
    /// unspecified (the sort is stable, so the result is still
    /// deterministic for a given input order).
    pub fn ordered(&self) -> OrderedQuad {
        let mut by_x = self.points;
        by_x.sort_by(|a, b| a.x.total_cmp(&b.x));

        let (mut left, mut right) = ([by_x[0], by_x[1]], [by_x[2], by_x[3]]);
        left.sort_by(|a, b| a.y.total_cmp(&b.y));
        right.sort_by(|a, b| a.y.total_cmp(&b.y));

        OrderedQuad {
            tl: left[0],
            tr: right[0],
            br: right[1],
            bl: left[1],
        }
    }
}

impl OrderedQuad {
    /// Source corners as an array, matching the target rectangle order
    /// `[(0,0), (w,0), (w,h), (0,h)]`.
    pub fn as_array(&self) -> [Point2<f32>; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Vertical extent of the left edge, in pixels.
    pub fn left_span(&self) -> f32 {
        (self.bl.y - self.tl.y).abs()
    }

    /// Vertical extent of the right edge, in pixels.
    pub fn right_span(&self) -> f32 {
        (self.br.y - self.tr.y).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_shuffled_corners() {
        // A tilted quad, corners deliberately shuffled.
        let q = Quad::new([
            Point2::new(310.0, 250.0), // br
            Point2::new(12.0, 8.0),    // tl
            Point2::new(20.0, 240.0),  // bl
            Point2::new(300.0, 15.0),  // tr
        ]);
        let o = q.ordered();
        assert_eq!(o.tl, Point2::new(12.0, 8.0));
        assert_eq!(o.tr, Point2::new(300.0, 15.0));
        assert_eq!(o.br, Point2::new(310.0, 250.0));
        assert_eq!(o.bl, Point2::new(20.0, 240.0));
    }

    #[test]
    fn spans_measure_vertical_extent() {
        let o = Quad::new([
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 10.0),
            Point2::new(100.0, 90.0),
            Point2::new(0.0, 95.0),
        ])
        .ordered();
        assert_eq!(o.left_span(), 95.0);
        assert_eq!(o.right_span(), 80.0);
    }
}
