//! Integer line rasterization (Bresenham).
//!
//! The marker axis is walked pixel by pixel from the concave corner to the
//! base midpoint. The walk iterates on the dominant axis and keeps the
//! classic decision variable for the minor axis; coordinates are projected
//! back to `(x, y)` only when a point is emitted, so steep and shallow lines
//! share one loop.

use crate::geometry::PixelPoint;

/// Slope substituted when `dx == 0` so vertical lines take the steep branch.
const VERTICAL_SLOPE: f64 = 10.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Axis {
    X,
    Y,
}

/// 8-connected pixel path between two integer points, starting at `start`.
///
/// Yields exactly `max(|dx|, |dy|) + 1` points and ends at `end`.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    dominant: Axis,
    major: i32,
    minor: i32,
    major_step: i32,
    minor_step: i32,
    d_major: i64,
    d_minor: i64,
    decision: i64,
    remaining: usize,
}

impl BresenhamLine {
    pub fn new(start: PixelPoint, end: PixelPoint) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        let slope = if dx != 0 {
            dy as f64 / dx as f64
        } else {
            VERTICAL_SLOPE
        };
        let dominant = if slope < 1.0 { Axis::X } else { Axis::Y };

        let (major, minor, major_end, minor_end) = match dominant {
            Axis::X => (start.x, start.y, end.x, end.y),
            Axis::Y => (start.y, start.x, end.y, end.x),
        };
        let d_major = (major_end as i64 - major as i64).abs();
        let d_minor = (minor_end as i64 - minor as i64).abs();

        Self {
            dominant,
            major,
            minor,
            major_step: step_towards(major, major_end),
            minor_step: step_towards(minor, minor_end),
            d_major,
            d_minor,
            decision: 2 * d_minor - d_major,
            remaining: d_major as usize + 1,
        }
    }

    #[inline]
    fn project(&self) -> PixelPoint {
        match self.dominant {
            Axis::X => PixelPoint::new(self.major, self.minor),
            Axis::Y => PixelPoint::new(self.minor, self.major),
        }
    }

    fn advance(&mut self) {
        let mut moved = 0;
        if self.decision >= 0 {
            self.minor += self.minor_step;
            moved = 1;
        }
        self.decision += 2 * self.d_minor - 2 * self.d_major * moved;
        self.major += self.major_step;
    }
}

#[inline]
fn step_towards(from: i32, to: i32) -> i32 {
    if to < from {
        -1
    } else {
        1
    }
}

impl Iterator for BresenhamLine {
    type Item = PixelPoint;

    fn next(&mut self) -> Option<PixelPoint> {
        if self.remaining == 0 {
            return None;
        }
        let p = self.project();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BresenhamLine {}

/// Collect the pixel path from `start` to `end`.
pub fn rasterize_line(start: PixelPoint, end: PixelPoint) -> Vec<PixelPoint> {
    BresenhamLine::new(start, end).collect()
}
