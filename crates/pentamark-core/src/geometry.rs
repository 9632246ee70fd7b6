//! Integer polygon geometry used by the marker pipeline.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate `(x, y)`.
pub type PixelPoint = Point2<i32>;

/// Number of vertices a marker silhouette approximates to.
pub const MARKER_VERTICES: usize = 5;

/// `true` when `a` and `b` are within `eps` pixels of each other.
///
/// With integer vertices any `eps < 1.0` is exact equality.
#[inline]
pub fn points_coincide(a: PixelPoint, b: PixelPoint, eps: f64) -> bool {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy <= eps * eps
}

/// Absolute area enclosed by a closed point sequence (shoelace formula).
pub fn shoelace_area(points: &[PixelPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice.abs() as f64 * 0.5
}

/// One side of a [`Polygon`], from vertex `index` to vertex `index + 1 (mod N)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    pub index: usize,
    pub start: PixelPoint,
    pub end: PixelPoint,
}

impl Edge {
    /// Euclidean length in pixels.
    pub fn length(&self) -> f64 {
        let dx = (self.end.x - self.start.x) as f64;
        let dy = (self.end.y - self.start.y) as f64;
        dx.hypot(dy)
    }

    /// Integer midpoint, each coordinate floor-averaged.
    pub fn midpoint(&self) -> PixelPoint {
        PixelPoint::new(
            (self.start.x + self.end.x).div_euclid(2),
            (self.start.y + self.end.y).div_euclid(2),
        )
    }

    /// Endpoint shared with `other`, if any.
    ///
    /// `self.start` is tested first (against both endpoints of `other`), then
    /// `self.end`, so the result is deterministic when the edges are
    /// degenerate.
    pub fn shared_vertex(&self, other: &Edge, eps: f64) -> Option<PixelPoint> {
        if points_coincide(self.start, other.start, eps)
            || points_coincide(self.start, other.end, eps)
        {
            Some(self.start)
        } else if points_coincide(self.end, other.start, eps)
            || points_coincide(self.end, other.end, eps)
        {
            Some(self.end)
        } else {
            None
        }
    }
}

/// Cyclic polygon: edge `i` joins vertex `i` to vertex `(i + 1) mod N`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<PixelPoint>,
}

impl Polygon {
    pub fn new(vertices: Vec<PixelPoint>) -> Self {
        Self { vertices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex `i`, wrapping around. Panics on an empty polygon.
    #[inline]
    pub fn vertex(&self, i: usize) -> PixelPoint {
        self.vertices[i % self.vertices.len()]
    }

    /// Edge `i`, wrapping around. Panics on an empty polygon.
    pub fn edge(&self, i: usize) -> Edge {
        let index = i % self.vertices.len();
        Edge {
            index,
            start: self.vertex(index),
            end: self.vertex(index + 1),
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertices.len()).map(|i| self.edge(i))
    }

    /// Enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        shoelace_area(&self.vertices)
    }

    /// Exactly [`MARKER_VERTICES`] vertices.
    pub fn is_marker_candidate(&self) -> bool {
        self.vertices.len() == MARKER_VERTICES
    }
}
