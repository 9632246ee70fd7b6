//! Corner resolver: locate the concave notch vertex of a marker polygon.
//!
//! A marker silhouette has two long sides and three short ones: the two
//! sides of the notch and the base opposite to it. The notch vertex is the
//! endpoint shared by two short sides; the remaining short side is the base,
//! and its midpoint closes the marker axis.

use log::{debug, trace};
use pentamark_core::{PixelPoint, Polygon};

use crate::params::CornerParams;

/// Number of short sides a marker polygon is expected to have.
const SHORT_SIDES: usize = 3;

/// Result of a successful corner resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct CornerResolution {
    /// The notch vertex ("point A"), start of the marker axis.
    pub concave_corner: PixelPoint,
    /// Floor-averaged midpoint of the base edge, end of the marker axis.
    pub axis_endpoint: PixelPoint,
    /// Indices of every edge shorter than the cutoff, in polygon order.
    pub short_edges: Vec<usize>,
    /// The two short edges meeting at the notch.
    pub corner_edges: [usize; 2],
    /// The short edge whose midpoint is the axis endpoint.
    pub base_edge: usize,
}

/// Indices of edges strictly shorter than `max_len`, in polygon order.
pub fn short_edge_indices(polygon: &Polygon, max_len: f64) -> Vec<usize> {
    polygon
        .edges()
        .filter(|e| e.length() < max_len)
        .map(|e| e.index)
        .collect()
}

/// Find the concave corner and axis endpoint of `polygon`.
///
/// Short edges are visited in polygon order; entry `k` is paired with entry
/// `(k + 1) mod 3` and, on a shared endpoint, entry `(k + 2) mod 3` becomes
/// the base. The first pairing that matches wins, even if a later one would
/// match as well. Fewer than three short edges yield `None`.
pub fn resolve_corner(polygon: &Polygon, params: &CornerParams) -> Option<CornerResolution> {
    if polygon.is_empty() {
        return None;
    }
    let short_edges = short_edge_indices(polygon, params.short_edge_max);
    if short_edges.len() < SHORT_SIDES {
        debug!(
            "polygon has {} short edges, need {}",
            short_edges.len(),
            SHORT_SIDES
        );
        return None;
    }

    for (k, &side) in short_edges.iter().enumerate() {
        let partner = short_edges[(k + 1) % SHORT_SIDES];
        let first = polygon.edge(side);
        let second = polygon.edge(partner);

        let Some(corner) = first.shared_vertex(&second, params.vertex_match_eps) else {
            trace!("short edges {side} and {partner} do not meet");
            continue;
        };

        let base_edge = short_edges[(k + 2) % SHORT_SIDES];
        let axis_endpoint = polygon.edge(base_edge).midpoint();
        trace!(
            "edges {side} and {partner} meet at ({}, {}); base edge {base_edge}",
            corner.x,
            corner.y
        );
        return Some(CornerResolution {
            concave_corner: corner,
            axis_endpoint,
            short_edges,
            corner_edges: [side, partner],
            base_edge,
        });
    }

    debug!("no pair of short edges shares a vertex");
    None
}
