//! Shape finder: binarize a frame and extract 5-vertex marker silhouettes.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::find_contours;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use log::{debug, trace};
use pentamark_core::{shoelace_area, PixelPoint, Polygon, MARKER_VERTICES};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::ShapeParams;

/// Grayscale and binary versions of one frame.
///
/// `gray` already carries the column mask; the ring decoder samples it.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    pub gray: GrayImage,
    pub binary: GrayImage,
}

/// Convert, mask and threshold a color frame.
pub fn prepare_frame(frame: &RgbImage, params: &ShapeParams) -> PreparedFrame {
    prepare_gray(image::imageops::grayscale(frame), params)
}

/// Mask and threshold an already grayscale frame.
pub fn prepare_gray(mut gray: GrayImage, params: &ShapeParams) -> PreparedFrame {
    mask_left_columns(&mut gray, params.mask_left_columns);
    let binary = threshold_binary(&gray, params.binary_threshold);
    PreparedFrame { gray, binary }
}

/// Zero every pixel in columns `0..columns`.
pub fn mask_left_columns(gray: &mut GrayImage, columns: u32) {
    let cols = columns.min(gray.width());
    if cols == 0 {
        return;
    }
    for (x, _, px) in gray.enumerate_pixels_mut() {
        if x < cols {
            *px = Luma([0]);
        }
    }
}

/// `255` where the input is strictly brighter than `threshold`, else `0`.
pub fn threshold_binary(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = gray.clone();
    for px in out.pixels_mut() {
        px.0[0] = if px.0[0] > threshold { 255 } else { 0 };
    }
    out
}

/// Every contour of `binary` that approximates to a 5-vertex polygon
/// enclosing more than `min_area`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(binary, params), fields(width = binary.width(), height = binary.height()))
)]
pub fn find_marker_polygons(binary: &GrayImage, params: &ShapeParams) -> Vec<Polygon> {
    let contours = find_contours::<i32>(binary);
    let total = contours.len();
    let polygons: Vec<Polygon> = contours
        .iter()
        .filter_map(|c| candidate_polygon(&c.points, params))
        .collect();
    debug!(
        "{} of {} contours approximate to marker polygons",
        polygons.len(),
        total
    );
    polygons
}

fn candidate_polygon(points: &[Point<i32>], params: &ShapeParams) -> Option<Polygon> {
    if points.len() < MARKER_VERTICES {
        return None;
    }
    let outline: Vec<PixelPoint> = points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    let area = shoelace_area(&outline);
    if area <= params.min_area {
        return None;
    }

    let epsilon = params.approx_epsilon_frac * arc_length(points, true);
    let vertices = approximate_closed_contour(points, epsilon);
    if vertices.len() != MARKER_VERTICES {
        trace!(
            "rejecting contour (area {:.0}): {} vertices",
            area,
            vertices.len()
        );
        return None;
    }
    Some(Polygon::new(vertices))
}

/// Douglas-Peucker approximation of a closed contour.
///
/// The contour is split at the point farthest from its first point and both
/// halves are simplified as open curves, so the closing segment is treated
/// like any other and no vertex is repeated.
pub fn approximate_closed_contour(points: &[Point<i32>], epsilon: f64) -> Vec<PixelPoint> {
    let to_pixel = |p: &Point<i32>| PixelPoint::new(p.x, p.y);
    if points.len() < 3 || epsilon.is_nan() || epsilon <= 0.0 {
        return points.iter().map(to_pixel).collect();
    }

    let first = points[0];
    let (split, far) = points
        .iter()
        .enumerate()
        .fold((0usize, 0i64), |best, (i, p)| {
            let dx = (p.x - first.x) as i64;
            let dy = (p.y - first.y) as i64;
            let d2 = dx * dx + dy * dy;
            if d2 > best.1 {
                (i, d2)
            } else {
                best
            }
        });
    if far == 0 {
        return vec![to_pixel(&first)];
    }

    let head = approximate_polygon_dp(&points[..=split], epsilon, false);
    let mut tail_curve = points[split..].to_vec();
    tail_curve.push(first);
    let tail = approximate_polygon_dp(&tail_curve, epsilon, false);

    // head ends at the split point, which tail starts with; tail ends at `first`.
    let inner_tail = tail.len().saturating_sub(1);
    head.iter()
        .chain(tail.get(1..inner_tail).unwrap_or(&[]))
        .map(to_pixel)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_polygon_mut;

    fn pt(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    #[test]
    fn mask_zeroes_only_the_left_columns() {
        let mut gray = GrayImage::from_pixel(6, 2, Luma([200]));
        mask_left_columns(&mut gray, 4);
        assert_eq!(gray.get_pixel(3, 1)[0], 0);
        assert_eq!(gray.get_pixel(4, 1)[0], 200);

        let mut narrow = GrayImage::from_pixel(3, 1, Luma([9]));
        mask_left_columns(&mut narrow, 1200);
        assert!(narrow.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn threshold_is_strict() {
        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(0, 0, Luma([190]));
        gray.put_pixel(1, 0, Luma([191]));
        gray.put_pixel(2, 0, Luma([12]));
        let bin = threshold_binary(&gray, 190);
        let values: Vec<u8> = bin.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 255, 0]);
    }

    #[test]
    fn closed_square_outline_keeps_four_corners() {
        let mut outline = Vec::new();
        for x in 0..20 {
            outline.push(pt(x, 0));
        }
        for y in 0..20 {
            outline.push(pt(20, y));
        }
        for x in (1..=20).rev() {
            outline.push(pt(x, 20));
        }
        for y in (1..=20).rev() {
            outline.push(pt(0, y));
        }

        let mut corners = approximate_closed_contour(&outline, 1.0);
        corners.sort_by_key(|p| (p.x, p.y));
        assert_eq!(
            corners,
            vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(0, 20),
                PixelPoint::new(20, 0),
                PixelPoint::new(20, 20)
            ]
        );
    }

    #[test]
    fn degenerate_inputs_are_passed_through() {
        let two = [pt(1, 1), pt(2, 2)];
        assert_eq!(approximate_closed_contour(&two, 3.0).len(), 2);
        let same = [pt(4, 4), pt(4, 4), pt(4, 4)];
        assert_eq!(approximate_closed_contour(&same, 1.0), vec![PixelPoint::new(4, 4)]);
    }

    #[test]
    fn finds_a_notched_pentagon_and_skips_small_or_boxy_shapes() {
        let mut binary = GrayImage::new(320, 260);
        let white = Luma([255u8]);
        draw_polygon_mut(
            &mut binary,
            &[pt(100, 100), pt(140, 60), pt(130, 200), pt(70, 200), pt(60, 60)],
            white,
        );
        // Too small to count.
        draw_polygon_mut(
            &mut binary,
            &[pt(200, 20), pt(220, 15), pt(230, 30), pt(215, 45), pt(198, 35)],
            white,
        );
        // Large but four-sided.
        draw_polygon_mut(
            &mut binary,
            &[pt(200, 100), pt(300, 100), pt(300, 220), pt(200, 220)],
            white,
        );

        let polygons = find_marker_polygons(&binary, &ShapeParams::default());
        assert_eq!(polygons.len(), 1);
        let poly = &polygons[0];
        assert_eq!(poly.len(), 5);
        assert!(poly.vertices.contains(&PixelPoint::new(100, 100)));
        assert!((poly.area() - 8200.0).abs() < 600.0);
    }
}
