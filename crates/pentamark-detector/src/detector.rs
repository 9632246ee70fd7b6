use image::{GrayImage, RgbImage};
use log::debug;
use nalgebra::Vector2;
use pentamark_core::{rasterize_line, GrayImageView, PixelPoint, Polygon};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::corner::resolve_corner;
use crate::params::MarkerDetectorParams;
use crate::record::MarkerRecord;
use crate::ring::{read_ring, reference_offset, RingBits, RingSample};
use crate::shape::{find_marker_polygons, prepare_frame, prepare_gray, PreparedFrame};

/// One decoded marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// Index of the source polygon in [`FrameDetection::candidates`].
    pub polygon_index: usize,
    pub concave_corner: PixelPoint,
    pub axis_endpoint: PixelPoint,
    /// Rasterized axis, starting at the concave corner.
    pub axis: Vec<PixelPoint>,
    pub samples: Vec<RingSample>,
    /// Bits in sampling order (before reversal).
    pub bits: RingBits,
    pub identifier: u16,
    pub reference_offset: Vector2<f64>,
}

impl MarkerDetection {
    pub fn record(&self, frame_index: u64) -> MarkerRecord {
        MarkerRecord {
            frame_index,
            identifier: self.identifier,
            anchor: self.axis.first().copied().unwrap_or(self.concave_corner),
            offset: self.reference_offset,
        }
    }
}

/// Everything found in one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    pub frame_index: u64,
    /// Every 5-vertex polygon that passed the shape filter.
    pub candidates: Vec<Polygon>,
    pub markers: Vec<MarkerDetection>,
}

impl FrameDetection {
    pub fn records(&self) -> Vec<MarkerRecord> {
        self.markers
            .iter()
            .map(|m| m.record(self.frame_index))
            .collect()
    }
}

/// Per-frame marker detector.
///
/// Frames are independent: the detector holds no state besides its
/// parameters and may be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct MarkerDetector {
    params: MarkerDetectorParams,
}

impl MarkerDetector {
    pub fn new(params: MarkerDetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MarkerDetectorParams {
        &self.params
    }

    /// Detect and decode every marker in a color frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(&self, frame: &RgbImage, frame_index: u64) -> FrameDetection {
        let prepared = prepare_frame(frame, &self.params.shape);
        self.detect_prepared(&prepared, frame_index)
    }

    /// Same as [`MarkerDetector::detect`] for a frame that is already grayscale.
    pub fn detect_gray(&self, gray: &GrayImage, frame_index: u64) -> FrameDetection {
        let prepared = prepare_gray(gray.clone(), &self.params.shape);
        self.detect_prepared(&prepared, frame_index)
    }

    /// Run corner resolution and ring decoding on a masked, thresholded frame.
    pub fn detect_prepared(&self, prepared: &PreparedFrame, frame_index: u64) -> FrameDetection {
        let candidates = find_marker_polygons(&prepared.binary, &self.params.shape);
        let gray = gray_view(&prepared.gray);

        let markers: Vec<MarkerDetection> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, poly)| self.decode_polygon(i, poly, &gray))
            .collect();

        debug!(
            "frame {}: {} candidates, {} markers",
            frame_index,
            candidates.len(),
            markers.len()
        );
        FrameDetection {
            frame_index,
            candidates,
            markers,
        }
    }

    /// Resolve, rasterize and decode a single candidate polygon.
    ///
    /// Returns `None` when the polygon has no resolvable notch or its axis is
    /// too short to sample.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, polygon, gray))
    )]
    pub fn decode_polygon(
        &self,
        polygon_index: usize,
        polygon: &Polygon,
        gray: &GrayImageView<'_>,
    ) -> Option<MarkerDetection> {
        if !polygon.is_marker_candidate() {
            debug!(
                "polygon {polygon_index}: {} vertices, skipping",
                polygon.len()
            );
            return None;
        }
        let corner = resolve_corner(polygon, &self.params.corner)?;
        let axis = rasterize_line(corner.concave_corner, corner.axis_endpoint);
        let Some(reading) = read_ring(&axis, gray, &self.params.ring) else {
            debug!(
                "polygon {polygon_index}: axis of {} px is too short to sample",
                axis.len()
            );
            return None;
        };

        let identifier = reading.identifier();
        debug!(
            "polygon {polygon_index}: corner ({}, {}), bits {} -> id {identifier}",
            corner.concave_corner.x, corner.concave_corner.y, reading.bits
        );
        Some(MarkerDetection {
            polygon_index,
            concave_corner: corner.concave_corner,
            axis_endpoint: corner.axis_endpoint,
            axis,
            samples: reading.samples,
            bits: reading.bits,
            identifier,
            reference_offset: reference_offset(identifier, &self.params.ring),
        })
    }
}

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(gray: &GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: gray.width() as usize,
        height: gray.height() as usize,
        data: gray.as_raw(),
    }
}
