//! Pentagon fiducial marker detector.
//!
//! Pipeline, run once per frame:
//! - threshold the frame and keep contours that approximate to 5-vertex polygons,
//! - find the concave notch corner from the three short polygon edges,
//! - rasterize the axis from the notch to the base midpoint,
//! - sample the dot ring along the axis and decode a 10-bit identifier.
//!
//! Decoded markers become [`MarkerRecord`] rows appended to a per-subject
//! [`MarkerLog`].

mod corner;
mod detector;
mod io;
mod overlay;
mod params;
mod record;
mod ring;
mod shape;

pub use corner::{resolve_corner, short_edge_indices, CornerResolution};
pub use detector::{gray_view, FrameDetection, MarkerDetection, MarkerDetector};
pub use io::MarkerIoError;
pub use overlay::{Overlay, OverlayError};
pub use params::{CornerParams, MarkerDetectorParams, OverlayStyle, RingParams, ShapeParams};
pub use record::{MarkerLog, MarkerLogError, MarkerRecord, RecordParseError};
pub use ring::{
    read_ring, reference_offset, sample_indices, RingBits, RingBitsParseError, RingReading,
    RingSample,
};
pub use shape::{
    approximate_closed_contour, find_marker_polygons, mask_left_columns, prepare_frame,
    prepare_gray, threshold_binary, PreparedFrame,
};

pub use pentamark_core::{PixelPoint, Polygon};
