//! High-level facade crate for the `pentamark-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core and detector crates
//! - (feature `image`) end-to-end helpers that take a color frame or a raw
//!   RGB buffer, decode every marker, optionally annotate the frame and append
//!   the resulting rows to a per-subject log.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pentamark::detect;
//! use pentamark::{MarkerDetector, MarkerLog};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frame = ImageReader::open("frame_0000.png")?.decode()?.to_rgb8();
//! let detector = MarkerDetector::default();
//! let mut log = MarkerLog::for_subject(".", "1");
//!
//! let records = detect::process_frame(&mut frame, 0, &detector, None, &mut log)?;
//! println!("decoded {} markers", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pentamark::core`: pixel geometry, gray views, the axis rasterizer, logging.
//! - `pentamark::detector`: shape finder, corner resolver, ring decoder, records.
//! - `pentamark::detect` (feature `image`): per-frame helpers from `image::RgbImage`.

pub use pentamark_core as core;
pub use pentamark_detector as detector;

pub use pentamark_core::{rasterize_line, PixelPoint, Polygon};
pub use pentamark_detector::{
    FrameDetection, MarkerDetection, MarkerDetector, MarkerDetectorParams, MarkerLog,
    MarkerRecord, Overlay,
};

#[cfg(feature = "image")]
pub mod detect;
