//! Core types and utilities for pentagon fiducial marker decoding.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image library: frames are read through the
//! lightweight [`GrayImageView`], and everything else works on integer
//! pixel coordinates.

mod geometry;
mod image;
mod logger;
mod raster;

pub use geometry::{points_coincide, shoelace_area, Edge, PixelPoint, Polygon, MARKER_VERTICES};
pub use image::{GrayImage, GrayImageView, ImageViewError};
pub use raster::{rasterize_line, BresenhamLine};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV};
