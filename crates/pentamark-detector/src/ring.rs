//! Ring decoder: sample the dot ring along the marker axis.
//!
//! Dots sit at roughly equal spacing between the notch and the base. The
//! axis is walked with a fixed stride, each sample index is pulled back
//! towards the notch to compensate for perspective, and every sample is
//! classified bright (`0`) or dark (`1`). Bits are collected notch-to-base,
//! which is least-significant first.

use std::fmt;
use std::str::FromStr;

use log::trace;
use nalgebra::Vector2;
use pentamark_core::{GrayImageView, PixelPoint};
use serde::{Deserialize, Serialize};

use crate::params::RingParams;

/// Axis sample indices after warp correction, in notch-to-base order.
///
/// Empty when the axis is too short for a non-zero stride.
pub fn sample_indices(path_len: usize, params: &RingParams) -> Vec<usize> {
    if path_len == 0 || params.stride_divisions == 0 {
        return Vec::new();
    }
    let stride = (path_len as f64 / params.stride_divisions as f64 * params.stride_factor) as usize;
    if stride == 0 {
        return Vec::new();
    }
    (stride..path_len)
        .step_by(stride)
        .take(params.max_bits.min(RingBits::MAX_LEN))
        .enumerate()
        .map(|(slot, center)| {
            let corrected = (center as f64 * params.slot_correction(slot)) as usize;
            corrected.min(path_len - 1)
        })
        .collect()
}

/// Sampled bits in notch-to-base order; `true` is a dark dot (`1`).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RingBits(pub Vec<bool>);

impl RingBits {
    /// Longest bit string that still fits an identifier.
    pub const MAX_LEN: usize = 16;

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reversed(&self) -> RingBits {
        RingBits(self.0.iter().rev().copied().collect())
    }

    /// Reverse the sampled string and read it most-significant bit first.
    ///
    /// Equivalently, the first sample is the least significant bit.
    pub fn identifier(&self) -> u16 {
        self.reversed()
            .0
            .iter()
            .fold(0u16, |acc, &bit| (acc << 1) | u16::from(bit))
    }
}

impl fmt::Display for RingBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RingBitsParseError {
    #[error("invalid bit character {0:?}")]
    InvalidChar(char),
    #[error("{0} bits do not fit an identifier")]
    TooLong(usize),
}

impl FromStr for RingBits {
    type Err = RingBitsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(RingBitsParseError::InvalidChar(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if bits.len() > Self::MAX_LEN {
            return Err(RingBitsParseError::TooLong(bits.len()));
        }
        Ok(RingBits(bits))
    }
}

/// One classified sample on the axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSample {
    /// Index into the axis path.
    pub index: usize,
    pub point: PixelPoint,
    /// Gray level at `point`; `None` if it fell outside the frame.
    pub intensity: Option<u8>,
    /// `true` for a dark reading.
    pub bit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingReading {
    pub samples: Vec<RingSample>,
    pub bits: RingBits,
}

impl RingReading {
    pub fn identifier(&self) -> u16 {
        self.bits.identifier()
    }
}

/// Sample `axis` on `gray`. Returns `None` when the axis yields no samples.
///
/// Samples outside the frame read as dark.
pub fn read_ring(
    axis: &[PixelPoint],
    gray: &GrayImageView<'_>,
    params: &RingParams,
) -> Option<RingReading> {
    let samples: Vec<RingSample> = sample_indices(axis.len(), params)
        .into_iter()
        .map(|index| {
            let point = axis[index];
            let intensity = gray.pixel_at(point);
            let bit = intensity.map_or(true, |v| v <= params.bright_threshold);
            trace!(
                "sample {index} at ({}, {}): {:?} -> {}",
                point.x,
                point.y,
                intensity,
                u8::from(bit)
            );
            RingSample {
                index,
                point,
                intensity,
                bit,
            }
        })
        .collect();

    if samples.is_empty() {
        return None;
    }
    let bits = RingBits(samples.iter().map(|s| s.bit).collect());
    Some(RingReading { samples, bits })
}

/// Synthetic reference position for `identifier` on the fixed circle.
pub fn reference_offset(identifier: u16, params: &RingParams) -> Vector2<f64> {
    let angle = params.angle_step_deg.to_radians() * f64::from(identifier);
    Vector2::new(
        angle.cos() * params.reference_radius,
        angle.sin() * params.reference_radius,
    )
}
