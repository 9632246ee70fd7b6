use serde::{Deserialize, Serialize};

/// Shape finder settings: masking, binarization and polygon filtering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Columns `0..mask_left_columns` are zeroed before thresholding.
    ///
    /// Suppresses a known region of false positives in the recorded scene.
    pub mask_left_columns: u32,
    /// Pixels strictly brighter than this become foreground.
    pub binary_threshold: u8,
    /// Contours must enclose strictly more than this many square pixels.
    pub min_area: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_frac: f64,
}

impl ShapeParams {
    pub const DEFAULT_MASK_LEFT_COLUMNS: u32 = 1200;
    pub const DEFAULT_BINARY_THRESHOLD: u8 = 190;
    pub const DEFAULT_MIN_AREA: f64 = 1200.0;
    pub const DEFAULT_APPROX_EPSILON_FRAC: f64 = 0.0155;
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            mask_left_columns: Self::DEFAULT_MASK_LEFT_COLUMNS,
            binary_threshold: Self::DEFAULT_BINARY_THRESHOLD,
            min_area: Self::DEFAULT_MIN_AREA,
            approx_epsilon_frac: Self::DEFAULT_APPROX_EPSILON_FRAC,
        }
    }
}

/// Concave-corner resolution settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerParams {
    /// Edges strictly shorter than this (pixels) are "short" notch/base edges.
    pub short_edge_max: f64,
    /// Two edge endpoints closer than this (pixels) count as the same vertex.
    pub vertex_match_eps: f64,
}

impl CornerParams {
    pub const DEFAULT_SHORT_EDGE_MAX: f64 = 80.0;
    pub const DEFAULT_VERTEX_MATCH_EPS: f64 = 0.5;
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            short_edge_max: Self::DEFAULT_SHORT_EDGE_MAX,
            vertex_match_eps: Self::DEFAULT_VERTEX_MATCH_EPS,
        }
    }
}

/// Dot-ring sampling and identifier mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingParams {
    /// The axis length is divided into this many parts before scaling.
    pub stride_divisions: u32,
    /// Sampling stride is `floor(len / stride_divisions * stride_factor)`.
    pub stride_factor: f64,
    /// Index scale applied to the first slot.
    pub first_slot_scale: f64,
    /// Index scale applied to the following slots up to `corrected_slots`.
    pub slot_scale: f64,
    /// Number of slots (counted from the first) that receive a correction.
    pub corrected_slots: usize,
    /// Samples strictly brighter than this read as bit `0`.
    pub bright_threshold: u8,
    /// Upper bound on the number of sampled bits.
    pub max_bits: usize,
    /// Radius of the reference circle identifiers are mapped onto.
    pub reference_radius: f64,
    /// Angle between consecutive identifiers on the reference circle.
    pub angle_step_deg: f64,
}

impl RingParams {
    pub const DEFAULT_STRIDE_DIVISIONS: u32 = 10;
    pub const DEFAULT_STRIDE_FACTOR: f64 = 1.95;
    pub const DEFAULT_FIRST_SLOT_SCALE: f64 = 0.9;
    pub const DEFAULT_SLOT_SCALE: f64 = 0.85;
    pub const DEFAULT_CORRECTED_SLOTS: usize = 5;
    pub const DEFAULT_BRIGHT_THRESHOLD: u8 = 180;
    pub const DEFAULT_MAX_BITS: usize = 10;
    pub const DEFAULT_REFERENCE_RADIUS: f64 = 70.0;
    pub const DEFAULT_ANGLE_STEP_DEG: f64 = -15.0;

    /// Warp-correction scale for sampling slot `slot` (0-based).
    pub fn slot_correction(&self, slot: usize) -> f64 {
        match slot {
            0 => self.first_slot_scale,
            s if s < self.corrected_slots => self.slot_scale,
            _ => 1.0,
        }
    }
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            stride_divisions: Self::DEFAULT_STRIDE_DIVISIONS,
            stride_factor: Self::DEFAULT_STRIDE_FACTOR,
            first_slot_scale: Self::DEFAULT_FIRST_SLOT_SCALE,
            slot_scale: Self::DEFAULT_SLOT_SCALE,
            corrected_slots: Self::DEFAULT_CORRECTED_SLOTS,
            bright_threshold: Self::DEFAULT_BRIGHT_THRESHOLD,
            max_bits: Self::DEFAULT_MAX_BITS,
            reference_radius: Self::DEFAULT_REFERENCE_RADIUS,
            angle_step_deg: Self::DEFAULT_ANGLE_STEP_DEG,
        }
    }
}

/// Colors and sizes for the debug overlay (RGB).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub candidate_color: [u8; 3],
    pub corner_color: [u8; 3],
    pub sample_color: [u8; 3],
    pub corner_radius: i32,
    pub sample_radius: i32,
    /// Pixel height of the identifier label.
    pub label_scale: f32,
    /// Offset (pixels) of the dark outline drawn behind the label.
    pub label_outline: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            candidate_color: [0, 255, 0],
            corner_color: [255, 0, 0],
            sample_color: [0, 0, 255],
            corner_radius: 3,
            sample_radius: 1,
            label_scale: 24.0,
            label_outline: 2,
        }
    }
}

/// Full detector configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetectorParams {
    #[serde(default)]
    pub shape: ShapeParams,
    #[serde(default)]
    pub corner: CornerParams,
    #[serde(default)]
    pub ring: RingParams,
    #[serde(default)]
    pub overlay: OverlayStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_correction_follows_the_warp_table() {
        let ring = RingParams::default();
        let scales: Vec<f64> = (0..7).map(|s| ring.slot_correction(s)).collect();
        assert_eq!(scales, vec![0.9, 0.85, 0.85, 0.85, 0.85, 1.0, 1.0]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: MarkerDetectorParams =
            serde_json::from_str(r#"{ "shape": { "mask_left_columns": 0 } }"#).unwrap();
        assert_eq!(params.shape.mask_left_columns, 0);
        assert_eq!(params.shape.binary_threshold, 190);
        assert_eq!(params.ring, RingParams::default());
    }
}
