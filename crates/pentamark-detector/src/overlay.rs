//! Debug annotations drawn onto the color frame.
//!
//! Purely visual: nothing here feeds back into decoding.

use std::path::Path;

use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};
use pentamark_core::Polygon;

use crate::detector::{FrameDetection, MarkerDetection};
use crate::params::OverlayStyle;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

const LABEL_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

/// Draws candidate outlines, notch corners, ring samples and identifiers.
///
/// Identifiers are only drawn when a font is supplied.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    pub style: OverlayStyle,
    pub font: Option<FontArc>,
}

impl Overlay {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Read a TrueType/OpenType font for identifier labels.
    pub fn load_font(path: impl AsRef<Path>) -> Result<FontArc, OverlayError> {
        let bytes = std::fs::read(path)?;
        Ok(FontArc::try_from_vec(bytes)?)
    }

    pub fn draw_candidates(&self, image: &mut RgbImage, candidates: &[Polygon]) {
        let color = Rgb(self.style.candidate_color);
        for poly in candidates {
            for edge in poly.edges() {
                draw_line_segment_mut(
                    image,
                    (edge.start.x as f32, edge.start.y as f32),
                    (edge.end.x as f32, edge.end.y as f32),
                    color,
                );
            }
        }
    }

    pub fn draw_marker(&self, image: &mut RgbImage, marker: &MarkerDetection) {
        let style = &self.style;
        let corner = (marker.concave_corner.x, marker.concave_corner.y);
        draw_filled_circle_mut(image, corner, style.corner_radius, Rgb(style.corner_color));
        for sample in &marker.samples {
            draw_filled_circle_mut(
                image,
                (sample.point.x, sample.point.y),
                style.sample_radius,
                Rgb(style.sample_color),
            );
        }

        let Some(font) = &self.font else {
            return;
        };
        let text = marker.identifier.to_string();
        let x = corner.0;
        let y = corner.1 - style.label_scale as i32;
        let o = style.label_outline;
        for dy in -o..=o {
            for dx in -o..=o {
                draw_text_mut(image, LABEL_OUTLINE, x + dx, y + dy, style.label_scale, font, &text);
            }
        }
        draw_text_mut(image, LABEL_FILL, x, y, style.label_scale, font, &text);
    }

    /// Candidates first, then every decoded marker on top.
    pub fn draw_frame(&self, image: &mut RgbImage, detection: &FrameDetection) {
        self.draw_candidates(image, &detection.candidates);
        for marker in &detection.markers {
            self.draw_marker(image, marker);
        }
    }
}
