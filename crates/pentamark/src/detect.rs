use crate::detector::{
    FrameDetection, MarkerDetector, MarkerDetectorParams, MarkerLog, MarkerLogError,
    MarkerRecord, Overlay,
};
use image::RgbImage;
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
///
/// Each error concerns a single frame; callers are expected to log it and
/// move on to the next frame.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGB frame buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB frame dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Log(#[from] MarkerLogError),
}

/// Wrap a packed row-major RGB buffer as an `image::RgbImage`.
pub fn frame_from_slice(width: u32, height: u32, rgb: &[u8]) -> Result<RgbImage, DetectError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(DetectError::InvalidRgbDimensions { width, height })?;
    if rgb.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: rgb.len(),
        });
    }
    RgbImage::from_raw(width, height, rgb.to_vec())
        .ok_or(DetectError::InvalidRgbDimensions { width, height })
}

/// Run the marker detector on one frame with the given parameters.
pub fn detect_frame(
    frame: &RgbImage,
    frame_index: u64,
    params: &MarkerDetectorParams,
) -> FrameDetection {
    MarkerDetector::new(params.clone()).detect(frame, frame_index)
}

/// Detect, optionally annotate, and append one frame's records to `log`.
///
/// Returns the appended records. The log file is touched even when nothing
/// was decoded.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(frame, detector, overlay, log),
        fields(width = frame.width(), height = frame.height())
    )
)]
pub fn process_frame(
    frame: &mut RgbImage,
    frame_index: u64,
    detector: &MarkerDetector,
    overlay: Option<&Overlay>,
    log: &mut MarkerLog,
) -> Result<Vec<MarkerRecord>, DetectError> {
    let detection = detector.detect(frame, frame_index);
    if let Some(overlay) = overlay {
        overlay.draw_frame(frame, &detection);
    }
    let records = detection.records();
    log.append(&records)?;
    info!(
        "frame {}: {} candidates, {} markers",
        frame_index,
        detection.candidates.len(),
        records.len()
    );
    Ok(records)
}

/// [`process_frame`] on a raw RGB buffer, without annotation.
pub fn process_frame_from_slice(
    width: u32,
    height: u32,
    rgb: &[u8],
    frame_index: u64,
    detector: &MarkerDetector,
    log: &mut MarkerLog,
) -> Result<Vec<MarkerRecord>, DetectError> {
    let mut frame = frame_from_slice(width, height, rgb)?;
    process_frame(&mut frame, frame_index, detector, None, log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelPoint;
    use image::Rgb;
    use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
    use imageproc::point::Point;

    fn marker_frame() -> RgbImage {
        let mut frame = RgbImage::new(240, 260);
        let outline = [
            Point::new(100, 100),
            Point::new(140, 60),
            Point::new(130, 200),
            Point::new(70, 200),
            Point::new(60, 60),
        ];
        draw_polygon_mut(&mut frame, &outline, Rgb([255, 255, 255]));
        draw_filled_circle_mut(&mut frame, (100, 117), 3, Rgb([0, 0, 0]));
        draw_filled_circle_mut(&mut frame, (100, 148), 3, Rgb([0, 0, 0]));
        frame
    }

    fn unmasked() -> MarkerDetector {
        let mut params = MarkerDetectorParams::default();
        params.shape.mask_left_columns = 0;
        MarkerDetector::new(params)
    }

    #[test]
    fn frame_from_slice_checks_the_buffer() {
        assert!(frame_from_slice(2, 2, &[0u8; 12]).is_ok());
        assert!(matches!(
            frame_from_slice(2, 2, &[0u8; 11]),
            Err(DetectError::InvalidRgbBuffer {
                expected: 12,
                got: 11
            })
        ));
    }

    #[test]
    fn detect_frame_uses_the_given_params() {
        let frame = marker_frame();
        let mut params = MarkerDetectorParams::default();
        assert!(detect_frame(&frame, 0, &params).markers.is_empty());

        params.shape.mask_left_columns = 0;
        let result = detect_frame(&frame, 0, &params);
        assert_eq!(result.markers.len(), 1);
        assert_eq!(result.markers[0].identifier, 5);
    }

    #[test]
    fn process_frame_appends_and_annotates() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = MarkerLog::for_subject(dir.path(), "1");
        let mut frame = marker_frame();
        let overlay = Overlay::default();

        let records = process_frame(&mut frame, 4, &unmasked(), Some(&overlay), &mut log).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].anchor, PixelPoint::new(100, 100));
        assert_eq!(*frame.get_pixel(100, 100), Rgb([255, 0, 0]));
        assert_eq!(log.read_records().unwrap(), records);
    }

    #[test]
    fn raw_buffers_go_through_the_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = MarkerLog::for_subject(dir.path(), "1");
        let frame = marker_frame();

        let records =
            process_frame_from_slice(240, 260, frame.as_raw(), 9, &unmasked(), &mut log).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].frame_index, 9);

        let err = process_frame_from_slice(240, 260, &[0u8; 10], 10, &unmasked(), &mut log);
        assert!(matches!(err, Err(DetectError::InvalidRgbBuffer { .. })));
        assert_eq!(log.read_records().unwrap().len(), 1);
    }
}
