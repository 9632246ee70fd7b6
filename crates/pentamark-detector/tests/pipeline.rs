use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;
use pentamark_detector::{MarkerDetector, MarkerDetectorParams, MarkerLog, Overlay, PixelPoint};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// White notched pentagon on black with dark dots in ring slots 0 and 2.
///
/// The notch sides run at 45 degrees so the notch tip is a single contour
/// pixel at (100, 100); the base runs from (70, 200) to (130, 200).
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
    // Axis samples land on y = 117, 132, 148, 164, 180.
    draw_filled_circle_mut(&mut frame, (100, 117), 3, Rgb([0, 0, 0]));
    draw_filled_circle_mut(&mut frame, (100, 148), 3, Rgb([0, 0, 0]));
    frame
}

fn unmasked_params() -> MarkerDetectorParams {
    let mut params = MarkerDetectorParams::default();
    params.shape.mask_left_columns = 0;
    params
}

#[test]
fn synthetic_marker_decodes_to_identifier_five() {
    init_logging();
    let detector = MarkerDetector::new(unmasked_params());
    let result = detector.detect(&marker_frame(), 12);

    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.markers.len(), 1);
    let marker = &result.markers[0];
    assert_eq!(marker.concave_corner, PixelPoint::new(100, 100));
    assert_eq!(marker.axis_endpoint, PixelPoint::new(100, 200));
    assert_eq!(marker.axis[0], PixelPoint::new(100, 100));
    assert_eq!(marker.bits.to_string(), "10100");
    assert_eq!(marker.identifier, 5);

    let records = result.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].frame_index, 12);
    assert_eq!(records[0].anchor, PixelPoint::new(100, 100));
    let row = records[0].to_string();
    assert!(row.starts_with("12,5,100,100,"), "{row}");
    assert!(row.ends_with(",0"), "{row}");
}

#[test]
fn default_column_mask_hides_the_marker() {
    init_logging();
    let detector = MarkerDetector::default();
    let result = detector.detect(&marker_frame(), 0);
    assert!(result.candidates.is_empty());
    assert!(result.markers.is_empty());
}

#[test]
fn records_accumulate_in_the_subject_log() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut log = MarkerLog::for_subject(dir.path(), "3");
    let detector = MarkerDetector::new(unmasked_params());
    let frame = marker_frame();

    for frame_index in 0..3 {
        let result = detector.detect(&frame, frame_index);
        log.append(&result.records()).unwrap();
    }

    let rows = log.read_records().unwrap();
    assert_eq!(rows.len(), 3);
    let frames: Vec<u64> = rows.iter().map(|r| r.frame_index).collect();
    assert_eq!(frames, vec![0, 1, 2]);
    assert!(rows.iter().all(|r| r.identifier == 5));
    assert!(dir.path().join("obj3_marker.csv").exists());
}

#[test]
fn overlay_does_not_change_the_decoding() {
    init_logging();
    let detector = MarkerDetector::new(unmasked_params());
    let mut frame = marker_frame();
    let before = detector.detect(&frame, 1);

    Overlay::default().draw_frame(&mut frame, &before);
    assert_eq!(*frame.get_pixel(100, 100), Rgb([255, 0, 0]));
    let top = before.candidates[0]
        .vertices
        .iter()
        .find(|v| v.y < 80)
        .copied()
        .unwrap();
    assert_eq!(*frame.get_pixel(top.x as u32, top.y as u32), Rgb([0, 255, 0]));

    let after = detector.detect(&marker_frame(), 1);
    assert_eq!(after.records(), before.records());
}
