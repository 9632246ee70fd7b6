//! Decode markers from a sequence of frame images.
//!
//! Usage: `cargo run --example decode_frames -- run.json`
//!
//! ```json
//! {
//!   "frames": ["frames/0000.png", "frames/0001.png"],
//!   "subject": "1",
//!   "output_dir": "out",
//!   "annotated_dir": "out/annotated",
//!   "params": { "shape": { "mask_left_columns": 1200 } }
//! }
//! ```

use std::{env, fs, path::PathBuf, time::Instant};

use image::ImageReader;
use pentamark::detect::process_frame;
use pentamark::{MarkerDetector, MarkerDetectorParams, MarkerLog, Overlay};
use serde::Deserialize;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct RunConfig {
    /// Frame images, processed in order; the position is the frame index.
    frames: Vec<PathBuf>,
    /// Tracked subject; names the `obj{subject}_marker.csv` log.
    subject: String,
    output_dir: PathBuf,
    /// Where to save annotated frames, if anywhere.
    #[serde(default)]
    annotated_dir: Option<PathBuf>,
    /// Font used for identifier labels on annotated frames.
    #[serde(default)]
    font_path: Option<PathBuf>,
    #[serde(default)]
    params: MarkerDetectorParams,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata/decode_frames.json"));
    let cfg: RunConfig = {
        let raw = fs::read_to_string(&config_path)?;
        serde_json::from_str(&raw)?
    };

    fs::create_dir_all(&cfg.output_dir)?;
    if let Some(dir) = &cfg.annotated_dir {
        fs::create_dir_all(dir)?;
    }

    let overlay = match (&cfg.annotated_dir, &cfg.font_path) {
        (None, _) => None,
        (Some(_), None) => Some(Overlay::new(cfg.params.overlay)),
        (Some(_), Some(font)) => {
            Some(Overlay::new(cfg.params.overlay).with_font(Overlay::load_font(font)?))
        }
    };
    let detector = MarkerDetector::new(cfg.params.clone());
    let mut marker_log = MarkerLog::for_subject(&cfg.output_dir, &cfg.subject);

    let t0 = Instant::now();
    let mut decoded = 0usize;
    for (frame_index, path) in cfg.frames.iter().enumerate() {
        let decoded_frame = ImageReader::open(path)
            .map_err(image::ImageError::from)
            .and_then(|reader| reader.decode());
        let mut frame = match decoded_frame {
            Ok(img) => img.to_rgb8(),
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                continue;
            }
        };

        match process_frame(
            &mut frame,
            frame_index as u64,
            &detector,
            overlay.as_ref(),
            &mut marker_log,
        ) {
            Ok(records) => decoded += records.len(),
            Err(err) => {
                log::warn!("frame {frame_index}: {err}");
                continue;
            }
        }

        if let (Some(dir), Some(name)) = (&cfg.annotated_dir, path.file_name()) {
            frame.save(dir.join(name))?;
        }
    }

    log::info!(
        "decoded {} markers from {} frames in {} ms -> {}",
        decoded,
        cfg.frames.len(),
        t0.elapsed().as_millis(),
        marker_log.path().display()
    );
    Ok(())
}

fn init_tracing() {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = pentamark::core::init_from_env();
    }
}
