//! Per-marker output rows and the append-only subject log.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nalgebra::Vector2;
use pentamark_core::PixelPoint;
use serde::{Deserialize, Serialize};

/// One decoded marker in one frame.
///
/// Rendered as `frame,identifier,anchor_x,anchor_y,offset_x,offset_y,0`; the
/// trailing `0` is a reserved z slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub frame_index: u64,
    pub identifier: u16,
    /// First point of the marker axis (the concave corner).
    pub anchor: PixelPoint,
    pub offset: Vector2<f64>,
}

const FIELDS: usize = 7;

impl fmt::Display for MarkerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{:?},{:?},0",
            self.frame_index,
            self.identifier,
            self.anchor.x,
            self.anchor.y,
            self.offset.x,
            self.offset.y
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("expected 7 fields, got {0}")]
    FieldCount(usize),
    #[error("field {index} ({value:?}) is not a valid number")]
    Field { index: usize, value: String },
}

fn parse_field<T: FromStr>(fields: &[&str], index: usize) -> Result<T, RecordParseError> {
    let raw = fields[index].trim();
    raw.parse().map_err(|_| RecordParseError::Field {
        index,
        value: raw.to_string(),
    })
}

impl FromStr for MarkerRecord {
    type Err = RecordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end_matches(['\r', '\n']).split(',').collect();
        if fields.len() != FIELDS {
            return Err(RecordParseError::FieldCount(fields.len()));
        }
        Ok(MarkerRecord {
            frame_index: parse_field(&fields, 0)?,
            identifier: parse_field(&fields, 1)?,
            anchor: PixelPoint::new(parse_field(&fields, 2)?, parse_field(&fields, 3)?),
            offset: Vector2::new(parse_field(&fields, 4)?, parse_field(&fields, 5)?),
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MarkerLogError {
    #[error("marker log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("marker log {}, line {line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordParseError,
    },
}

/// Append-only CSV log of [`MarkerRecord`]s for one tracked subject.
///
/// The file is reopened in append mode on every [`MarkerLog::append`], so rows
/// written by earlier runs are preserved. Appends take `&mut self`; writers
/// sharing a log across threads must serialize through a lock.
#[derive(Clone, Debug)]
pub struct MarkerLog {
    path: PathBuf,
}

impl MarkerLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `obj{subject}_marker.csv` inside `dir`.
    pub fn for_subject(dir: impl AsRef<Path>, subject: &str) -> Self {
        Self::new(dir.as_ref().join(format!("obj{subject}_marker.csv")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per record. An empty batch still creates the file.
    pub fn append(&mut self, records: &[MarkerRecord]) -> Result<(), MarkerLogError> {
        let mut rows = String::new();
        for record in records {
            rows.push_str(&record.to_string());
            rows.push('\n');
        }
        let io_err = |source: io::Error| MarkerLogError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(rows.as_bytes()).map_err(io_err)?;
        log::debug!(
            "appended {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Parse every non-empty row of the log.
    pub fn read_records(&self) -> Result<Vec<MarkerRecord>, MarkerLogError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| MarkerLogError::Io {
            path: self.path.clone(),
            source,
        })?;
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                line.parse().map_err(|source| MarkerLogError::Parse {
                    path: self.path.clone(),
                    line: i + 1,
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(frame_index: u64, identifier: u16, x: f64, y: f64) -> MarkerRecord {
        MarkerRecord {
            frame_index,
            identifier,
            anchor: PixelPoint::new(1480, 322),
            offset: Vector2::new(x, y),
        }
    }

    #[test]
    fn row_format_keeps_a_decimal_point() {
        let row = record(12, 0, 70.0, 0.0).to_string();
        assert_eq!(row, "12,0,1480,322,70.0,0.0,0");

        let row = record(3, 5, 18.117142, -67.614).to_string();
        assert_eq!(row, "3,5,1480,322,18.117142,-67.614,0");
    }

    #[test]
    fn rows_parse_back() {
        let written = record(41, 17, -49.49747468305832, 49.49747468305833);
        let parsed: MarkerRecord = written.to_string().parse().unwrap();
        assert_eq!(parsed, written);

        assert_eq!(
            "1,2,3".parse::<MarkerRecord>(),
            Err(RecordParseError::FieldCount(3))
        );
        assert!(matches!(
            "1,x,3,4,5.0,6.0,0".parse::<MarkerRecord>(),
            Err(RecordParseError::Field { index: 1, .. })
        ));
    }

    #[test]
    fn subject_log_is_named_after_the_subject() {
        let log = MarkerLog::for_subject("/tmp/run", "7");
        assert_eq!(log.path(), Path::new("/tmp/run/obj7_marker.csv"));
    }

    #[test]
    fn appends_preserve_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = MarkerLog::for_subject(dir.path(), "2");

        log.append(&[]).unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "");

        log.append(&[record(0, 5, 70.0, 0.0)]).unwrap();
        // A fresh handle on the same file keeps appending.
        let mut again = MarkerLog::new(log.path());
        again
            .append(&[record(1, 5, 70.0, 0.0), record(1, 9, 1.0, 2.0)])
            .unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.ends_with('\n'));

        let rows = log.read_records().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].identifier, 9);
    }

    #[test]
    fn reading_a_missing_log_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = MarkerLog::for_subject(dir.path(), "x");
        assert!(matches!(log.read_records(), Err(MarkerLogError::Io { .. })));
    }
}
