//! Point annotations and their CSV form.
//!
//! Labeling tools export one point per line as `code,col,row` with 1-based
//! column and row. A code of `-1` marks a point the annotator skipped.
//! Coordinates are stored 0-based and signed so that out-of-image points
//! survive parsing and are dropped (and counted) downstream.

use crate::error::{LgcError, Result};
use csv::{Position, ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw code meaning "no class assigned".
pub const UNLABELED_CODE: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAnnotation {
    /// Raw class code from the labeling source; `None` for unlabeled points.
    pub code: Option<i64>,
    /// 0-based column.
    pub col: i64,
    /// 0-based row.
    pub row: i64,
}

impl PointAnnotation {
    pub fn labeled(code: i64, col: i64, row: i64) -> Self {
        Self {
            code: Some(code),
            col,
            row,
        }
    }

    pub fn unlabeled(col: i64, row: i64) -> Self {
        Self {
            code: None,
            col,
            row,
        }
    }
}

/// Parse `code,col,row` records (1-based coordinates). Blank lines are
/// skipped; extra trailing columns are ignored.
pub fn parse_annotations_csv(text: &str) -> Result<Vec<PointAnnotation>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut out = Vec::new();
    for record in reader.records() {
        let mut record = record.map_err(|e| {
            let line = e.position().map_or(0, Position::line);
            LgcError::shape(format!("annotation line {line}: {e}"))
        })?;
        let line = record.position().map_or(0, Position::line);
        if record.len() < 3 {
            return Err(LgcError::shape(format!(
                "annotation line {line}: expected `code,col,row`, got {} fields",
                record.len()
            )));
        }
        record.truncate(3);
        let (code, col, row): (i64, i64, i64) = record
            .deserialize(None)
            .map_err(|e| LgcError::shape(format!("annotation line {line}: {e}")))?;
        let to_zero_based = |v: i64, name: &str| {
            v.checked_sub(1).ok_or_else(|| {
                LgcError::shape(format!("annotation line {line}: {name} {v} is out of range"))
            })
        };
        let (col, row) = (to_zero_based(col, "column")?, to_zero_based(row, "row")?);
        out.push(if code == UNLABELED_CODE {
            PointAnnotation::unlabeled(col, row)
        } else {
            PointAnnotation::labeled(code, col, row)
        });
    }
    Ok(out)
}

/// Read and parse an annotation CSV file.
pub fn load_annotations_csv(path: &Path) -> std::result::Result<Vec<PointAnnotation>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read annotations {}: {e}", path.display()))?;
    parse_annotations_csv(&text).map_err(|e| format!("{}: {e}", path.display()))
}
