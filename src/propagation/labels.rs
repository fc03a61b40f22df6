//! Initial label matrix `Y` from sparse point annotations.
//!
//! Each labeled point is looked up in the partition; the containing region's
//! row of `Y` becomes one-hot at the remapped class. When several points fall
//! in the same region the last one wins. Points outside the image, on masked
//! pixels or with an unmapped code are dropped and counted.

use crate::annotations::PointAnnotation;
use crate::error::{LgcError, Result};
use crate::image::{ImageView, LabelMap, Partition};
use log::{debug, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw annotation code → 0-based class index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRemapMode {
    /// Codes `1..=C` map to classes `0..C`.
    #[default]
    Identity,
    /// Ice-chart codes: 15 (OW), 1 (NI), 3 (YI), 6 (FYI), 12 (MYI).
    /// With 4 classes OW and NI share class 0; with 3 classes OW/NI are unused.
    SeaIce { classes: usize },
    /// Arbitrary lookup table.
    Table(BTreeMap<i64, usize>),
}

impl LabelRemapMode {
    pub fn class_index(&self, code: i64) -> Option<usize> {
        match self {
            Self::Identity => (code >= 1).then(|| (code - 1) as usize),
            Self::SeaIce { classes: 4 } => match code {
                15 | 1 => Some(0),
                3 => Some(1),
                6 => Some(2),
                12 => Some(3),
                _ => None,
            },
            Self::SeaIce { classes: 3 } => match code {
                3 => Some(0),
                6 => Some(1),
                12 => Some(2),
                _ => None,
            },
            Self::SeaIce { .. } => None,
            Self::Table(table) => table.get(&code).copied(),
        }
    }

    pub fn validate(&self, class_count: Option<usize>) -> Result<()> {
        match self {
            Self::Identity => Ok(()),
            Self::SeaIce { classes } => {
                if !matches!(classes, 3 | 4) {
                    return Err(LgcError::config(format!(
                        "sea-ice remap supports 3 or 4 classes, got {classes}"
                    )));
                }
                match class_count {
                    Some(c) if c != *classes => Err(LgcError::config(format!(
                        "class count {c} disagrees with sea-ice remap ({classes} classes)"
                    ))),
                    _ => Ok(()),
                }
            }
            Self::Table(table) if table.is_empty() => {
                Err(LgcError::config("label remap table is empty"))
            }
            Self::Table(_) => Ok(()),
        }
    }

    /// Resolve the class count: the explicit value wins, otherwise it is
    /// inferred from the remap mode (largest training code for `Identity`).
    pub fn class_count(&self, explicit: Option<usize>, train: &[PointAnnotation]) -> Result<usize> {
        if let Some(c) = explicit {
            return Ok(c);
        }
        match self {
            Self::Identity => train
                .iter()
                .filter_map(|p| p.code)
                .filter(|&c| c >= 1)
                .max()
                .map(|c| c as usize)
                .ok_or_else(|| {
                    LgcError::config("cannot infer class count: no labeled training points")
                }),
            Self::SeaIce { classes } => Ok(*classes),
            Self::Table(table) => table
                .values()
                .max()
                .map(|m| m + 1)
                .ok_or_else(|| LgcError::config("label remap table is empty")),
        }
    }
}

/// Annotation bookkeeping; none of these abort the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDrops {
    /// Points carrying the unlabeled marker.
    pub unlabeled: usize,
    /// Points outside the image.
    pub out_of_bounds: usize,
    /// Points on sentinel pixels.
    pub masked: usize,
    /// Points whose code has no class in the remap / class range.
    pub unmapped: usize,
    /// Regions whose label was replaced by a later, different class.
    pub overwritten: usize,
}

impl AnnotationDrops {
    /// Labeled points that did not reach `Y`.
    pub fn dropped(&self) -> usize {
        self.out_of_bounds + self.masked + self.unmapped
    }
}

/// `Y` (regions × classes) plus annotation bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelMatrix {
    pub y: DMatrix<f64>,
    pub drops: AnnotationDrops,
}

impl LabelMatrix {
    pub fn region_count(&self) -> usize {
        self.y.nrows()
    }

    pub fn class_count(&self) -> usize {
        self.y.ncols()
    }

    /// 0-based class of a labeled region.
    pub fn class_of(&self, region: usize) -> Option<usize> {
        let row = self.y.row(region);
        row.iter().position(|&v| v == 1.0)
    }

    pub fn labeled_regions(&self) -> usize {
        (0..self.region_count())
            .filter(|&r| self.class_of(r).is_some())
            .count()
    }

    /// Broadcast labeled rows to pixels: 1-based class, 0 for unlabeled
    /// regions, sentinel pixels untouched.
    pub fn training_map(&self, partition: &Partition, sentinel: u32) -> LabelMap {
        let mut map = LabelMap::filled(partition.w, partition.h, 0);
        for (y, row) in partition.rows().enumerate() {
            for (x, &id) in row.iter().enumerate() {
                let value = if id == sentinel {
                    sentinel
                } else {
                    self.class_of(id as usize).map_or(0, |c| c as u32 + 1)
                };
                map.set(x, y, value);
            }
        }
        map
    }
}

/// Build `Y` from point annotations ("last write wins" per region).
pub fn init_label_matrix(
    partition: &Partition,
    region_count: usize,
    class_count: usize,
    sentinel: u32,
    remap: &LabelRemapMode,
    annotations: &[PointAnnotation],
) -> LabelMatrix {
    let mut y = DMatrix::<f64>::zeros(region_count, class_count);
    let mut assigned: Vec<Option<usize>> = vec![None; region_count];
    let mut drops = AnnotationDrops::default();
    for point in annotations {
        let Some(code) = point.code else {
            drops.unlabeled += 1;
            continue;
        };
        let Some(id) = partition.lookup(point.col, point.row) else {
            drops.out_of_bounds += 1;
            continue;
        };
        if id == sentinel || id as usize >= region_count {
            drops.masked += 1;
            continue;
        }
        let class = match remap.class_index(code) {
            Some(c) if c < class_count => c,
            _ => {
                drops.unmapped += 1;
                continue;
            }
        };
        let region = id as usize;
        if let Some(prev) = assigned[region] {
            if prev != class {
                drops.overwritten += 1;
            }
        }
        y.row_mut(region).fill(0.0);
        y[(region, class)] = 1.0;
        assigned[region] = Some(class);
    }
    if drops.dropped() > 0 {
        warn!(
            "dropped {} training points (out_of_bounds={} masked={} unmapped={})",
            drops.dropped(),
            drops.out_of_bounds,
            drops.masked,
            drops.unmapped
        );
    }
    debug!(
        "label matrix {}x{}: {} labeled regions, {} conflicting overwrites",
        region_count,
        class_count,
        assigned.iter().flatten().count(),
        drops.overwritten
    );
    LabelMatrix { y, drops }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u32 = 50;

    fn partition() -> Partition {
        Partition::from_rows(&[vec![0, 0, 1], vec![2, S, 1]]).unwrap()
    }

    #[test]
    fn one_hot_rows_and_drop_counts() {
        let points = [
            PointAnnotation::labeled(2, 0, 0),
            PointAnnotation::labeled(1, 2, 1),
            PointAnnotation::unlabeled(0, 1),
            PointAnnotation::labeled(1, 5, 0),
            PointAnnotation::labeled(1, 1, 1),
            PointAnnotation::labeled(9, 0, 1),
        ];
        let m = init_label_matrix(&partition(), 3, 2, S, &LabelRemapMode::Identity, &points);
        assert_eq!(m.class_of(0), Some(1));
        assert_eq!(m.class_of(1), Some(0));
        assert_eq!(m.class_of(2), None);
        assert_eq!(
            m.drops,
            AnnotationDrops {
                unlabeled: 1,
                out_of_bounds: 1,
                masked: 1,
                unmapped: 1,
                overwritten: 0,
            }
        );
        assert_eq!(m.drops.dropped(), 3);
        for r in 0..3 {
            let weight: f64 = m.y.row(r).sum();
            assert!(weight == 0.0 || weight == 1.0);
        }
    }

    #[test]
    fn last_write_wins_within_a_region() {
        let points = [
            PointAnnotation::labeled(1, 0, 0),
            PointAnnotation::labeled(2, 1, 0),
        ];
        let m = init_label_matrix(&partition(), 3, 2, S, &LabelRemapMode::Identity, &points);
        assert_eq!(m.class_of(0), Some(1));
        assert_eq!(m.y.row(0).sum(), 1.0);
        assert_eq!(m.drops.overwritten, 1);
    }

    #[test]
    fn sea_ice_codes_remap() {
        let four = LabelRemapMode::SeaIce { classes: 4 };
        assert_eq!(four.class_index(15), Some(0));
        assert_eq!(four.class_index(1), Some(0));
        assert_eq!(four.class_index(12), Some(3));
        let three = LabelRemapMode::SeaIce { classes: 3 };
        assert_eq!(three.class_index(15), None);
        assert_eq!(three.class_index(6), Some(1));
        assert!(LabelRemapMode::SeaIce { classes: 5 }.validate(None).is_err());
        assert!(four.validate(Some(3)).is_err());
    }

    #[test]
    fn class_count_inference() {
        let train = [
            PointAnnotation::labeled(3, 0, 0),
            PointAnnotation::labeled(1, 0, 0),
            PointAnnotation::unlabeled(0, 0),
        ];
        let id = LabelRemapMode::Identity;
        assert_eq!(id.class_count(None, &train).unwrap(), 3);
        assert_eq!(id.class_count(Some(5), &train).unwrap(), 5);
        assert!(id.class_count(None, &[]).is_err());
        let table = LabelRemapMode::Table(BTreeMap::from([(7, 0), (9, 2)]));
        assert_eq!(table.class_count(None, &train).unwrap(), 3);
        assert_eq!(table.class_index(9), Some(2));
    }

    #[test]
    fn training_map_keeps_sentinel() {
        let points = [PointAnnotation::labeled(2, 2, 0)];
        let part = partition();
        let m = init_label_matrix(&part, 3, 2, S, &LabelRemapMode::Identity, &points);
        let map = m.training_map(&part, S);
        assert_eq!(map.data, vec![0, 0, 2, 0, S, 2]);
    }
}
