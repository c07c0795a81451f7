//! Per-feature normalization policies
//!
//! Two related but non-equivalent policies live here. `center_normalize`
//! reduces variance for the radar-style projection path;
//! `scale_normalize` aligns orders of magnitude for the multi-stage
//! comparison table. Both capture the raw snapshot before touching a row
//! and compact dropped rows with a keep mask.

use crate::structs::{base_stage_name, FeatureMatrix, NormalizationResult, RawSnapshot};
use ndarray::Axis;
use std::collections::{BTreeMap, HashMap};

/// Fixed divisor for features whose natural scale spans orders of
/// magnitude; dividing by the standard deviation would over-compress them.
const WIDE_RANGE_DIVISOR: f64 = 15.0;

fn snapshot(matrix: &FeatureMatrix) -> RawSnapshot {
    let mut raw = RawSnapshot::new();
    for (j, sample) in matrix.samples.iter().enumerate() {
        let mut values = BTreeMap::new();
        for (i, label) in matrix.labels.iter().enumerate() {
            values.insert(label.clone(), matrix.values[(i, j)]);
        }
        raw.insert(sample.clone(), values);
    }
    raw
}

#[allow(clippy::cast_precision_loss)]
fn population_std(row: &[f64], mean: f64) -> f64 {
    let var = row.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / row.len() as f64;
    var.sqrt()
}

/// Center and variance-scale each feature row for the projection path.
///
/// Constant rows are dropped (zero variance carries no information).
/// Rows whose label matches the wide-range set are centered and divided
/// by the fixed divisor; rows with any value above 1 are z-scored with
/// the population standard deviation; small-fraction rows are only
/// mean-centered since they are already commensurable proportions.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn center_normalize(matrix: &FeatureMatrix, wide_range: &[String]) -> NormalizationResult {
    let raw = snapshot(matrix);
    let n = matrix.n_samples();

    let mut keep: Vec<usize> = Vec::new();
    let mut values = matrix.values.clone();

    for (i, label) in matrix.labels.iter().enumerate() {
        let row: Vec<f64> = values.row(i).to_vec();
        if row.iter().all(|&v| v == row[0]) {
            continue;
        }
        keep.push(i);

        let mean = row.iter().sum::<f64>() / n as f64;
        if wide_range.iter().any(|w| label.contains(w.as_str())) {
            for (j, &v) in row.iter().enumerate() {
                values[(i, j)] = (v - mean) / WIDE_RANGE_DIVISOR;
            }
        } else if row.iter().any(|&v| v > 1.0) {
            // constant rows are already gone, so the std is strictly positive
            let std = population_std(&row, mean);
            for (j, &v) in row.iter().enumerate() {
                values[(i, j)] = (v - mean) / std;
            }
        } else {
            for (j, &v) in row.iter().enumerate() {
                values[(i, j)] = v - mean;
            }
        }
    }

    NormalizationResult {
        matrix: FeatureMatrix {
            labels: keep.iter().map(|&i| matrix.labels[i].clone()).collect(),
            values: values.select(Axis(0), &keep),
            samples: matrix.samples.clone(),
        },
        raw,
    }
}

/// Rescale each feature row by a power of ten so values land in a
/// legible range, renaming the row with a `" x 10^<k>"` suffix.
///
/// Scale decisions made by anchor stages are recorded under an
/// instance-stripped stat key and reused by later anchor instances
/// reporting the same statistic, so one metric shares one scale decision
/// across pipeline positions. The table lives and dies inside this call.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn scale_normalize(matrix: &FeatureMatrix, anchors: &[String]) -> NormalizationResult {
    let raw = snapshot(matrix);
    let n = matrix.n_samples();

    let mut anchor_scales: HashMap<String, i32> = HashMap::new();

    let mut keep: Vec<usize> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut values = matrix.values.clone();

    for (i, label) in matrix.labels.iter().enumerate() {
        let row: Vec<f64> = values.row(i).to_vec();

        let constant = n > 1 && row.iter().all(|&v| v == row[0]);
        let all_zero = row.iter().all(|&v| v == 0.0);
        if constant || all_zero {
            continue;
        }

        let (stage, field) = label
            .split_once(": ")
            .unwrap_or((label.as_str(), ""));
        let stage = base_stage_name(stage);
        let stat_key = format!("{stage} {field}");
        let is_anchor = anchors.iter().any(|a| a == stage);

        let max = row.iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));

        let scale = if is_anchor && anchor_scales.contains_key(&stat_key) {
            Some(anchor_scales[&stat_key])
        } else if max > 0.0 && (max < 0.1 || max > 1.0) {
            let s = (-max.log10()).floor() as i32;
            if is_anchor {
                anchor_scales.insert(stat_key, s);
            }
            Some(s)
        } else {
            // already legible and no anchor decision to follow
            None
        };

        keep.push(i);
        match scale {
            Some(s) => {
                let factor = 10f64.powi(s);
                for (j, &v) in row.iter().enumerate() {
                    values[(i, j)] = v * factor;
                }
                labels.push(format!("{label} x 10^{s}"));
            }
            None => labels.push(label.clone()),
        }
    }

    NormalizationResult {
        matrix: FeatureMatrix {
            labels,
            values: values.select(Axis(0), &keep),
            samples: matrix.samples.clone(),
        },
        raw,
    }
}
