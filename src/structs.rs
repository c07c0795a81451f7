//! Consolidated public types for the sweepstat crate
//!
//! This module contains all public structs, enums, and traits used across the crate.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent sample records: {0}")]
    InconsistentSamples(String),

    #[error("degenerate matrix: {0}")]
    DegenerateMatrix(String),

    #[error("degenerate projection: {0}")]
    DegenerateProjection(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;

// ============================================================================
// Stage Record Types
// ============================================================================

/// Name of the synthetic pseudo-stage carrying pipeline input counts.
pub const INPUT_STAGE: &str = "Pipeline Input";

/// Strip the trailing numeric instance suffix from a stage name, so
/// repeated invocations of the same tool (`hts_Stats_1`, `hts_Stats_2`)
/// share one identity.
#[must_use]
pub fn base_stage_name(stage: &str) -> &str {
    match stage.rsplit_once('_') {
        Some((base, suffix))
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => stage,
    }
}

/// One statistic value reported by a stage: numeric, or free text (notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Metric tracked by the reduction aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Reads,
    Basepairs,
}

impl Metric {
    /// Field holding the metric's input count on the pipeline-input
    /// pseudo-stage.
    #[must_use]
    pub fn input_field(self) -> &'static str {
        match self {
            Self::Reads => "Input_Reads",
            Self::Basepairs => "Input_Bp",
        }
    }

    /// Field holding the metric's output count on a reducer stage.
    #[must_use]
    pub fn output_field(self) -> &'static str {
        match self {
            Self::Reads => "Output_Reads",
            Self::Basepairs => "Output_Bp",
        }
    }
}

/// Output counts for one end type at one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EndCounts {
    pub reads_out: f64,
    pub bps_out: f64,
}

impl EndCounts {
    #[must_use]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Reads => self.reads_out,
            Metric::Basepairs => self.bps_out,
        }
    }
}

/// Which end types a stage reported output for.
///
/// A stage that only processes one end type simply has no counts for the
/// other; the absent end defaults to 0 everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EndLayout {
    SingleEndOnly(EndCounts),
    PairedEndOnly(EndCounts),
    Both { single: EndCounts, paired: EndCounts },
}

impl Default for EndLayout {
    fn default() -> Self {
        Self::Both {
            single: EndCounts::default(),
            paired: EndCounts::default(),
        }
    }
}

impl EndLayout {
    #[must_use]
    pub fn has_single_end(&self) -> bool {
        matches!(self, Self::SingleEndOnly(_) | Self::Both { .. })
    }

    #[must_use]
    pub fn has_paired_end(&self) -> bool {
        matches!(self, Self::PairedEndOnly(_) | Self::Both { .. })
    }

    #[must_use]
    pub fn single_end(&self) -> Option<EndCounts> {
        match self {
            Self::SingleEndOnly(c) => Some(*c),
            Self::Both { single, .. } => Some(*single),
            Self::PairedEndOnly(_) => None,
        }
    }

    #[must_use]
    pub fn paired_end(&self) -> Option<EndCounts> {
        match self {
            Self::PairedEndOnly(c) => Some(*c),
            Self::Both { paired, .. } => Some(*paired),
            Self::SingleEndOnly(_) => None,
        }
    }
}

/// One pipeline stage's statistics for one sample.
///
/// Field order is significant: the first sample's field iteration order
/// fixes the feature-label order for the whole matrix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageRecord {
    pub fields: Vec<(String, FieldValue)>,
    pub ends: EndLayout,
}

impl StageRecord {
    #[must_use]
    pub fn new(ends: EndLayout) -> Self {
        Self {
            fields: Vec::new(),
            ends,
        }
    }

    /// Append a field, preserving insertion order.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(FieldValue::as_number)
    }
}

/// Per-stage, per-sample statistics with canonical sample and stage
/// orderings.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    samples: Vec<String>,
    stages: Vec<String>,
    records: HashMap<String, HashMap<String, StageRecord>>,
}

impl PipelineStats {
    /// Build from per-sample (stage, record) lists.
    ///
    /// The first sample's stage order is canonical. A sample that
    /// disagrees on the ordering is tolerated with a warning; the
    /// mismatch is not corrected.
    #[must_use]
    pub fn from_samples(per_sample: Vec<(String, Vec<(String, StageRecord)>)>) -> Self {
        let mut stats = Self::default();

        for (sample, stage_records) in per_sample {
            if stats.stages.is_empty() {
                stats.stages = stage_records.iter().map(|(s, _)| s.clone()).collect();
            } else if stats
                .stages
                .iter()
                .map(String::as_str)
                .ne(stage_records.iter().map(|(s, _)| s.as_str()))
            {
                log::warn!(
                    "sample {sample} disagrees on stage order; keeping the first sample's order"
                );
            }

            for (stage, record) in stage_records {
                stats
                    .records
                    .entry(stage)
                    .or_default()
                    .insert(sample.clone(), record);
            }
            stats.samples.push(sample);
        }

        stats
    }

    /// Insert a single record, extending the canonical orderings as new
    /// stages and samples appear.
    pub fn insert(&mut self, stage: &str, sample: &str, record: StageRecord) {
        if !self.stages.iter().any(|s| s == stage) {
            self.stages.push(stage.to_string());
        }
        if !self.samples.iter().any(|s| s == sample) {
            self.samples.push(sample.to_string());
        }
        self.records
            .entry(stage.to_string())
            .or_default()
            .insert(sample.to_string(), record);
    }

    #[must_use]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    #[must_use]
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    #[must_use]
    pub fn record(&self, stage: &str, sample: &str) -> Option<&StageRecord> {
        self.records.get(stage).and_then(|per| per.get(sample))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ============================================================================
// Matrix and Normalization Types
// ============================================================================

/// Ordered feature labels paired with a features x samples value matrix.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// "stage: field" labels, one per matrix row.
    pub labels: Vec<String>,
    /// Feature values; column order follows `samples`.
    pub values: Array2<f64>,
    /// Sample names, one per matrix column.
    pub samples: Vec<String>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sample -> original feature label -> original (pre-scaling) value.
pub type RawSnapshot = BTreeMap<String, BTreeMap<String, f64>>;

/// Output of a normalization pass: the trimmed, possibly relabeled
/// matrix plus the raw snapshot captured before any row was dropped or
/// rescaled.
#[derive(Debug, Clone)]
pub struct NormalizationResult {
    pub matrix: FeatureMatrix,
    pub raw: RawSnapshot,
}

impl NormalizationResult {
    /// Per-sample label -> value series for the radar-style line chart.
    #[must_use]
    pub fn sample_series(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut series = BTreeMap::new();
        for (j, sample) in self.matrix.samples.iter().enumerate() {
            let mut values = BTreeMap::new();
            for (i, label) in self.matrix.labels.iter().enumerate() {
                values.insert(label.clone(), self.matrix.values[(i, j)]);
            }
            series.insert(sample.clone(), values);
        }
        series
    }

    /// Serialize the raw snapshot as the per-run machine-readable
    /// artifact.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.raw)?)
    }
}

// ============================================================================
// Projection Types
// ============================================================================

/// A feature's contribution along the two retained components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Loading {
    pub x: f64,
    pub y: f64,
}

/// Rank-2 projection of the normalized matrix.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionResult {
    /// Sample -> (pc1, pc2) coordinate.
    pub coordinates: HashMap<String, (f64, f64)>,
    /// Feature label -> loading vector.
    pub loadings: HashMap<String, Loading>,
    /// Percent variance explained by the two retained components.
    pub percent_variance: [f64; 2],
}

// ============================================================================
// Reduction Types
// ============================================================================

/// Single-end / paired-end output series for the composition lines.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EndSeries {
    pub single_end: Vec<(String, f64)>,
    pub paired_end: Vec<(String, f64)>,
}

/// Per-sample reduction series for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct ReductionReport {
    pub metric: Metric,
    /// Included stages in pipeline order, input pseudo-stage first.
    pub stages: Vec<String>,
    /// Sample -> ordered (stage, value) series.
    pub totals: HashMap<String, Vec<(String, f64)>>,
    /// Sample -> end-type composition series.
    pub composition: HashMap<String, EndSeries>,
}

// ============================================================================
// Overview Types
// ============================================================================

/// Everything the overview section renders.
#[derive(Debug, Clone)]
pub struct OverviewReport {
    /// Centering-normalized matrix feeding the projection and the
    /// radar-style series.
    pub normalized: NormalizationResult,
    /// Scale-normalized matrix feeding the comparison table.
    pub scaled: NormalizationResult,
    /// Rank-2 projection, absent when the matrix is degenerate.
    pub projection: Option<ProjectionResult>,
    pub read_reduction: Option<ReductionReport>,
    pub bp_reduction: Option<ReductionReport>,
}
