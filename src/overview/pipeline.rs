//! Overview orchestration across the builder, normalizers, projector,
//! and aggregator

use crate::overview::normalize::{center_normalize, scale_normalize};
use crate::overview::projection::project;
use crate::overview::reduction::reduce;
use crate::structs::{FeatureMatrix, Metric, OverviewReport, PipelineStats, Result, SweepError};

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Pipeline-specific tuning for the overview computation.
///
/// The defaults are hand-tuned for the HTStream cleaning pipeline, not
/// reusable heuristics.
#[derive(Debug, Clone)]
pub struct OverviewConfig {
    /// Fields that are themselves pipeline outputs and carry no signal
    /// as projection inputs.
    pub excluded_fields: Vec<String>,
    /// Features whose natural scale spans orders of magnitude.
    pub wide_range_fields: Vec<String>,
    /// Stages whose scale decisions are recorded and reused.
    pub scale_anchors: Vec<String>,
    /// Stages that reduce read counts.
    pub read_reducers: Vec<String>,
    /// Stages that reduce basepair counts.
    pub bp_reducers: Vec<String>,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            excluded_fields: owned(&["Output_Reads", "Output_Bp"]),
            wide_range_fields: owned(&["Overlap_Length_Max", "Overlap_Length_Med"]),
            scale_anchors: owned(&["hts_Stats"]),
            read_reducers: owned(&[
                "hts_SeqScreener",
                "hts_SuperDeduper",
                "hts_Overlapper",
                "hts_LengthFilter",
                "hts_Stats",
            ]),
            bp_reducers: owned(&[
                "hts_AdapterTrimmer",
                "hts_CutTrim",
                "hts_NTrimmer",
                "hts_QWindowTrim",
                "hts_PolyATTrim",
                "hts_Stats",
            ]),
        }
    }
}

/// Run the full overview computation.
///
/// A degenerate projection is non-fatal: it downgrades to `None` with a
/// warning so the caller can swap the scatter section for a notice, and
/// the reduction aggregators likewise report nothing-to-plot as `None`.
///
/// # Errors
/// Returns error if the feature matrix cannot be built from the records.
pub fn run_overview(stats: &PipelineStats, config: &OverviewConfig) -> Result<OverviewReport> {
    let features = FeatureMatrix::from_stats(stats, &config.excluded_fields)?;

    let normalized = center_normalize(&features, &config.wide_range_fields);
    let projection = match project(&normalized.matrix) {
        Ok(p) => Some(p),
        Err(SweepError::DegenerateProjection(msg)) => {
            log::warn!("projection skipped: {msg}");
            None
        }
        Err(e) => return Err(e),
    };

    let scaled = scale_normalize(&features, &config.scale_anchors);

    let read_reduction = reduce(stats, &config.read_reducers, Metric::Reads);
    let bp_reduction = reduce(stats, &config.bp_reducers, Metric::Basepairs);

    Ok(OverviewReport {
        normalized,
        scaled,
        projection,
        read_reduction,
        bp_reduction,
    })
}
