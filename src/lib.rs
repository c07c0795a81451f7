#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

//! Statistics normalization and 2-D projection engine for multi-stage
//! read-cleaning pipeline reports.
//!
//! Consumes already-parsed per-stage, per-sample statistics records and
//! produces the structured payloads an overview section renders: a
//! normalized sample-by-feature matrix, a rank-2 principal-component
//! projection with per-feature loadings and percent variance explained,
//! and per-metric reduction series tracking how read and basepair counts
//! shrink across successive stages. Parsing the raw statistics files and
//! drawing the results belong to the surrounding layers.

pub mod overview;
pub mod structs;

pub use overview::normalize::{center_normalize, scale_normalize};
pub use overview::pipeline::{run_overview, OverviewConfig};
pub use overview::projection::project;
pub use overview::reduction::reduce;
pub use structs::{
    base_stage_name, EndCounts, EndLayout, EndSeries, FeatureMatrix, FieldValue, Loading, Metric,
    NormalizationResult, OverviewReport, PipelineStats, ProjectionResult, RawSnapshot,
    ReductionReport, Result, StageRecord, SweepError, INPUT_STAGE,
};
