//! Feature matrix extraction from per-stage, per-sample statistics

use crate::structs::{FeatureMatrix, PipelineStats, Result, SweepError, INPUT_STAGE};
use ndarray::Array2;

impl FeatureMatrix {
    /// Flatten per-stage, per-sample statistics into "stage: field"
    /// labels and a features x samples matrix.
    ///
    /// The first sample's field iteration order fixes the label order.
    /// Every other sample must expose the identical label set; a mismatch
    /// fails fast instead of silently misaligning columns. The input
    /// pseudo-stage, excluded fields, and text fields contribute nothing.
    ///
    /// # Errors
    /// Returns error if there are no samples, or if a sample's stage
    /// fields do not line up with the first sample's.
    pub fn from_stats(stats: &PipelineStats, excluded: &[String]) -> Result<Self> {
        if stats.samples().is_empty() {
            return Err(SweepError::DegenerateMatrix("no samples".to_string()));
        }

        let mut labels: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (j, sample) in stats.samples().iter().enumerate() {
            let mut column = Vec::new();
            let mut sample_labels = Vec::new();

            for stage in stats.stages() {
                if stage == INPUT_STAGE {
                    continue;
                }
                let Some(record) = stats.record(stage, sample) else {
                    // absent stage contributes nothing; the builder does not impute
                    continue;
                };

                for (field, value) in &record.fields {
                    if excluded.iter().any(|e| e == field) {
                        continue;
                    }
                    // text fields (notes) carry no numeric signal
                    let Some(v) = value.as_number() else { continue };
                    column.push(v);
                    sample_labels.push(format!("{stage}: {field}"));
                }
            }

            if j == 0 {
                labels = sample_labels;
            } else if labels != sample_labels {
                return Err(SweepError::InconsistentSamples(format!(
                    "sample {sample} does not expose the same stage fields as {first}",
                    first = stats.samples()[0]
                )));
            }
            columns.push(column);
        }

        let values = Array2::from_shape_fn((labels.len(), columns.len()), |(i, j)| columns[j][i]);

        Ok(Self {
            labels,
            values,
            samples: stats.samples().to_vec(),
        })
    }
}
