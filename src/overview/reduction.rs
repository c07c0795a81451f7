//! Reduction series feeding the composition comparison

use crate::structs::{
    base_stage_name, EndSeries, Metric, PipelineStats, ReductionReport, INPUT_STAGE,
};
use std::collections::HashMap;

/// Build per-sample reduction series for one metric.
///
/// Every series starts with the synthetic pipeline-input stage carrying
/// the metric's input count; stages whose instance-stripped name is in
/// the reducer set contribute their output count. Each included stage
/// also contributes single-end and paired-end output counts, with 0 for
/// an absent end type or a missing record. Returns `None` when fewer
/// than two stages are included, since a one-point series has nothing
/// to plot.
#[must_use]
pub fn reduce(
    stats: &PipelineStats,
    reducers: &[String],
    metric: Metric,
) -> Option<ReductionReport> {
    if stats.is_empty() {
        return None;
    }

    let mut included: Vec<String> = Vec::new();
    let mut totals = HashMap::new();
    let mut composition = HashMap::new();

    for (si, sample) in stats.samples().iter().enumerate() {
        let mut series = Vec::new();
        let mut ends = EndSeries::default();

        let walk = std::iter::once(INPUT_STAGE).chain(
            stats
                .stages()
                .iter()
                .map(String::as_str)
                .filter(|s| *s != INPUT_STAGE),
        );

        for stage in walk {
            let is_input = stage == INPUT_STAGE;
            if !is_input && !reducers.iter().any(|r| r == base_stage_name(stage)) {
                continue;
            }

            let record = stats.record(stage, sample);
            let field = if is_input {
                metric.input_field()
            } else {
                metric.output_field()
            };
            // a missing record or field is absorbed as 0, never an abort
            let value = record.and_then(|r| r.number(field)).unwrap_or(0.0);
            series.push((stage.to_string(), value));

            let single = record
                .and_then(|r| r.ends.single_end())
                .map_or(0.0, |c| c.get(metric));
            let paired = record
                .and_then(|r| r.ends.paired_end())
                .map_or(0.0, |c| c.get(metric));
            ends.single_end.push((stage.to_string(), single));
            ends.paired_end.push((stage.to_string(), paired));

            if si == 0 {
                included.push(stage.to_string());
            }
        }

        totals.insert(sample.clone(), series);
        composition.insert(sample.clone(), ends);
    }

    if included.len() < 2 {
        return None;
    }

    Some(ReductionReport {
        metric,
        stages: included,
        totals,
        composition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{EndCounts, EndLayout, StageRecord};

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn three_stage_stats() -> PipelineStats {
        let mut stats = PipelineStats::default();
        stats.insert(
            INPUT_STAGE,
            "s1",
            StageRecord::default()
                .with_field("Input_Reads", 1000.0)
                .with_field("Input_Bp", 150_000.0),
        );
        stats.insert(
            "ReducerA",
            "s1",
            StageRecord::new(EndLayout::Both {
                single: EndCounts {
                    reads_out: 100.0,
                    bps_out: 15_000.0,
                },
                paired: EndCounts {
                    reads_out: 800.0,
                    bps_out: 120_000.0,
                },
            })
            .with_field("Output_Reads", 900.0),
        );
        stats.insert(
            "ReducerB",
            "s1",
            StageRecord::new(EndLayout::SingleEndOnly(EndCounts {
                reads_out: 800.0,
                bps_out: 110_000.0,
            }))
            .with_field("Output_Reads", 800.0),
        );
        stats
    }

    #[test]
    fn test_three_stage_series_order_and_values() {
        let stats = three_stage_stats();
        let report =
            reduce(&stats, &owned(&["ReducerA", "ReducerB"]), Metric::Reads).expect("series");

        let series = &report.totals["s1"];
        assert_eq!(
            series,
            &[
                ("Pipeline Input".to_string(), 1000.0),
                ("ReducerA".to_string(), 900.0),
                ("ReducerB".to_string(), 800.0)
            ]
        );
        assert_eq!(report.stages, ["Pipeline Input", "ReducerA", "ReducerB"]);
    }

    #[test]
    fn test_absent_end_type_defaults_to_zero() {
        let stats = three_stage_stats();
        let report =
            reduce(&stats, &owned(&["ReducerA", "ReducerB"]), Metric::Reads).expect("series");

        let ends = &report.composition["s1"];
        // ReducerB only processes single-end data
        assert_eq!(ends.paired_end[2], ("ReducerB".to_string(), 0.0));
        assert_eq!(ends.single_end[2], ("ReducerB".to_string(), 800.0));
        assert_eq!(ends.paired_end[1], ("ReducerA".to_string(), 800.0));
    }

    #[test]
    fn test_no_reducers_means_nothing_to_plot() {
        let stats = three_stage_stats();
        assert!(reduce(&stats, &owned(&["hts_CutTrim"]), Metric::Reads).is_none());
        assert!(reduce(&PipelineStats::default(), &owned(&["ReducerA"]), Metric::Reads).is_none());
    }

    #[test]
    fn test_instance_suffix_matches_reducer_set() {
        let mut stats = PipelineStats::default();
        stats.insert(
            INPUT_STAGE,
            "s1",
            StageRecord::default().with_field("Input_Bp", 90_000.0),
        );
        stats.insert(
            "hts_CutTrim_2",
            "s1",
            StageRecord::default().with_field("Output_Bp", 80_000.0),
        );

        let report = reduce(&stats, &owned(&["hts_CutTrim"]), Metric::Basepairs).expect("series");
        assert_eq!(
            report.totals["s1"],
            [
                ("Pipeline Input".to_string(), 90_000.0),
                ("hts_CutTrim_2".to_string(), 80_000.0)
            ]
        );
    }

    #[test]
    fn test_missing_record_absorbs_to_zero() {
        let mut stats = three_stage_stats();
        // second sample only has the input pseudo-stage
        stats.insert(
            INPUT_STAGE,
            "s2",
            StageRecord::default().with_field("Input_Reads", 500.0),
        );

        let report =
            reduce(&stats, &owned(&["ReducerA", "ReducerB"]), Metric::Reads).expect("series");

        assert_eq!(
            report.totals["s2"],
            [
                ("Pipeline Input".to_string(), 500.0),
                ("ReducerA".to_string(), 0.0),
                ("ReducerB".to_string(), 0.0)
            ]
        );
    }
}
