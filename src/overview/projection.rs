//! Rank-2 principal-component projection of the normalized matrix

use crate::structs::{FeatureMatrix, Loading, ProjectionResult, Result, SweepError};
use nalgebra::{DMatrix, SymmetricEigen};
use std::collections::HashMap;

/// Project samples onto the top two principal components of the
/// feature-by-feature covariance matrix.
///
/// Covariance is taken across samples with one variable per feature, so
/// the decomposition runs in feature space and the per-feature loadings
/// fall straight out of the eigenvectors. Sample coordinates are
/// `W^T · column` with `W` the two top eigenvectors stacked.
///
/// # Errors
/// Returns `DegenerateProjection` when fewer than 2 samples or fewer
/// than 2 features are available, or when the matrix carries no variance
/// at all. Callers should treat that as "not enough data", not as fatal.
#[allow(clippy::cast_precision_loss)]
pub fn project(matrix: &FeatureMatrix) -> Result<ProjectionResult> {
    let m = matrix.n_features();
    let n = matrix.n_samples();

    if m < 2 {
        return Err(SweepError::DegenerateProjection(format!(
            "{m} surviving feature(s), need at least 2"
        )));
    }
    if n < 2 {
        return Err(SweepError::DegenerateProjection(format!(
            "{n} sample(s), need at least 2"
        )));
    }

    let means: Vec<f64> = (0..m)
        .map(|i| matrix.values.row(i).sum() / n as f64)
        .collect();

    // sample covariance across samples, one variable per feature
    let cov = DMatrix::from_fn(m, m, |i, j| {
        let mut acc = 0.0;
        for k in 0..n {
            acc += (matrix.values[(i, k)] - means[i]) * (matrix.values[(j, k)] - means[j]);
        }
        acc / (n - 1) as f64
    });

    // real by construction: the input is symmetric, so there is no
    // imaginary component to discard
    let eigen = SymmetricEigen::new(cov);

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .abs()
            .partial_cmp(&eigen.eigenvalues[a].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total: f64 = eigen.eigenvalues.iter().map(|v| v.abs()).sum();
    if total <= 0.0 {
        return Err(SweepError::DegenerateProjection(
            "matrix carries no variance".to_string(),
        ));
    }

    let (first, second) = (order[0], order[1]);
    let percent_variance = [
        eigen.eigenvalues[first].abs() / total * 100.0,
        eigen.eigenvalues[second].abs() / total * 100.0,
    ];

    let w1 = eigen.eigenvectors.column(first);
    let w2 = eigen.eigenvectors.column(second);

    let loadings: HashMap<String, Loading> = matrix
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), Loading { x: w1[i], y: w2[i] }))
        .collect();

    let mut coordinates = HashMap::new();
    for (j, sample) in matrix.samples.iter().enumerate() {
        let mut pc1 = 0.0;
        let mut pc2 = 0.0;
        for i in 0..m {
            pc1 += w1[i] * matrix.values[(i, j)];
            pc2 += w2[i] * matrix.values[(i, j)];
        }
        coordinates.insert(sample.clone(), (pc1, pc2));
    }

    Ok(ProjectionResult {
        coordinates,
        loadings,
        percent_variance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn matrix(labels: &[&str], samples: &[&str], values: ndarray::Array2<f64>) -> FeatureMatrix {
        FeatureMatrix {
            labels: labels.iter().map(|s| (*s).to_string()).collect(),
            values,
            samples: samples.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn test_too_few_samples_is_degenerate() {
        let m = matrix(&["f1", "f2"], &["s1"], array![[1.0], [2.0]]);
        assert!(matches!(
            project(&m),
            Err(SweepError::DegenerateProjection(_))
        ));
    }

    #[test]
    fn test_too_few_features_is_degenerate() {
        let m = matrix(&["f1"], &["s1", "s2"], array![[1.0, 2.0]]);
        assert!(matches!(
            project(&m),
            Err(SweepError::DegenerateProjection(_))
        ));
    }

    #[test]
    fn test_no_variance_is_degenerate() {
        let m = matrix(
            &["f1", "f2"],
            &["s1", "s2"],
            array![[1.0, 1.0], [2.0, 2.0]],
        );
        assert!(matches!(
            project(&m),
            Err(SweepError::DegenerateProjection(_))
        ));
    }

    #[test]
    fn test_percent_variance_bounds() {
        let m = matrix(
            &["f1", "f2", "f3"],
            &["s1", "s2", "s3", "s4"],
            array![
                [1.0, 2.0, 3.0, 4.0],
                [0.5, 0.1, 0.9, 0.4],
                [10.0, 5.0, 7.0, 2.0]
            ],
        );

        let result = project(&m).expect("project");

        let [pc1, pc2] = result.percent_variance;
        assert!(pc1 >= 0.0 && pc2 >= 0.0);
        assert!(pc1 >= pc2);
        assert!(pc1 + pc2 <= 100.0 + 1e-9);
    }

    #[test]
    fn test_two_feature_projection_preserves_distances() {
        // with 2 features both components are retained, so the rotation
        // must preserve pairwise sample distances exactly
        let m = matrix(
            &["f1", "f2"],
            &["s1", "s2", "s3", "s4"],
            array![[1.0, -1.0, 2.0, -2.0], [3.0, 1.0, -1.0, -3.0]],
        );

        let result = project(&m).expect("project");

        for a in 0..4 {
            for b in (a + 1)..4 {
                let original = distance(
                    (m.values[(0, a)], m.values[(1, a)]),
                    (m.values[(0, b)], m.values[(1, b)]),
                );
                let projected = distance(
                    result.coordinates[&m.samples[a]],
                    result.coordinates[&m.samples[b]],
                );
                assert!((original - projected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_loadings_cover_all_features() {
        let m = matrix(
            &["f1", "f2", "f3"],
            &["s1", "s2", "s3"],
            array![[1.0, 2.0, 4.0], [0.2, 0.8, 0.5], [9.0, 3.0, 6.0]],
        );

        let result = project(&m).expect("project");

        assert_eq!(result.loadings.len(), 3);
        assert!(result.loadings.contains_key("f2"));
        assert_eq!(result.coordinates.len(), 3);
    }
}
