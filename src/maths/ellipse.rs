//! Confidence ellipse of a 2D point cloud.
//!
//! The ellipse is the principal-component fit of the sample covariance,
//! scaled by the chi-square quantile of the requested confidence level so
//! that it encloses that fraction of a Gaussian scatter.

use anyhow::Result;
use nalgebra::{Matrix2, SymmetricEigen};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::Series;

/// Parameters of a fitted confidence ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceEllipse {
    pub center_x: f64,
    pub center_y: f64,
    /// Semi-major axis
    pub a: f64,
    /// Semi-minor axis
    pub b: f64,
    /// Angle of the major axis, radians
    pub theta: f64,
}

impl ConfidenceEllipse {
    fn not_computable() -> Self {
        Self {
            center_x: f64::NAN,
            center_y: f64::NAN,
            a: f64::NAN,
            b: f64::NAN,
            theta: f64::NAN,
        }
    }

    pub fn area(&self) -> f64 {
        PI * self.a * self.b
    }

    pub fn is_computable(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }
}

/// Inverse CDF of the chi-square distribution with two degrees of freedom
pub fn chi2_quantile_2dof(p: f64) -> f64 {
    -2.0 * (1.0 - p).ln()
}

/// Fit the confidence ellipse of a two-column point cloud.
///
/// Rows with a non-finite coordinate are skipped. Fewer than two remaining
/// rows leave the covariance undefined; the ellipse is then returned with
/// every field NaN rather than as an error.
pub fn fit_confidence_ellipse(points: &Series, confidence: f64) -> Result<ConfidenceEllipse> {
    if points.width() != 2 {
        anyhow::bail!(
            "Data must contain exactly two columns for x and y coordinates, got {}",
            points.width()
        );
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        anyhow::bail!("Confidence must be in (0, 1), got {}", confidence);
    }

    // Rows with a missing coordinate are left out of the fit
    let finite: Vec<(f64, f64)> = points
        .column(0)
        .iter()
        .zip(points.column(1))
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let n = finite.len();
    if n < 2 {
        return Ok(ConfidenceEllipse::not_computable());
    }

    let mean_x = finite.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = finite.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in &finite {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let denom = n as f64 - 1.0;
    let cov = Matrix2::new(sxx / denom, sxy / denom, sxy / denom, syy / denom);

    // The eigen solver iterates until convergence, which NaN never reaches
    if cov.iter().any(|v| !v.is_finite()) {
        return Ok(ConfidenceEllipse::not_computable());
    }

    let eig = SymmetricEigen::new(cov);
    let (major, minor) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };

    let k = chi2_quantile_2dof(confidence).sqrt();
    let major_vec = eig.eigenvectors.column(major);

    Ok(ConfidenceEllipse {
        center_x: mean_x,
        center_y: mean_y,
        a: eig.eigenvalues[major].max(0.0).sqrt() * k,
        b: eig.eigenvalues[minor].max(0.0).sqrt() * k,
        theta: major_vec[1].atan2(major_vec[0]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(radius: f64, n: usize) -> Series {
        let rows: Vec<[f64; 2]> = (0..n)
            .map(|i| {
                let phi = 2.0 * PI * i as f64 / n as f64;
                [3.0 + radius * phi.cos(), -1.0 + radius * phi.sin()]
            })
            .collect();
        Series::from_rows(&rows)
    }

    #[test]
    fn test_chi2_quantile_95() {
        // scipy.stats.chi2.ppf(0.95, df=2)
        assert!((chi2_quantile_2dof(0.95) - 5.991464547107979).abs() < 1e-9);
    }

    #[test]
    fn test_circular_cloud_is_isotropic() {
        let n = 16;
        let radius = 2.0;
        let points = circle(radius, n);
        let ellipse = fit_confidence_ellipse(&points, 0.95).unwrap();

        // Sample variance of r*cos over a full turn: r^2 * (n/2) / (n-1)
        let variance = radius * radius * (n as f64 / 2.0) / (n as f64 - 1.0);
        let k2 = chi2_quantile_2dof(0.95);

        assert!((ellipse.center_x - 3.0).abs() < 1e-9);
        assert!((ellipse.center_y + 1.0).abs() < 1e-9);
        assert!((ellipse.a - ellipse.b).abs() < 1e-9);
        assert!((ellipse.area() - PI * variance * k2).abs() < 1e-9);
    }

    #[test]
    fn test_elongated_cloud_orientation() {
        let rows: Vec<[f64; 2]> = (0..20)
            .map(|i| {
                let t = i as f64 - 9.5;
                let wobble = if i % 2 == 0 { 0.1 } else { -0.1 };
                [t, t + wobble]
            })
            .collect();
        let ellipse = fit_confidence_ellipse(&Series::from_rows(&rows), 0.95).unwrap();

        assert!(ellipse.a > ellipse.b);
        // Major axis along the diagonal, either direction
        let folded = ellipse.theta.rem_euclid(PI);
        assert!((folded - PI / 4.0).abs() < 0.01, "theta = {}", ellipse.theta);
    }

    #[test]
    fn test_fit_is_repeatable() {
        let points = Series::from_rows(&[[0.0, 1.0], [2.0, 0.5], [1.0, 3.0], [4.0, 2.0]]);
        let first = fit_confidence_ellipse(&points, 0.95).unwrap();
        let second = fit_confidence_ellipse(&points, 0.95).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_non_planar_input() {
        let points = Series::from_rows(&[[0.0, 1.0, 2.0], [1.0, 2.0, 3.0]]);
        assert!(fit_confidence_ellipse(&points, 0.95).is_err());

        let line = Series::from_rows(&[[0.0], [1.0]]);
        assert!(fit_confidence_ellipse(&line, 0.95).is_err());
    }

    #[test]
    fn test_single_point_is_not_computable() {
        let points = Series::from_rows(&[[1.0, 1.0]]);
        let ellipse = fit_confidence_ellipse(&points, 0.95).unwrap();
        assert!(!ellipse.is_computable());
        assert!(ellipse.area().is_nan());
    }

    #[test]
    fn test_missing_rows_are_skipped() {
        let points = Series::from_rows(&[[0.0, 1.0], [2.0, 0.5], [1.0, 3.0], [4.0, 2.0]]);
        let gappy = Series::from_rows(&[
            [0.0, 1.0],
            [f64::NAN, 7.0],
            [2.0, 0.5],
            [1.0, 3.0],
            [5.0, f64::NAN],
            [4.0, 2.0],
        ]);
        assert_eq!(
            fit_confidence_ellipse(&gappy, 0.95).unwrap(),
            fit_confidence_ellipse(&points, 0.95).unwrap()
        );

        let all_missing = Series::from_rows(&[[f64::NAN, 1.0], [2.0, f64::NAN]]);
        assert!(!fit_confidence_ellipse(&all_missing, 0.95).unwrap().is_computable());
    }

    #[test]
    fn test_stationary_cloud_has_zero_area() {
        let points = Series::from_rows(&[[1.0, 1.0]; 5]);
        let ellipse = fit_confidence_ellipse(&points, 0.95).unwrap();
        assert_eq!(ellipse.area(), 0.0);
    }
}
