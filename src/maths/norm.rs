use crate::core::Series;

/// Euclidean norm of a vector
pub fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Euclidean norm of every row
pub fn row_norms(series: &Series) -> Vec<f64> {
    series.rows().map(|row| norm(&row)).collect()
}

/// Largest row norm, ignoring rows that are not computable
pub fn peak_norm(series: &Series) -> Option<f64> {
    row_norms(series)
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |peak, v| Some(peak.map_or(v, |p: f64| p.max(v))))
}

/// Path length travelled through consecutive rows.
///
/// The first row contributes a zero step, so a single-row series travels
/// 0.0; an empty series has no defined distance. A step component touching
/// a missing (NaN) sample counts as 0.
pub fn traveled_distance(series: &Series) -> Option<f64> {
    if series.is_empty() {
        return None;
    }

    let mut total = 0.0;
    let mut previous = series.row(0);
    for row in series.rows().skip(1) {
        let step: Vec<f64> = row
            .iter()
            .zip(&previous)
            .map(|(a, b)| a - b)
            .map(|d| if d.is_nan() { 0.0 } else { d })
            .collect();
        total += norm(&step);
        previous = row;
    }
    Some(total)
}

/// Norm of the difference between two rows of the same series
pub fn displacement(series: &Series, from_row: usize, to_row: usize) -> f64 {
    let from = series.row(from_row);
    let to = series.row(to_row);
    let diff: Vec<f64> = to.iter().zip(&from).map(|(a, b)| a - b).collect();
    norm(&diff)
}
