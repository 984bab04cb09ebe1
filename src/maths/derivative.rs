use crate::core::DerivedKind;

/// Central finite difference of `values` with respect to `time`.
///
/// `out[i] = (values[i+w] - values[i-w]) / (time[i+w] - time[i-w])`.
/// Rows whose neighbours fall outside the series, and rows where the time
/// span is not strictly positive, are NaN.
pub fn central_derivative(values: &[f64], time: &[f64], window: usize) -> Vec<f64> {
    let n = values.len().min(time.len());
    let mut out = vec![f64::NAN; values.len()];

    if window == 0 {
        return out;
    }

    for i in window..n.saturating_sub(window) {
        let dt = time[i + window] - time[i - window];
        if dt > 0.0 && dt.is_finite() {
            out[i] = (values[i + window] - values[i - window]) / dt;
        }
    }

    out
}

/// Apply the derivative `kind.order()` times
pub fn derive(values: &[f64], time: &[f64], kind: DerivedKind, window: usize) -> Vec<f64> {
    let mut current = values.to_vec();
    for _ in 0..kind.order() {
        current = central_derivative(&current, time, window);
    }
    current
}
