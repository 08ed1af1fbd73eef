//! Small descriptive statistics over `f64` slices.

/// Arithmetic mean, or `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Sample standard deviation (n − 1 denominator), or `None` with fewer
/// than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    #[allow(clippy::cast_precision_loss)]
    let denom = (values.len() - 1) as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / denom;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // variance = ((−1)² + 0² + 1²) / 2 = 1
        assert_eq!(sample_std(&[1.0, 2.0, 3.0]), Some(1.0));
    }

    #[test]
    fn sample_std_needs_two_values() {
        assert_eq!(sample_std(&[4.0]), None);
    }

    #[test]
    fn sample_std_of_constant_series_is_zero() {
        assert_eq!(sample_std(&[7.0; 6]), Some(0.0));
    }
}
