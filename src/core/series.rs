//! Elementwise operations over per-timestep series. All series handled by the
//! engine share one length for a given zone run, so the pairwise operations
//! here require equal-length inputs.

use itertools::Itertools;

pub fn elementwise_sum(first: &[f64], second: &[f64]) -> Vec<f64> {
    first
        .iter()
        .zip_eq(second)
        .map(|(a, b)| a + b)
        .collect()
}

pub fn elementwise_difference(first: &[f64], second: &[f64]) -> Vec<f64> {
    first
        .iter()
        .zip_eq(second)
        .map(|(a, b)| a - b)
        .collect()
}

pub fn scaled(series: &[f64], factor: f64) -> Vec<f64> {
    series.iter().map(|value| value * factor).collect()
}

pub fn negated(series: &[f64]) -> Vec<f64> {
    series.iter().map(|value| -value).collect()
}

pub fn series_total(series: &[f64]) -> f64 {
    series.iter().sum()
}

/// Sum of the positive-valued elements only.
pub fn positive_total(series: &[f64]) -> f64 {
    series.iter().filter(|value| **value > 0.).sum()
}

/// Sum of the negative-valued elements only.
pub fn negative_total(series: &[f64]) -> f64 {
    series.iter().filter(|value| **value < 0.).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn series() -> Vec<f64> {
        vec![1.0, -2.0, 3.5, 0.0, -0.5]
    }

    #[rstest]
    fn should_sum_and_difference_elementwise(series: Vec<f64>) {
        let other = vec![0.5, 0.5, 0.5, 0.5, 0.5];
        assert_eq!(
            elementwise_sum(&series, &other),
            vec![1.5, -1.5, 4.0, 0.5, 0.0]
        );
        assert_eq!(
            elementwise_difference(&series, &other),
            vec![0.5, -2.5, 3.0, -0.5, -1.0]
        );
    }

    #[rstest]
    fn should_scale_and_negate(series: Vec<f64>) {
        assert_eq!(scaled(&series, 2.), vec![2.0, -4.0, 7.0, 0.0, -1.0]);
        assert_eq!(negated(&series), vec![-1.0, 2.0, -3.5, 0.0, 0.5]);
    }

    #[rstest]
    fn should_split_totals_by_sign(series: Vec<f64>) {
        assert_eq!(series_total(&series), 2.0);
        assert_eq!(positive_total(&series), 4.5);
        assert_eq!(negative_total(&series), -2.5);
    }

    #[rstest]
    #[should_panic]
    fn should_reject_length_mismatch() {
        elementwise_sum(&[1.0], &[1.0, 2.0]);
    }
}
