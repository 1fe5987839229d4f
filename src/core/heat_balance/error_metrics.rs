use crate::core::series::{negative_total, positive_total};
use itertools::Itertools;
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Max, OrderStatistics};

/// Decimal places the error metrics are rounded to unless a caller asks for
/// something else.
pub const DEFAULT_ERROR_DECIMALS: u32 = 3;

// Offset added to annual gain/loss sums so that a channel absent from both
// series (both sums zero) reports zero error instead of dividing by zero.
const ANNUAL_SUM_EPSILON: f64 = 0.01;

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Per-timestep relative error of `approx` against `exact`.
///
/// Steps where the exact value is zero report an error of zero: a zero
/// reference makes relative error meaningless and those steps are judged by
/// the annual metrics instead.
pub fn timestep_error(exact: &[f64], approx: &[f64], decimals: u32) -> Vec<f64> {
    exact
        .iter()
        .zip_eq(approx.iter())
        .map(|(e, a)| {
            if *e == 0. {
                0.
            } else {
                round_to((a - e) / e, decimals)
            }
        })
        .collect()
}

/// Relative error between the annual gains (sums of positive values) of the
/// two series.
pub fn annual_gain_error(exact: &[f64], approx: &[f64], decimals: u32) -> f64 {
    round_to(
        (positive_total(approx) + ANNUAL_SUM_EPSILON) / (positive_total(exact) + ANNUAL_SUM_EPSILON)
            - 1.,
        decimals,
    )
}

/// Relative error between the annual losses (sums of negative values) of the
/// two series.
pub fn annual_loss_error(exact: &[f64], approx: &[f64], decimals: u32) -> f64 {
    round_to(
        (negative_total(approx) - ANNUAL_SUM_EPSILON) / (negative_total(exact) - ANNUAL_SUM_EPSILON)
            - 1.,
        decimals,
    )
}

/// Distribution of the absolute per-timestep errors of a reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub max_abs: f64,
    pub mean_abs: f64,
    pub p95_abs: f64,
}

pub fn summarize_abs_errors(errors: &[f64]) -> ErrorSummary {
    if errors.is_empty() {
        return ErrorSummary::default();
    }
    let mut data = Data::new(errors.iter().map(|e| e.abs()).collect_vec());
    ErrorSummary {
        max_abs: data.max(),
        mean_abs: data.mean().unwrap_or(0.),
        p95_abs: data.percentile(95),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn identical_series_should_report_zero_everywhere() {
        let series = vec![12.5, -3.0, 0.0, 7.25];
        assert_eq!(
            timestep_error(&series, &series, DEFAULT_ERROR_DECIMALS),
            vec![0.0; 4]
        );
        assert_eq!(annual_gain_error(&series, &series, DEFAULT_ERROR_DECIMALS), 0.0);
        assert_eq!(annual_loss_error(&series, &series, DEFAULT_ERROR_DECIMALS), 0.0);
    }

    #[rstest]
    fn timestep_error_should_skip_zero_reference_steps() {
        let exact = vec![0.0, 100.0];
        let approx = vec![55.0, 110.0];
        assert_eq!(timestep_error(&exact, &approx, 3), vec![0.0, 0.1]);
    }

    #[rstest]
    #[case(2, 0.33)]
    #[case(4, 0.3333)]
    fn timestep_error_should_round_to_requested_decimals(
        #[case] decimals: u32,
        #[case] expected: f64,
    ) {
        let errors = timestep_error(&[3.0], &[4.0], decimals);
        assert_eq!(errors, vec![expected]);
    }

    #[rstest]
    fn annual_errors_should_compare_signed_sums_separately() {
        let exact = vec![100.0, -50.0];
        let approx = vec![110.0, -60.0];
        assert_eq!(annual_gain_error(&exact, &approx, 3), 0.1);
        assert_eq!(annual_loss_error(&exact, &approx, 3), 0.2);
    }

    #[rstest]
    fn annual_errors_should_report_zero_for_channels_absent_from_both_series() {
        let zeroes = vec![0.0; 8];
        assert_eq!(annual_gain_error(&zeroes, &zeroes, 3), 0.0);
        assert_eq!(annual_loss_error(&zeroes, &zeroes, 3), 0.0);
    }

    #[rstest]
    fn summary_should_describe_absolute_errors() {
        let summary = summarize_abs_errors(&[0.1, -0.2, 0.05, 0.0]);
        assert_relative_eq!(summary.max_abs, 0.2);
        assert_relative_eq!(summary.mean_abs, 0.0875);
        assert!(
            (0.1..=0.2).contains(&summary.p95_abs),
            "p95 {} outside plausible range",
            summary.p95_abs
        );
    }

    #[rstest]
    fn summary_of_empty_input_should_be_zeroed() {
        assert_eq!(summarize_abs_errors(&[]), ErrorSummary::default());
    }
}
