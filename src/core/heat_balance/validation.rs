use crate::core::heat_balance::channels::{self, ChannelSet};
use crate::core::heat_balance::error_metrics::{
    annual_gain_error, annual_loss_error, summarize_abs_errors, timestep_error,
    DEFAULT_ERROR_DECIMALS,
};
use crate::core::series::{elementwise_sum, negated, scaled};
use crate::diagnostics::Diagnostics;

/// Annual gain/loss error above which a validation escalates from info to
/// error severity.
pub(crate) const SUBSYSTEM_ERROR_TOLERANCE: f64 = 0.05;

/// Compare every assembled subtotal against its ground truth and record the
/// annual gain and loss errors. Always reported, whatever their magnitude.
pub(crate) fn validate_subtotals(assembled: &ChannelSet, diagnostics: &mut Diagnostics) {
    for (label, approx_name, exact_name) in [
        (
            "surface convection",
            channels::SURFACE_CONVECTION_TOTAL,
            channels::SURFACE_CONVECTION_BALANCE,
        ),
        (
            "internal gains",
            channels::INTERNAL_GAINS_INSTANT,
            channels::INTERNAL_CONVECTIVE_GAIN_BALANCE,
        ),
        (
            "outdoor air transfer",
            channels::OUTDOOR_AIR_TRANSFER,
            channels::OUTDOOR_AIR_TRANSFER_BALANCE,
        ),
        (
            "interzone air transfer",
            channels::INTERZONE_AIR_TOTAL,
            channels::INTERZONE_AIR_TRANSFER_BALANCE,
        ),
    ] {
        let approx = assembled.expect_channel(approx_name);
        let exact = assembled.expect_channel(exact_name);
        report_errors(
            diagnostics,
            label,
            annual_gain_error(exact, approx, DEFAULT_ERROR_DECIMALS),
            annual_loss_error(exact, approx, DEFAULT_ERROR_DECIMALS),
        );
    }
}

fn report_errors(diagnostics: &mut Diagnostics, label: &str, gain_error: f64, loss_error: f64) {
    let message = format!(
        "Validated {label}: annual gain error {:.1}%, annual loss error {:.1}%",
        gain_error * 100.,
        loss_error * 100.
    );
    if gain_error.abs() > SUBSYSTEM_ERROR_TOLERANCE || loss_error.abs() > SUBSYSTEM_ERROR_TOLERANCE
    {
        diagnostics.error(message);
    } else {
        diagnostics.info(message);
    }
}

/// Close the full zone energy balance: sum the decomposed channels, compare
/// them against the system-plus-storage ground truth and store the three
/// closure channels. The closure errors are the headline data-quality
/// indicator for the zone.
pub(crate) fn validate_energy_balance(
    mut assembled: ChannelSet,
    diagnostics: &mut Diagnostics,
) -> ChannelSet {
    let mut total = vec![0.; assembled.num_timesteps()];
    for name in [
        channels::INTERNAL_GAINS_INSTANT,
        channels::REFRIGERATION,
        channels::INTERNAL_GAINS_DELAYED,
        channels::WINDOW_TRANSMITTED_SOLAR,
        channels::WINDOW_NET_INFRARED_DELAYED,
        channels::ATTRIBUTABLE_EXTERIOR_CONVECTION,
        channels::OUTDOOR_AIR_TRANSFER,
        channels::INTERZONE_AIR_TOTAL,
    ] {
        total = elementwise_sum(&total, assembled.expect_channel(name));
    }

    // The supply side runs on the opposite sign convention. Storage is
    // counted twice: once embedded in the demand-side convection term and
    // once as the explicit supply-side term.
    let mut true_total = elementwise_sum(
        assembled.expect_channel(channels::SYSTEM_AIR_TRANSFER),
        assembled.expect_channel(channels::SYSTEM_CONVECTIVE_GAIN),
    );
    true_total = elementwise_sum(
        &true_total,
        &scaled(assembled.expect_channel(channels::AIR_ENERGY_STORAGE), 2.),
    );
    let true_total = negated(&true_total);

    let errors = timestep_error(&true_total, &total, DEFAULT_ERROR_DECIMALS);
    let gain_error = annual_gain_error(&true_total, &total, DEFAULT_ERROR_DECIMALS);
    let loss_error = annual_loss_error(&true_total, &total, DEFAULT_ERROR_DECIMALS);
    report_errors(diagnostics, "zone energy balance closure", gain_error, loss_error);

    let summary = summarize_abs_errors(&errors);
    diagnostics.info(format!(
        "Closure timestep error: mean |e| {:.4}, p95 |e| {:.4}, max |e| {:.4}",
        summary.mean_abs, summary.p95_abs, summary.max_abs
    ));

    assembled.insert(channels::TOTAL_ZONE_HEAT_TRANSFER, total);
    assembled.insert(channels::TRUE_TOTAL_ENERGY_BALANCE, true_total);
    assembled.insert(channels::ENERGY_BALANCE_TIMESTEP_ERROR, errors);
    assembled
}
