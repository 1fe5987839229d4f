use crate::core::series::series_total;
use strum_macros::{Display, EnumString};

// 24-hour radiant time factors for a representative medium-weight
// construction (ASHRAE Fundamentals ch. 18, radiant time series method).
// Each row sums to exactly 1.0: all absorbed radiant energy is re-released
// as convection within 24 hours.
const SOLAR_RADIANT_TIME_FACTORS: [f64; 24] = [
    0.54, 0.16, 0.08, 0.04, 0.03, 0.02, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01,
    0.01, 0.01, 0.01, 0.01, 0.0, 0.0, 0.0, 0.0, 0.0,
];
const NONSOLAR_RADIANT_TIME_FACTORS: [f64; 24] = [
    0.53, 0.17, 0.09, 0.05, 0.03, 0.02, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01,
    0.01, 0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

/// Tolerance on the annual conservation property of [`radiant_delay`]: the
/// delayed series must carry the same annual total as its input to within 1%.
pub const RTS_CONSERVATION_TOLERANCE: f64 = 0.01;

/// Selects the radiant time series applied to a gain: solar gains decay with
/// a different profile than radiant gains from internal loads and infrared.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
pub enum RadiantKernel {
    #[strum(serialize = "solar")]
    Solar,
    #[strum(serialize = "nonsolar")]
    NonSolar,
}

impl RadiantKernel {
    pub fn weights(&self) -> &'static [f64; 24] {
        match self {
            RadiantKernel::Solar => &SOLAR_RADIANT_TIME_FACTORS,
            RadiantKernel::NonSolar => &NONSOLAR_RADIANT_TIME_FACTORS,
        }
    }
}

/// Convert an instantaneous radiant gain series into the convective gain it
/// produces over the following 24 hours.
///
/// For each output step, the preceding `24 * steps_per_hour` steps (current
/// step included) are partitioned into 24 hour blocks, most recent first;
/// each block's average is weighted by the kernel factor for its lag hour and
/// the weighted averages are summed.
///
/// The lookback treats the series as annually periodic: indexes before the
/// start of the series wrap around to its end. A full simulated year has no
/// "before start", and periodic indexing makes the conservation property
/// exact over the year rather than clipped in the first simulated day.
///
/// `steps_per_hour` must be at least 1.
pub fn radiant_delay(load: &[f64], steps_per_hour: usize, kernel: RadiantKernel) -> Vec<f64> {
    let num_ts = load.len() as isize;
    if num_ts == 0 {
        return vec![];
    }

    let weights = kernel.weights();
    (0..num_ts)
        .map(|i| {
            weights
                .iter()
                .enumerate()
                .filter(|(_, weight)| **weight != 0.)
                .map(|(hour, weight)| {
                    let hour_total: f64 = (0..steps_per_hour)
                        .map(|sub_step| {
                            let lag = (hour * steps_per_hour + sub_step) as isize;
                            load[(i - lag).rem_euclid(num_ts) as usize]
                        })
                        .sum();
                    weight * hour_total / steps_per_hour as f64
                })
                .sum()
        })
        .collect()
}

/// Relative error between the annual totals of a delayed series and the raw
/// series it was derived from. Returns `None` when the raw series sums to
/// zero, in which case there is nothing to conserve.
pub fn conservation_error(load: &[f64], delayed: &[f64]) -> Option<f64> {
    let raw_total = series_total(load);
    if raw_total == 0. {
        return None;
    }
    Some(((series_total(delayed) - raw_total) / raw_total).abs())
}
