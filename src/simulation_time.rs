use crate::core::units::{HOURS_PER_YEAR, MINUTES_PER_HOUR, SECONDS_PER_HOUR};
use crate::errors::PreconditionError;
use serde::Deserialize;

/// The timestep grid of a completed annual simulation run.
///
/// The engine only decomposes full-year results, so construction fails when
/// the run covered anything other than 8760 hours, before any series is
/// fetched.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(try_from = "SimulationRunPeriod")]
pub struct AnnualTimeSteps {
    steps_per_hour: usize,
}

#[derive(Deserialize)]
pub(crate) struct SimulationRunPeriod {
    hours_simulated: f64,
    steps_per_hour: usize,
}

impl TryFrom<SimulationRunPeriod> for AnnualTimeSteps {
    type Error = PreconditionError;

    fn try_from(period: SimulationRunPeriod) -> Result<Self, Self::Error> {
        AnnualTimeSteps::new(period.hours_simulated, period.steps_per_hour)
    }
}

impl AnnualTimeSteps {
    pub fn new(hours_simulated: f64, steps_per_hour: usize) -> Result<Self, PreconditionError> {
        if hours_simulated != HOURS_PER_YEAR as f64 {
            return Err(PreconditionError::NotAnnual {
                hours_simulated,
                expected: HOURS_PER_YEAR,
            });
        }
        if !(1..=MINUTES_PER_HOUR as usize).contains(&steps_per_hour)
            || MINUTES_PER_HOUR as usize % steps_per_hour != 0
        {
            return Err(PreconditionError::InvalidStepsPerHour(steps_per_hour));
        }

        Ok(Self { steps_per_hour })
    }

    pub fn steps_per_hour(&self) -> usize {
        self.steps_per_hour
    }

    /// Total timestep count across the simulated year.
    pub fn num_timesteps(&self) -> usize {
        HOURS_PER_YEAR as usize * self.steps_per_hour
    }

    pub fn seconds_per_timestep(&self) -> f64 {
        SECONDS_PER_HOUR as f64 / self.steps_per_hour as f64
    }
}
