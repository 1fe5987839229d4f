use crate::core::heat_balance::channels::{self, ChannelSet};
use crate::core::heat_balance::rts::{
    conservation_error, radiant_delay, RadiantKernel, RTS_CONSERVATION_TOLERANCE,
};
use crate::core::heat_balance::surface::{SurfaceType, ZoneSurfaces};
use crate::core::series::{elementwise_sum, negated, scaled};
use crate::diagnostics::Diagnostics;
use crate::errors::{DecompositionError, PreconditionError};
use crate::input::ZoneInput;
use crate::provider::{
    self, GainComponent, InternalGainCategory, ReportingFrequency, SeriesUnit, TimeSeriesProvider,
};
use crate::simulation_time::AnnualTimeSteps;
use itertools::Itertools;
use strum::IntoEnumIterator;

/// Provider access for one zone's assembly: validates every fetched series
/// against the run length and converts rate-valued series to energy.
pub(crate) struct ZoneSeriesFetcher<'a, P> {
    provider: &'a P,
    time_steps: AnnualTimeSteps,
}

impl<'a, P: TimeSeriesProvider> ZoneSeriesFetcher<'a, P> {
    pub(crate) fn new(provider: &'a P, time_steps: AnnualTimeSteps) -> Self {
        Self {
            provider,
            time_steps,
        }
    }

    pub(crate) fn num_timesteps(&self) -> usize {
        self.time_steps.num_timesteps()
    }

    pub(crate) fn steps_per_hour(&self) -> usize {
        self.time_steps.steps_per_hour()
    }

    fn zeros(&self) -> Vec<f64> {
        vec![0.; self.num_timesteps()]
    }

    fn fetch(
        &self,
        variable: &str,
        key: &str,
        unit: SeriesUnit,
    ) -> Result<Vec<f64>, DecompositionError> {
        let expected = self.num_timesteps();
        let series =
            self.provider
                .fetch(variable, key, ReportingFrequency::Timestep, expected, unit)?;
        if series.len() != expected {
            return Err(PreconditionError::SeriesLengthMismatch {
                variable: variable.to_owned(),
                key: key.to_owned(),
                expected,
                actual: series.len(),
            }
            .into());
        }
        Ok(series)
    }

    /// Fetch an energy-valued series in joules per timestep.
    pub(crate) fn fetch_energy(
        &self,
        variable: &str,
        key: &str,
    ) -> Result<Vec<f64>, DecompositionError> {
        self.fetch(variable, key, SeriesUnit::Joules)
    }

    /// Fetch a rate-valued series in watts and scale it to joules per
    /// timestep.
    pub(crate) fn fetch_rate_as_energy(
        &self,
        variable: &str,
        key: &str,
    ) -> Result<Vec<f64>, DecompositionError> {
        let series = self.fetch(variable, key, SeriesUnit::Watts)?;
        Ok(scaled(&series, self.time_steps.seconds_per_timestep()))
    }

    /// As [`Self::fetch_energy`], but an unreported variable yields an
    /// all-zero series. Used for loads a zone may simply not have.
    pub(crate) fn fetch_energy_or_zero(
        &self,
        variable: &str,
        key: &str,
    ) -> Result<Vec<f64>, DecompositionError> {
        if self.provider.is_reported(variable, key) {
            self.fetch_energy(variable, key)
        } else {
            Ok(self.zeros())
        }
    }

    pub(crate) fn fetch_rate_as_energy_or_zero(
        &self,
        variable: &str,
        key: &str,
    ) -> Result<Vec<f64>, DecompositionError> {
        if self.provider.is_reported(variable, key) {
            self.fetch_rate_as_energy(variable, key)
        } else {
            Ok(self.zeros())
        }
    }
}

fn accumulate_scaled(into: &mut [f64], series: &[f64], factor: f64) {
    for (accumulated, value) in into.iter_mut().zip_eq(series) {
        *accumulated += value * factor;
    }
}

/// Apply the radiant delay and report a conservation breach on the result.
fn delay_and_check(
    load: &[f64],
    steps_per_hour: usize,
    kernel: RadiantKernel,
    label: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<f64> {
    let delayed = radiant_delay(load, steps_per_hour, kernel);
    if let Some(error) = conservation_error(load, &delayed) {
        if error > RTS_CONSERVATION_TOLERANCE {
            diagnostics.error(format!(
                "Radiant delay of {label} changed the annual total by {:.2}%, above the {:.0}% tolerance",
                error * 100.,
                RTS_CONSERVATION_TOLERANCE * 100.
            ));
        }
    }
    delayed
}

/// Window solar and shading channels: transmitted solar with its delayed
/// form, and for shaded windows the gap convection and net infrared exchange
/// (with its delayed form).
pub(crate) fn window_channels<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
    surfaces: &ZoneSurfaces,
    diagnostics: &mut Diagnostics,
) -> Result<ChannelSet, DecompositionError> {
    let mut fragment = ChannelSet::new(fetcher.num_timesteps());

    let transmitted = fetcher.fetch_energy_or_zero(provider::WINDOW_TRANSMITTED_SOLAR, &zone.name)?;
    let delayed = delay_and_check(
        &transmitted,
        fetcher.steps_per_hour(),
        RadiantKernel::Solar,
        "window transmitted solar",
        diagnostics,
    );
    fragment.insert(channels::WINDOW_TRANSMITTED_SOLAR, transmitted);
    fragment.insert(channels::WINDOW_TRANSMITTED_SOLAR_DELAYED, delayed);

    let mut gap = vec![0.; fetcher.num_timesteps()];
    let mut net_infrared = vec![0.; fetcher.num_timesteps()];
    // shading on doors carries no reported gap or glazing series
    for window in surfaces
        .elements
        .iter()
        .filter(|e| e.surface_type == SurfaceType::ExteriorWindow && e.has_shading_control)
    {
        let gap_energy =
            fetcher.fetch_rate_as_energy(provider::WINDOW_GAP_CONVECTIVE_RATE, &window.name)?;
        let glazing =
            fetcher.fetch_rate_as_energy(provider::WINDOW_GLAZING_NET_INFRARED_RATE, &window.name)?;
        let shade =
            fetcher.fetch_rate_as_energy(provider::WINDOW_SHADE_NET_INFRARED_RATE, &window.name)?;
        accumulate_scaled(&mut gap, &gap_energy, zone.multiplier);
        accumulate_scaled(&mut net_infrared, &glazing, zone.multiplier);
        accumulate_scaled(&mut net_infrared, &shade, zone.multiplier);
    }
    let delayed_infrared = delay_and_check(
        &net_infrared,
        fetcher.steps_per_hour(),
        RadiantKernel::NonSolar,
        "window net infrared",
        diagnostics,
    );
    fragment.insert(channels::SHADING_GAP_CONVECTION, gap);
    fragment.insert(channels::WINDOW_NET_INFRARED, net_infrared);
    fragment.insert(channels::WINDOW_NET_INFRARED_DELAYED, delayed_infrared);

    Ok(fragment)
}

/// Per-surface-type convection channels plus the zone-wide total.
///
/// The provider's sign convention is positive-into-surface, which is a loss
/// from the zone air; accumulation flips it to positive-gain-to-zone.
pub(crate) fn surface_convection_channels<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
    surfaces: &ZoneSurfaces,
) -> Result<ChannelSet, DecompositionError> {
    let mut fragment = ChannelSet::new(fetcher.num_timesteps());
    for surface_type in SurfaceType::iter() {
        fragment.ensure(channels::surface_convection_channel(surface_type));
    }
    fragment.ensure(channels::SURFACE_CONVECTION_TOTAL);

    for element in &surfaces.elements {
        let fetched =
            fetcher.fetch_energy(provider::SURFACE_INSIDE_FACE_CONVECTION, &element.name)?;
        let gain = scaled(&fetched, -zone.multiplier);
        fragment.accumulate(channels::surface_convection_channel(element.surface_type), &gain);
        fragment.accumulate(channels::SURFACE_CONVECTION_TOTAL, &gain);
    }

    Ok(fragment)
}

/// The twelve per-source internal gain channels and their instant, radiant
/// and delayed totals. Gap convection from shaded windows counts as an
/// instantaneous internal gain.
pub(crate) fn internal_gain_channels<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
    gap_convection: &[f64],
    diagnostics: &mut Diagnostics,
) -> Result<ChannelSet, DecompositionError> {
    let mut fragment = ChannelSet::new(fetcher.num_timesteps());
    let mut instant = gap_convection.to_vec();
    let mut radiant = vec![0.; fetcher.num_timesteps()];

    for category in InternalGainCategory::iter() {
        for component in GainComponent::iter() {
            let series =
                fetcher.fetch_energy_or_zero(&category.variable_name(component), &zone.name)?;
            match component {
                GainComponent::Convective => accumulate_scaled(&mut instant, &series, 1.),
                GainComponent::Radiant => accumulate_scaled(&mut radiant, &series, 1.),
            }
            fragment.insert(channels::internal_gain_channel(category, component), series);
        }
    }

    let delayed = delay_and_check(
        &radiant,
        fetcher.steps_per_hour(),
        RadiantKernel::NonSolar,
        "internal radiant gains",
        diagnostics,
    );
    fragment.insert(channels::INTERNAL_GAINS_RADIANT, radiant);
    fragment.insert(channels::INTERNAL_GAINS_INSTANT, instant);
    fragment.insert(channels::INTERNAL_GAINS_DELAYED, delayed);

    Ok(fragment)
}

/// Refrigeration, outdoor air and interzone air channels with their
/// subtotals. Loss-valued series are stored negated so every channel is
/// positive-gain-to-zone.
pub(crate) fn air_transfer_channels<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
) -> Result<ChannelSet, DecompositionError> {
    let mut fragment = ChannelSet::new(fetcher.num_timesteps());

    let refrigeration = negated(
        &fetcher.fetch_energy_or_zero(provider::REFRIGERATION_SENSIBLE_COOLING, &zone.name)?,
    );
    fragment.insert(channels::REFRIGERATION, refrigeration);

    let infiltration_gain = fetcher.fetch_energy_or_zero(provider::INFILTRATION_GAIN, &zone.name)?;
    let infiltration_loss =
        negated(&fetcher.fetch_energy_or_zero(provider::INFILTRATION_LOSS, &zone.name)?);
    let infiltration = elementwise_sum(&infiltration_gain, &infiltration_loss);
    fragment.insert(channels::INFILTRATION_GAIN, infiltration_gain);
    fragment.insert(channels::INFILTRATION_LOSS, infiltration_loss);

    let ventilation_gain = fetcher.fetch_energy_or_zero(provider::VENTILATION_GAIN, &zone.name)?;
    let ventilation_loss =
        negated(&fetcher.fetch_energy_or_zero(provider::VENTILATION_LOSS, &zone.name)?);
    let ventilation = elementwise_sum(&ventilation_gain, &ventilation_loss);
    fragment.insert(channels::VENTILATION_GAIN, ventilation_gain);
    fragment.insert(channels::VENTILATION_LOSS, ventilation_loss);

    let outdoor_air = elementwise_sum(&infiltration, &ventilation);
    fragment.insert(channels::INFILTRATION, infiltration);
    fragment.insert(channels::VENTILATION, ventilation);
    fragment.insert(channels::OUTDOOR_AIR_TRANSFER, outdoor_air);

    let mixing_gain = fetcher.fetch_energy_or_zero(provider::MIXING_GAIN, &zone.name)?;
    let mixing_loss = negated(&fetcher.fetch_energy_or_zero(provider::MIXING_LOSS, &zone.name)?);
    let mixing = elementwise_sum(&mixing_gain, &mixing_loss);
    let exhaust = fetcher.fetch_rate_as_energy_or_zero(provider::EXHAUST_AIR_RATE, &zone.name)?;
    let exfiltration =
        fetcher.fetch_rate_as_energy_or_zero(provider::EXFILTRATION_RATE, &zone.name)?;
    let interzone_total =
        elementwise_sum(&elementwise_sum(&mixing, &exhaust), &exfiltration);
    fragment.insert(channels::INTERZONE_MIXING_GAIN, mixing_gain);
    fragment.insert(channels::INTERZONE_MIXING_LOSS, mixing_loss);
    fragment.insert(channels::INTERZONE_MIXING, mixing);
    fragment.insert(channels::EXHAUST_AIR_TRANSFER, exhaust);
    fragment.insert(channels::EXFILTRATION_TRANSFER, exfiltration);
    fragment.insert(channels::INTERZONE_AIR_TOTAL, interzone_total);

    Ok(fragment)
}

/// The seven air heat balance ground truths, converted from rates to energy.
/// These must exist for every zone: without them no subtotal can be
/// validated.
pub(crate) fn ground_truth_channels<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
) -> Result<ChannelSet, DecompositionError> {
    let mut fragment = ChannelSet::new(fetcher.num_timesteps());
    for (variable, channel) in [
        (provider::BALANCE_SURFACE_CONVECTION_RATE, channels::SURFACE_CONVECTION_BALANCE),
        (provider::BALANCE_INTERNAL_CONVECTIVE_RATE, channels::INTERNAL_CONVECTIVE_GAIN_BALANCE),
        (provider::BALANCE_OUTDOOR_AIR_RATE, channels::OUTDOOR_AIR_TRANSFER_BALANCE),
        (provider::BALANCE_INTERZONE_AIR_RATE, channels::INTERZONE_AIR_TRANSFER_BALANCE),
        (provider::BALANCE_SYSTEM_AIR_RATE, channels::SYSTEM_AIR_TRANSFER),
        (provider::BALANCE_SYSTEM_CONVECTIVE_RATE, channels::SYSTEM_CONVECTIVE_GAIN),
        (provider::BALANCE_AIR_STORAGE_RATE, channels::AIR_ENERGY_STORAGE),
    ] {
        fragment.insert(channel, fetcher.fetch_rate_as_energy(variable, &zone.name)?);
    }
    Ok(fragment)
}

/// Run the assembly pipeline for one zone, merging the fragments in channel
/// order. Attribution and closure run on the merged set afterwards.
pub(crate) fn assemble_zone<P: TimeSeriesProvider>(
    fetcher: &ZoneSeriesFetcher<P>,
    zone: &ZoneInput,
    surfaces: &ZoneSurfaces,
    diagnostics: &mut Diagnostics,
) -> Result<ChannelSet, DecompositionError> {
    let mut assembled = ChannelSet::new(fetcher.num_timesteps());

    let windows = window_channels(fetcher, zone, surfaces, diagnostics)?;
    let gap_convection = windows.expect_channel(channels::SHADING_GAP_CONVECTION).to_vec();
    assembled.merge(windows);
    assembled.merge(surface_convection_channels(fetcher, zone, surfaces)?);
    assembled.merge(internal_gain_channels(fetcher, zone, &gap_convection, diagnostics)?);
    assembled.merge(air_transfer_channels(fetcher, zone)?);
    assembled.merge(ground_truth_channels(fetcher, zone)?);

    diagnostics.info(format!(
        "Assembled {} channels over {} timesteps",
        assembled.len(),
        assembled.num_timesteps()
    ));
    Ok(assembled)
}
