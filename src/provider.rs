use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use strum_macros::{Display, EnumIter};

// Simulation output variables the engine fetches, named exactly as the
// simulation engine reports them. Energy variables carry joules per
// timestep; rate variables carry watts and are scaled to joules on fetch.
pub const SURFACE_INSIDE_FACE_CONVECTION: &str = "Surface Inside Face Convection Heat Gain Energy";
pub const WINDOW_TRANSMITTED_SOLAR: &str =
    "Zone Windows Total Transmitted Solar Radiation Energy";
pub const WINDOW_GAP_CONVECTIVE_RATE: &str = "Surface Window Gap Convective Heat Transfer Rate";
pub const WINDOW_GLAZING_NET_INFRARED_RATE: &str =
    "Surface Window Inside Face Glazing Net Infrared Heat Transfer Rate";
pub const WINDOW_SHADE_NET_INFRARED_RATE: &str =
    "Surface Window Inside Face Shade Net Infrared Heat Transfer Rate";
pub const INFILTRATION_GAIN: &str = "Zone Infiltration Sensible Heat Gain Energy";
pub const INFILTRATION_LOSS: &str = "Zone Infiltration Sensible Heat Loss Energy";
pub const VENTILATION_GAIN: &str = "Zone Ventilation Sensible Heat Gain Energy";
pub const VENTILATION_LOSS: &str = "Zone Ventilation Sensible Heat Loss Energy";
pub const MIXING_GAIN: &str = "Zone Mixing Sensible Heat Gain Energy";
pub const MIXING_LOSS: &str = "Zone Mixing Sensible Heat Loss Energy";
pub const EXHAUST_AIR_RATE: &str = "Zone Exhaust Air Sensible Heat Transfer Rate";
pub const EXFILTRATION_RATE: &str = "Zone Exfiltration Sensible Heat Transfer Rate";
pub const REFRIGERATION_SENSIBLE_COOLING: &str =
    "Refrigeration Zone Case and Walk In Total Sensible Cooling Energy";

// Air heat balance ground truths, all rate-valued.
pub const BALANCE_SURFACE_CONVECTION_RATE: &str = "Zone Air Heat Balance Surface Convection Rate";
pub const BALANCE_INTERNAL_CONVECTIVE_RATE: &str =
    "Zone Air Heat Balance Internal Convective Heat Gain Rate";
pub const BALANCE_OUTDOOR_AIR_RATE: &str = "Zone Air Heat Balance Outdoor Air Transfer Rate";
pub const BALANCE_INTERZONE_AIR_RATE: &str = "Zone Air Heat Balance Interzone Air Transfer Rate";
pub const BALANCE_SYSTEM_AIR_RATE: &str = "Zone Air Heat Balance System Air Transfer Rate";
pub const BALANCE_SYSTEM_CONVECTIVE_RATE: &str =
    "Zone Air Heat Balance System Convective Heat Gain Rate";
pub const BALANCE_AIR_STORAGE_RATE: &str = "Zone Air Heat Balance Air Energy Storage Rate";

/// Internal-gain sources the simulation reports separately per zone.
/// `Display` gives the fragment used in the reported variable names.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum InternalGainCategory {
    People,
    Lights,
    #[strum(serialize = "Electric Equipment")]
    ElectricEquipment,
    #[strum(serialize = "Gas Equipment")]
    GasEquipment,
    #[strum(serialize = "Hot Water Equipment")]
    HotWaterEquipment,
    #[strum(serialize = "Other Equipment")]
    OtherEquipment,
}

/// Split of every internal gain into the part released directly to the air
/// and the part absorbed by surfaces first.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum GainComponent {
    Convective,
    Radiant,
}

impl InternalGainCategory {
    pub fn variable_name(&self, component: GainComponent) -> String {
        format!("Zone {self} {component} Heating Energy")
    }
}

/// How often a variable was reported. The engine always requests
/// timestep-resolution series; the other frequencies exist so providers can
/// describe what they actually hold.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ReportingFrequency {
    Timestep,
    Hourly,
    RunPeriod,
}

/// Unit a fetched series is expected to carry.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum SeriesUnit {
    #[strum(serialize = "J")]
    Joules,
    #[strum(serialize = "W")]
    Watts,
}

/// Source of simulated time series, keyed by (reported variable name,
/// reporting key). Reporting keys are zone or surface names exactly as they
/// appear in the building topology.
pub trait TimeSeriesProvider {
    /// Whether `variable` was reported on `key` at all. Simulation engines
    /// only report variables for objects that exist, so absence is an
    /// ordinary condition the caller decides how to treat.
    fn is_reported(&self, variable: &str, key: &str) -> bool;

    /// Fetch the series reported for `variable` on `key`.
    ///
    /// `length` is the number of values the caller expects; providers may use
    /// it to size or bound their read, but the engine independently validates
    /// the returned length. Requesting an unreported combination, the wrong
    /// frequency or the wrong unit is an error.
    fn fetch(
        &self,
        variable: &str,
        key: &str,
        frequency: ReportingFrequency,
        length: usize,
        expected_unit: SeriesUnit,
    ) -> anyhow::Result<Vec<f64>>;
}

#[derive(Clone, Debug)]
struct StoredSeries {
    values: Vec<f64>,
    unit: SeriesUnit,
    frequency: ReportingFrequency,
}

/// [`TimeSeriesProvider`] backed by a map, for embedders that already hold
/// their simulation output in memory and for tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    series: IndexMap<(String, String), StoredSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Default::default()
    }

    /// Store a timestep-resolution series.
    pub fn insert(
        &mut self,
        variable: impl Into<String>,
        key: impl Into<String>,
        unit: SeriesUnit,
        values: Vec<f64>,
    ) {
        self.insert_with_frequency(variable, key, unit, ReportingFrequency::Timestep, values);
    }

    pub fn insert_with_frequency(
        &mut self,
        variable: impl Into<String>,
        key: impl Into<String>,
        unit: SeriesUnit,
        frequency: ReportingFrequency,
        values: Vec<f64>,
    ) {
        self.series.insert(
            (variable.into(), key.into()),
            StoredSeries {
                values,
                unit,
                frequency,
            },
        );
    }
}

impl TimeSeriesProvider for InMemoryProvider {
    fn is_reported(&self, variable: &str, key: &str) -> bool {
        self.series
            .contains_key(&(variable.to_owned(), key.to_owned()))
    }

    fn fetch(
        &self,
        variable: &str,
        key: &str,
        frequency: ReportingFrequency,
        _length: usize,
        expected_unit: SeriesUnit,
    ) -> anyhow::Result<Vec<f64>> {
        let stored = self
            .series
            .get(&(variable.to_owned(), key.to_owned()))
            .ok_or_else(|| anyhow!("no series stored for variable '{variable}' on key '{key}'"))?;
        if stored.frequency != frequency {
            bail!(
                "series for variable '{variable}' on key '{key}' was stored at {} frequency but {frequency} was requested",
                stored.frequency
            );
        }
        if stored.unit != expected_unit {
            bail!(
                "series for variable '{variable}' on key '{key}' is stored in {} but {expected_unit} was requested",
                stored.unit
            );
        }
        Ok(stored.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[fixture]
    fn provider() -> InMemoryProvider {
        let mut provider = InMemoryProvider::new();
        provider.insert(
            INFILTRATION_GAIN,
            "GroundFloorZone",
            SeriesUnit::Joules,
            vec![1.0, 2.0, 3.0],
        );
        provider
    }

    #[rstest]
    fn stored_series_should_round_trip(provider: InMemoryProvider) {
        let fetched = provider
            .fetch(
                INFILTRATION_GAIN,
                "GroundFloorZone",
                ReportingFrequency::Timestep,
                3,
                SeriesUnit::Joules,
            )
            .unwrap();
        assert_eq!(fetched, vec![1.0, 2.0, 3.0]);
        assert!(provider.is_reported(INFILTRATION_GAIN, "GroundFloorZone"));
    }

    #[rstest]
    fn missing_series_should_be_a_fetch_error(provider: InMemoryProvider) {
        assert!(!provider.is_reported(INFILTRATION_GAIN, "Attic"));
        let result = provider.fetch(
            INFILTRATION_GAIN,
            "Attic",
            ReportingFrequency::Timestep,
            3,
            SeriesUnit::Joules,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn unit_mismatch_should_be_a_fetch_error(provider: InMemoryProvider) {
        let result = provider.fetch(
            INFILTRATION_GAIN,
            "GroundFloorZone",
            ReportingFrequency::Timestep,
            3,
            SeriesUnit::Watts,
        );
        assert!(result.unwrap_err().to_string().contains("stored in J"));
    }

    #[rstest]
    fn frequency_mismatch_should_be_a_fetch_error(provider: InMemoryProvider) {
        let result = provider.fetch(
            INFILTRATION_GAIN,
            "GroundFloorZone",
            ReportingFrequency::RunPeriod,
            1,
            SeriesUnit::Joules,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn gain_variable_names_should_follow_the_reporting_convention() {
        assert_eq!(
            InternalGainCategory::People.variable_name(GainComponent::Convective),
            "Zone People Convective Heating Energy"
        );
        assert_eq!(
            InternalGainCategory::ElectricEquipment.variable_name(GainComponent::Radiant),
            "Zone Electric Equipment Radiant Heating Energy"
        );
        assert_eq!(
            InternalGainCategory::HotWaterEquipment.variable_name(GainComponent::Convective),
            "Zone Hot Water Equipment Convective Heating Energy"
        );
    }

    #[rstest]
    fn gain_taxonomy_should_cover_six_categories_and_two_components() {
        assert_eq!(InternalGainCategory::iter().count(), 6);
        assert_eq!(GainComponent::iter().count(), 2);
    }
}
