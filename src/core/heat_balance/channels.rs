use crate::core::heat_balance::surface::SurfaceType;
use crate::provider::{GainComponent, InternalGainCategory};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

// Fixed channel names. Surface convection and internal gain channels are
// derived from their taxonomies by the helpers below.
pub const WINDOW_TRANSMITTED_SOLAR: &str = "Window transmitted solar";
pub const WINDOW_TRANSMITTED_SOLAR_DELAYED: &str = "Window transmitted solar delayed";
pub const WINDOW_NET_INFRARED: &str = "Window net infrared";
pub const WINDOW_NET_INFRARED_DELAYED: &str = "Window net infrared delayed";
pub const SHADING_GAP_CONVECTION: &str = "Shading gap convection";
pub const SURFACE_CONVECTION_TOTAL: &str = "Surface convection total";
pub const ATTRIBUTABLE_EXTERIOR_CONVECTION: &str = "Attributable exterior surface convection";
pub const INTERNAL_GAINS_RADIANT: &str = "Internal gains radiant";
pub const INTERNAL_GAINS_INSTANT: &str = "Internal gains instant";
pub const INTERNAL_GAINS_DELAYED: &str = "Internal gains delayed";
pub const REFRIGERATION: &str = "Refrigeration";
pub const INFILTRATION_GAIN: &str = "Infiltration gain";
pub const INFILTRATION_LOSS: &str = "Infiltration loss";
pub const INFILTRATION: &str = "Infiltration";
pub const VENTILATION_GAIN: &str = "Ventilation gain";
pub const VENTILATION_LOSS: &str = "Ventilation loss";
pub const VENTILATION: &str = "Ventilation";
pub const OUTDOOR_AIR_TRANSFER: &str = "Outdoor air transfer";
pub const INTERZONE_MIXING_GAIN: &str = "Interzone mixing gain";
pub const INTERZONE_MIXING_LOSS: &str = "Interzone mixing loss";
pub const INTERZONE_MIXING: &str = "Interzone mixing";
pub const EXHAUST_AIR_TRANSFER: &str = "Exhaust air transfer";
pub const EXFILTRATION_TRANSFER: &str = "Exfiltration transfer";
pub const INTERZONE_AIR_TOTAL: &str = "Interzone air total";
pub const SURFACE_CONVECTION_BALANCE: &str = "Surface convection (balance)";
pub const INTERNAL_CONVECTIVE_GAIN_BALANCE: &str = "Internal convective gain (balance)";
pub const OUTDOOR_AIR_TRANSFER_BALANCE: &str = "Outdoor air transfer (balance)";
pub const INTERZONE_AIR_TRANSFER_BALANCE: &str = "Interzone air transfer (balance)";
pub const SYSTEM_AIR_TRANSFER: &str = "System air transfer";
pub const SYSTEM_CONVECTIVE_GAIN: &str = "System convective gain";
pub const AIR_ENERGY_STORAGE: &str = "Air energy storage";
pub const TOTAL_ZONE_HEAT_TRANSFER: &str = "Total zone heat transfer";
pub const TRUE_TOTAL_ENERGY_BALANCE: &str = "True total energy balance";
pub const ENERGY_BALANCE_TIMESTEP_ERROR: &str = "Energy balance timestep error";

pub fn surface_convection_channel(surface_type: SurfaceType) -> String {
    format!("Surface convection: {surface_type}")
}

pub fn internal_gain_channel(category: InternalGainCategory, component: GainComponent) -> String {
    format!(
        "Internal gains: {} {}",
        category.to_string().to_lowercase(),
        component.to_string().to_lowercase()
    )
}

/// Named component load channels for one zone, all sharing the run's timestep
/// count. Channels enumerate in insertion order, which is the order the
/// assembly pipeline produces them in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChannelSet {
    num_timesteps: usize,
    channels: IndexMap<String, Vec<f64>>,
}

impl ChannelSet {
    pub fn new(num_timesteps: usize) -> Self {
        Self {
            num_timesteps,
            channels: Default::default(),
        }
    }

    pub fn num_timesteps(&self) -> usize {
        self.num_timesteps
    }

    /// Insert a channel, replacing any existing series under the same name.
    ///
    /// Panics if the series length differs from the set's timestep count;
    /// every series reaching a channel set has already been validated against
    /// the run length, so a mismatch is a bug in the assembly pipeline.
    pub fn insert(&mut self, name: impl Into<String>, series: Vec<f64>) {
        let name = name.into();
        assert_eq!(
            series.len(),
            self.num_timesteps,
            "series for channel '{name}' does not match the run's timestep count"
        );
        self.channels.insert(name, series);
    }

    /// Add a series elementwise into a channel, creating it if absent.
    pub fn accumulate(&mut self, name: impl Into<String>, series: &[f64]) {
        let name = name.into();
        assert_eq!(
            series.len(),
            self.num_timesteps,
            "series for channel '{name}' does not match the run's timestep count"
        );
        match self.channels.get_mut(&name) {
            Some(existing) => {
                for (accumulated, value) in existing.iter_mut().zip_eq(series) {
                    *accumulated += value;
                }
            }
            None => {
                self.channels.insert(name, series.to_vec());
            }
        }
    }

    /// Create a channel holding zeroes unless it already exists.
    pub fn ensure(&mut self, name: impl Into<String>) {
        self.channels
            .entry(name.into())
            .or_insert_with(|| vec![0.; self.num_timesteps]);
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    /// Fetch a channel an earlier pipeline stage is guaranteed to have
    /// produced. Panics if the channel is absent, which would mean the
    /// assembly stages ran out of order.
    pub(crate) fn expect_channel(&self, name: &str) -> &[f64] {
        match self.get(name) {
            Some(series) => series,
            None => panic!("channel '{name}' has not been assembled yet"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.channels
            .iter()
            .map(|(name, series)| (name.as_str(), series.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Move every channel of `fragment` into this set. Later fragments win on
    /// name collisions.
    pub fn merge(&mut self, fragment: ChannelSet) {
        assert_eq!(
            fragment.num_timesteps, self.num_timesteps,
            "cannot merge channel sets with different timestep counts"
        );
        self.channels.extend(fragment.channels);
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<f64>> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn channels_should_keep_insertion_order() {
        let mut set = ChannelSet::new(2);
        set.insert(REFRIGERATION, vec![1., 2.]);
        set.insert(INFILTRATION, vec![3., 4.]);
        set.insert(VENTILATION, vec![5., 6.]);
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec![REFRIGERATION, INFILTRATION, VENTILATION]
        );
    }

    #[rstest]
    #[should_panic(expected = "does not match the run's timestep count")]
    fn wrong_length_series_should_be_rejected() {
        let mut set = ChannelSet::new(4);
        set.insert(REFRIGERATION, vec![1., 2.]);
    }

    #[rstest]
    fn accumulate_should_add_elementwise() {
        let mut set = ChannelSet::new(3);
        set.accumulate("Surface convection: Exterior Wall", &[1., 2., 3.]);
        set.accumulate("Surface convection: Exterior Wall", &[10., 20., 30.]);
        assert_eq!(
            set.get("Surface convection: Exterior Wall"),
            Some([11., 22., 33.].as_slice())
        );
    }

    #[rstest]
    fn ensure_should_not_overwrite_existing_data() {
        let mut set = ChannelSet::new(2);
        set.insert(REFRIGERATION, vec![7., 8.]);
        set.ensure(REFRIGERATION);
        set.ensure(INFILTRATION);
        assert_eq!(set.get(REFRIGERATION), Some([7., 8.].as_slice()));
        assert_eq!(set.get(INFILTRATION), Some([0., 0.].as_slice()));
    }

    #[rstest]
    fn merge_should_append_fragments_in_order() {
        let mut set = ChannelSet::new(1);
        set.insert(REFRIGERATION, vec![1.]);
        let mut fragment = ChannelSet::new(1);
        fragment.insert(INFILTRATION, vec![2.]);
        set.merge(fragment);
        assert_eq!(set.names().collect::<Vec<_>>(), vec![REFRIGERATION, INFILTRATION]);
    }

    #[rstest]
    fn derived_channel_names_should_follow_the_conventions() {
        use crate::core::heat_balance::surface::SurfaceType;
        use crate::provider::{GainComponent, InternalGainCategory};
        assert_eq!(
            surface_convection_channel(SurfaceType::InteriorCeiling),
            "Surface convection: Interior Ceiling"
        );
        assert_eq!(
            internal_gain_channel(InternalGainCategory::GasEquipment, GainComponent::Radiant),
            "Internal gains: gas equipment radiant"
        );
    }
}
