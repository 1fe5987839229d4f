pub mod core;
mod diagnostics;
mod errors;
pub mod input;
pub mod output;
pub mod provider;
mod simulation_time;

#[macro_use]
extern crate is_close;

pub use crate::core::heat_balance::channels::ChannelSet;
pub use crate::core::heat_balance::surface::{InterzonePair, SurfaceAreas, SurfaceType};
pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
pub use crate::errors::{DecompositionError, InternalConsistencyError, PreconditionError};
pub use crate::simulation_time::AnnualTimeSteps;

use crate::core::heat_balance::assembler::{assemble_zone, ZoneSeriesFetcher};
use crate::core::heat_balance::attribution::attribute_surface_convection;
use crate::core::heat_balance::surface::classify_zone;
use crate::core::heat_balance::validation::{validate_energy_balance, validate_subtotals};
use crate::input::{BuildingTopology, ZoneInput};
use crate::provider::TimeSeriesProvider;
use rayon::prelude::*;

/// The decomposed heat balance for one zone: the full channel map in
/// gain-positive Joules per timestep, together with the surface
/// classification and the diagnostics raised along the way.
#[derive(Debug)]
pub struct ZoneDecomposition {
    pub zone: String,
    pub channels: ChannelSet,
    pub areas: SurfaceAreas,
    pub interzone_pairs: Vec<InterzonePair>,
    pub diagnostics: Diagnostics,
}

/// Decompose the heat balance of a single zone.
///
/// Runs the full pipeline: classify the zone's surfaces, assemble the
/// gain-positive channel map from the provider's series, validate the
/// assembled subtotals against the simulator's own balance terms, attribute
/// delayed gains and interior convection onto the exterior surface channels,
/// and close the zone energy balance against the system-plus-storage ground
/// truth.
///
/// Recoverable data-quality findings land in the returned
/// [`Diagnostics`]; only missing or malformed series and broken internal
/// invariants surface as errors.
pub fn decompose_zone(
    provider: &impl TimeSeriesProvider,
    zone: &ZoneInput,
    time_steps: AnnualTimeSteps,
) -> Result<ZoneDecomposition, DecompositionError> {
    let mut diagnostics = Diagnostics::for_zone(&zone.name);
    let surfaces = classify_zone(zone);

    let fetcher = ZoneSeriesFetcher::new(provider, time_steps);
    let assembled = assemble_zone(&fetcher, zone, &surfaces, &mut diagnostics)?;
    validate_subtotals(&assembled, &mut diagnostics);
    let attributed = attribute_surface_convection(assembled, &surfaces.areas, &mut diagnostics)?;
    let channels = validate_energy_balance(attributed, &mut diagnostics);

    Ok(ZoneDecomposition {
        zone: zone.name.clone(),
        channels,
        areas: surfaces.areas,
        interzone_pairs: surfaces.interzone_pairs,
        diagnostics,
    })
}

/// Decompose every zone of a building, in parallel. Results keep the
/// topology's zone order; the first zone to fail aborts the run.
pub fn decompose_building(
    provider: &(impl TimeSeriesProvider + Sync),
    topology: &BuildingTopology,
    time_steps: AnnualTimeSteps,
) -> Result<Vec<ZoneDecomposition>, DecompositionError> {
    topology
        .zones
        .par_iter()
        .map(|zone| decompose_zone(provider, zone, time_steps))
        .collect()
}
