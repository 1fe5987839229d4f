use crate::core::heat_balance::channels::{self, ChannelSet};
use crate::core::heat_balance::surface::{SurfaceAreas, SurfaceType};
use crate::core::series::{elementwise_difference, scaled, series_total};
use crate::diagnostics::Diagnostics;
use crate::errors::{DecompositionError, InternalConsistencyError};
use strum::IntoEnumIterator;

const ZERO_SUM_TOLERANCE: f64 = 1e-6;

// Targets of the delayed-solar subtraction: surfaces sunlight actually lands
// on after passing through glazing.
const FLOOR_TYPES: [SurfaceType; 3] = [
    SurfaceType::ExteriorGround,
    SurfaceType::ExteriorFloor,
    SurfaceType::InteriorFloor,
];

// Channels with no meaningful outside face, collapsed onto the exterior
// channels in the redistribution step.
const INTERIOR_TYPES: [SurfaceType; 5] = [
    SurfaceType::InteriorWall,
    SurfaceType::InteriorFloor,
    SurfaceType::InteriorCeiling,
    SurfaceType::InternalMass,
    SurfaceType::InternalSurface,
];

/// Reassign surface convection that is explained by delayed solar, delayed
/// internal gains and delayed window infrared, then collapse interior and
/// internal convection onto the exterior envelope.
///
/// Three steps, consuming the final area table:
/// A. remove delayed solar from the ground/floor channels by floor-area
///    share;
/// B. remove delayed internal gains (all types) and delayed window infrared
///    (all types except windows and doors, where the infrared originates)
///    by total-area share;
/// C. move each interior/internal channel onto the exterior channels by
///    exterior-area share, driving the interior channel to a zero sum.
///
/// What remains of the zone-wide total is exposed as the attributable
/// exterior surface convection channel. A step whose area denominator is
/// zero is skipped in full, on both the per-channel and the zone-wide side,
/// with a warning.
pub(crate) fn attribute_surface_convection(
    mut assembled: ChannelSet,
    areas: &SurfaceAreas,
    diagnostics: &mut Diagnostics,
) -> Result<ChannelSet, DecompositionError> {
    let mut attributable = assembled
        .expect_channel(channels::SURFACE_CONVECTION_TOTAL)
        .to_vec();
    let delayed_solar = assembled
        .expect_channel(channels::WINDOW_TRANSMITTED_SOLAR_DELAYED)
        .to_vec();
    let delayed_internal = assembled
        .expect_channel(channels::INTERNAL_GAINS_DELAYED)
        .to_vec();
    let delayed_infrared = assembled
        .expect_channel(channels::WINDOW_NET_INFRARED_DELAYED)
        .to_vec();

    let floor_area = areas.combined(&FLOOR_TYPES);
    if floor_area == 0. {
        diagnostics.warning(
            "Zone has no ground or floor surface area; delayed solar stays in the floor channels",
        );
    } else {
        for surface_type in FLOOR_TYPES {
            let fraction = areas.area_of(surface_type) / floor_area;
            subtract_share(&mut assembled, surface_type, &delayed_solar, fraction);
        }
        attributable = elementwise_difference(&attributable, &delayed_solar);
    }

    let total_area = areas.total();
    if total_area == 0. {
        diagnostics
            .warning("Zone has no surface area; delayed gains stay in the surface channels");
    } else {
        for surface_type in SurfaceType::iter() {
            let fraction = areas.area_of(surface_type) / total_area;
            subtract_share(&mut assembled, surface_type, &delayed_internal, fraction);
            // infrared already originates at the glazing
            if !matches!(
                surface_type,
                SurfaceType::ExteriorWindow | SurfaceType::ExteriorDoor
            ) {
                subtract_share(&mut assembled, surface_type, &delayed_infrared, fraction);
            }
        }
        attributable = elementwise_difference(&attributable, &delayed_internal);
        attributable = elementwise_difference(&attributable, &delayed_infrared);
    }

    let exterior_area = areas.exterior_total();
    if exterior_area == 0. {
        diagnostics
            .warning("Zone has no exterior surface area; interior convection was left in place");
    } else {
        for interior in INTERIOR_TYPES {
            let name = channels::surface_convection_channel(interior);
            let correction = assembled.expect_channel(&name).to_vec();
            assembled.insert(&name, elementwise_difference(&correction, &correction));
            for exterior in SurfaceType::iter().filter(SurfaceType::is_exterior) {
                let fraction = areas.area_of(exterior) / exterior_area;
                assembled.accumulate(
                    channels::surface_convection_channel(exterior),
                    &scaled(&correction, fraction),
                );
            }
            let residual = series_total(assembled.expect_channel(&name));
            if !is_close!(residual, 0., abs_tol = ZERO_SUM_TOLERANCE) {
                return Err(InternalConsistencyError {
                    channel: name,
                    residual,
                }
                .into());
            }
        }
    }

    assembled.insert(channels::ATTRIBUTABLE_EXTERIOR_CONVECTION, attributable);
    Ok(assembled)
}

fn subtract_share(
    assembled: &mut ChannelSet,
    surface_type: SurfaceType,
    series: &[f64],
    fraction: f64,
) {
    let name = channels::surface_convection_channel(surface_type);
    let updated = elementwise_difference(assembled.expect_channel(&name), &scaled(series, fraction));
    assembled.insert(name, updated);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const NUM_TS: usize = 4;

    fn base_channels() -> ChannelSet {
        let mut set = ChannelSet::new(NUM_TS);
        for surface_type in SurfaceType::iter() {
            set.ensure(channels::surface_convection_channel(surface_type));
        }
        set.insert(channels::SURFACE_CONVECTION_TOTAL, vec![0.; NUM_TS]);
        set.insert(channels::WINDOW_TRANSMITTED_SOLAR_DELAYED, vec![0.; NUM_TS]);
        set.insert(channels::INTERNAL_GAINS_DELAYED, vec![0.; NUM_TS]);
        set.insert(channels::WINDOW_NET_INFRARED_DELAYED, vec![0.; NUM_TS]);
        set
    }

    fn areas_of(entries: &[(SurfaceType, f64)]) -> SurfaceAreas {
        let mut areas = SurfaceAreas::default();
        for (surface_type, area) in entries {
            areas.accumulate(*surface_type, *area);
        }
        areas
    }

    #[rstest]
    fn delayed_solar_should_move_out_of_the_floor_channels_by_area_share() {
        let mut set = base_channels();
        set.insert(channels::WINDOW_TRANSMITTED_SOLAR_DELAYED, vec![10.; NUM_TS]);
        set.insert(channels::SURFACE_CONVECTION_TOTAL, vec![100.; NUM_TS]);
        let areas = areas_of(&[
            (SurfaceType::ExteriorGround, 30.),
            (SurfaceType::ExteriorFloor, 10.),
            (SurfaceType::InteriorFloor, 10.),
            (SurfaceType::ExteriorWall, 50.),
        ]);
        let mut diagnostics = Diagnostics::for_zone("Lounge");

        let result = attribute_surface_convection(set, &areas, &mut diagnostics).unwrap();

        // step A pulls out the floor-area shares (0.6 / 0.2 / 0.2 of 10);
        // step C then collapses the interior floor's -2 onto the 90 m² of
        // exterior area
        assert_relative_eq!(
            result.get("Surface convection: Exterior Ground").unwrap()[0],
            -6. - 2. * 30. / 90.
        );
        assert_relative_eq!(
            result.get("Surface convection: Exterior Floor").unwrap()[0],
            -2. - 2. * 10. / 90.
        );
        assert_relative_eq!(
            result.get("Surface convection: Exterior Wall").unwrap()[0],
            -2. * 50. / 90.
        );
        assert_relative_eq!(
            result.get("Surface convection: Interior Floor").unwrap()[0],
            0.
        );
        assert_relative_eq!(
            result.get(channels::ATTRIBUTABLE_EXTERIOR_CONVECTION).unwrap()[0],
            90.
        );
    }

    #[rstest]
    fn windows_and_doors_should_not_receive_an_infrared_share() {
        let mut set = base_channels();
        set.insert(channels::INTERNAL_GAINS_DELAYED, vec![8.; NUM_TS]);
        set.insert(channels::WINDOW_NET_INFRARED_DELAYED, vec![4.; NUM_TS]);
        let areas = areas_of(&[
            (SurfaceType::ExteriorWall, 60.),
            (SurfaceType::ExteriorWindow, 20.),
            (SurfaceType::ExteriorDoor, 20.),
        ]);
        let mut diagnostics = Diagnostics::for_zone("Lounge");

        let result = attribute_surface_convection(set, &areas, &mut diagnostics).unwrap();

        // window share of total area is 0.2: internal gains only
        assert_relative_eq!(
            result.get("Surface convection: Exterior Window").unwrap()[0],
            -8. * 0.2
        );
        // the wall carries both subtractions at its 0.6 share
        assert_relative_eq!(
            result.get("Surface convection: Exterior Wall").unwrap()[0],
            -8. * 0.6 - 4. * 0.6
        );
        assert_relative_eq!(
            result.get(channels::ATTRIBUTABLE_EXTERIOR_CONVECTION).unwrap()[0],
            -12.
        );
    }

    #[rstest]
    fn interior_channels_should_collapse_onto_the_exterior_with_zero_sum() {
        let mut set = base_channels();
        set.insert(
            channels::surface_convection_channel(SurfaceType::InteriorWall),
            vec![6., -2., 4., 0.],
        );
        let areas = areas_of(&[
            (SurfaceType::ExteriorWall, 100.),
            (SurfaceType::ExteriorWindow, 25.),
            (SurfaceType::InteriorWall, 50.),
        ]);
        let mut diagnostics = Diagnostics::for_zone("Lounge");

        let result = attribute_surface_convection(set, &areas, &mut diagnostics).unwrap();

        let interior = result
            .get("Surface convection: Interior Wall")
            .unwrap();
        assert_relative_eq!(series_total(interior), 0., epsilon = 1e-6);
        assert_relative_eq!(
            result.get("Surface convection: Exterior Wall").unwrap()[0],
            6. * 0.8
        );
        assert_relative_eq!(
            result.get("Surface convection: Exterior Window").unwrap()[0],
            6. * 0.2
        );
        assert_relative_eq!(
            result.get("Surface convection: Exterior Window").unwrap()[1],
            -2. * 0.2
        );
    }

    #[rstest]
    fn exterior_shares_should_partition_to_one() {
        let areas = areas_of(&[
            (SurfaceType::ExteriorWall, 17.3),
            (SurfaceType::ExteriorRoof, 29.1),
            (SurfaceType::ExteriorWindow, 4.6),
            (SurfaceType::ExteriorGround, 23.8),
            (SurfaceType::InteriorWall, 55.5),
        ]);

        let exterior_area = areas.exterior_total();
        let fraction_sum: f64 = SurfaceType::iter()
            .filter(SurfaceType::is_exterior)
            .map(|t| areas.area_of(t) / exterior_area)
            .sum();

        assert_relative_eq!(fraction_sum, 1., epsilon = 1e-9);
    }

    #[rstest]
    fn degenerate_floor_area_should_skip_step_and_warn() {
        let mut set = base_channels();
        set.insert(channels::WINDOW_TRANSMITTED_SOLAR_DELAYED, vec![10.; NUM_TS]);
        set.insert(channels::SURFACE_CONVECTION_TOTAL, vec![100.; NUM_TS]);
        let areas = areas_of(&[(SurfaceType::ExteriorWall, 40.)]);
        let mut diagnostics = Diagnostics::for_zone("Lounge");

        let result = attribute_surface_convection(set, &areas, &mut diagnostics).unwrap();

        // neither the channels nor the attributable total saw the solar
        assert_relative_eq!(
            result.get("Surface convection: Exterior Ground").unwrap()[0],
            0.
        );
        assert_relative_eq!(
            result.get(channels::ATTRIBUTABLE_EXTERIOR_CONVECTION).unwrap()[0],
            100.
        );
        assert_eq!(diagnostics.count_of(crate::diagnostics::Severity::Warning), 1);
    }

    #[rstest]
    fn missing_exterior_area_should_leave_interior_channels_in_place() {
        let mut set = base_channels();
        set.insert(
            channels::surface_convection_channel(SurfaceType::InteriorWall),
            vec![5.; NUM_TS],
        );
        let areas = areas_of(&[(SurfaceType::InteriorWall, 30.)]);
        let mut diagnostics = Diagnostics::for_zone("Lounge");

        let result = attribute_surface_convection(set, &areas, &mut diagnostics).unwrap();

        assert_eq!(
            result.get("Surface convection: Interior Wall").unwrap(),
            [5.; NUM_TS].as_slice()
        );
        assert!(diagnostics
            .entries()
            .iter()
            .any(|d| d.message.contains("no exterior surface area")));
    }
}
