use crate::input::{BoundaryCondition, SubSurfaceKind, SurfaceShape, ZoneInput};
use indexmap::IndexMap;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Closed taxonomy of heat-transfer surfaces. Every enclosure element of a
/// zone maps onto exactly one of these, and each tag owns one surface
/// convection channel named after its `Display` form.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
pub enum SurfaceType {
    #[strum(serialize = "Exterior Wall")]
    ExteriorWall,
    #[strum(serialize = "Exterior Foundation Wall")]
    ExteriorFoundationWall,
    #[strum(serialize = "Exterior Roof")]
    ExteriorRoof,
    #[strum(serialize = "Exterior Floor")]
    ExteriorFloor,
    #[strum(serialize = "Exterior Ground")]
    ExteriorGround,
    #[strum(serialize = "Exterior Window")]
    ExteriorWindow,
    #[strum(serialize = "Exterior Door")]
    ExteriorDoor,
    #[strum(serialize = "Interior Wall")]
    InteriorWall,
    #[strum(serialize = "Interior Floor")]
    InteriorFloor,
    #[strum(serialize = "Interior Ceiling")]
    InteriorCeiling,
    #[strum(serialize = "Internal Surface")]
    InternalSurface,
    #[strum(serialize = "Internal Mass")]
    InternalMass,
}

impl SurfaceType {
    /// Whether convection through this surface ultimately exchanges heat with
    /// the outside (ambient air or ground) rather than with other indoor
    /// surfaces or zones.
    pub fn is_exterior(&self) -> bool {
        matches!(
            self,
            SurfaceType::ExteriorWall
                | SurfaceType::ExteriorFoundationWall
                | SurfaceType::ExteriorRoof
                | SurfaceType::ExteriorFloor
                | SurfaceType::ExteriorGround
                | SurfaceType::ExteriorWindow
                | SurfaceType::ExteriorDoor
        )
    }
}

/// Map a surface's outside boundary condition and shape onto its type tag.
/// Combinations with no specific tag (adiabatic surfaces, ground-contact
/// ceilings) fall back to Internal Surface.
pub fn classify_surface(boundary: BoundaryCondition, shape: SurfaceShape) -> SurfaceType {
    match (boundary, shape) {
        (BoundaryCondition::Outdoors, SurfaceShape::Wall) => SurfaceType::ExteriorWall,
        (BoundaryCondition::Outdoors, SurfaceShape::RoofCeiling) => SurfaceType::ExteriorRoof,
        (BoundaryCondition::Outdoors, SurfaceShape::Floor) => SurfaceType::ExteriorFloor,
        (BoundaryCondition::Ground | BoundaryCondition::Foundation, SurfaceShape::Wall) => {
            SurfaceType::ExteriorFoundationWall
        }
        (BoundaryCondition::Ground | BoundaryCondition::Foundation, SurfaceShape::Floor) => {
            SurfaceType::ExteriorGround
        }
        (BoundaryCondition::AdjacentZone, SurfaceShape::Wall) => SurfaceType::InteriorWall,
        (BoundaryCondition::AdjacentZone, SurfaceShape::Floor) => SurfaceType::InteriorFloor,
        (BoundaryCondition::AdjacentZone, SurfaceShape::RoofCeiling) => SurfaceType::InteriorCeiling,
        _ => SurfaceType::InternalSurface,
    }
}

pub fn classify_subsurface(kind: SubSurfaceKind) -> SurfaceType {
    match kind {
        SubSurfaceKind::Window => SurfaceType::ExteriorWindow,
        SubSurfaceKind::Door | SubSurfaceKind::GlassDoor => SurfaceType::ExteriorDoor,
    }
}

/// One enclosure element after classification, ready for its convection
/// series to be fetched under `name`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedElement {
    pub name: String,
    pub surface_type: SurfaceType,
    /// Area in m², already scaled by the zone occupancy multiplier.
    pub area: f64,
    pub has_shading_control: bool,
}

/// A surface and its counterpart on the far side of a zone boundary.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InterzonePair {
    pub surface: String,
    pub adjacent_surface: String,
}

/// Per-type area totals for one zone, in m² scaled by the occupancy
/// multiplier. Keys enumerate in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceAreas(IndexMap<SurfaceType, f64>);

impl SurfaceAreas {
    pub fn accumulate(&mut self, surface_type: SurfaceType, area: f64) {
        *self.0.entry(surface_type).or_insert(0.) += area;
    }

    pub fn area_of(&self, surface_type: SurfaceType) -> f64 {
        self.0.get(&surface_type).copied().unwrap_or(0.)
    }

    pub fn combined(&self, surface_types: &[SurfaceType]) -> f64 {
        surface_types.iter().map(|t| self.area_of(*t)).sum()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn exterior_total(&self) -> f64 {
        self.0
            .iter()
            .filter(|(t, _)| t.is_exterior())
            .map(|(_, area)| area)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SurfaceType, &f64)> {
        self.0.iter()
    }
}

/// Everything the assembler needs to know about a zone's enclosure: the
/// classified elements, the per-type area totals and the interzone adjacency
/// pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneSurfaces {
    pub elements: Vec<ClassifiedElement>,
    pub areas: SurfaceAreas,
    pub interzone_pairs: Vec<InterzonePair>,
}

/// Classify every surface, subsurface and internal-mass object of a zone.
pub fn classify_zone(zone: &ZoneInput) -> ZoneSurfaces {
    let mut surfaces = ZoneSurfaces::default();

    for space in &zone.spaces {
        for surface in &space.surfaces {
            let surface_type = classify_surface(surface.boundary, surface.shape);
            push_element(
                &mut surfaces,
                surface.name.clone(),
                surface_type,
                surface.net_area * zone.multiplier,
                false,
            );
            if surface.boundary == BoundaryCondition::AdjacentZone {
                if let Some(adjacent) = &surface.adjacent_surface {
                    surfaces.interzone_pairs.push(InterzonePair {
                        surface: surface.name.clone(),
                        adjacent_surface: adjacent.clone(),
                    });
                }
            }
            for subsurface in &surface.subsurfaces {
                push_element(
                    &mut surfaces,
                    subsurface.name.clone(),
                    classify_subsurface(subsurface.kind),
                    subsurface.net_area * zone.multiplier,
                    subsurface.has_shading_control,
                );
            }
        }
        for mass in &space.internal_mass {
            push_element(
                &mut surfaces,
                mass.name.clone(),
                SurfaceType::InternalMass,
                mass.area.resolve(space.floor_area) * zone.multiplier,
                false,
            );
        }
    }

    surfaces
}

fn push_element(
    surfaces: &mut ZoneSurfaces,
    name: String,
    surface_type: SurfaceType,
    area: f64,
    has_shading_control: bool,
) {
    surfaces.areas.accumulate(surface_type, area);
    surfaces.elements.push(ClassifiedElement {
        name,
        surface_type,
        area,
        has_shading_control,
    });
}
