use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

/// Read a building topology from a JSON document.
pub fn ingest_topology(json: impl Read) -> anyhow::Result<BuildingTopology> {
    serde_json::from_reader(BufReader::new(json))
        .context("building topology JSON could not be parsed")
}

/// Static description of the simulated building: which zones exist and which
/// surfaces enclose them. This is the geometry side of the decomposition; the
/// simulated time series come from a [`crate::provider::TimeSeriesProvider`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BuildingTopology {
    pub zones: Vec<ZoneInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneInput {
    pub name: String,
    /// Occupancy multiplier: the zone stands for this many identical copies
    /// of itself, and reported energies are scaled accordingly.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    pub spaces: Vec<SpaceInput>,
}

fn default_multiplier() -> f64 {
    1.
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SpaceInput {
    pub name: String,
    pub floor_area: f64,
    #[serde(default)]
    pub surfaces: Vec<SurfaceInput>,
    #[serde(default)]
    pub internal_mass: Vec<InternalMassInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SurfaceInput {
    pub name: String,
    pub boundary: BoundaryCondition,
    pub shape: SurfaceShape,
    /// Opaque area in m² with subsurface areas already removed.
    pub net_area: f64,
    /// Name of the matching surface on the far side of an interzone
    /// boundary, where one exists.
    #[serde(default)]
    pub adjacent_surface: Option<String>,
    #[serde(default)]
    pub subsurfaces: Vec<SubSurfaceInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SubSurfaceInput {
    pub name: String,
    pub kind: SubSurfaceKind,
    pub net_area: f64,
    /// Whether the fenestration carries an operable shade or blind; shaded
    /// windows report gap convection and shade-layer infrared exchange.
    #[serde(default)]
    pub has_shading_control: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InternalMassInput {
    pub name: String,
    pub area: InternalMassAreaSpec,
}

/// How an internal-mass object declares its exposed surface area.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum InternalMassAreaSpec {
    /// Exposed area in m².
    Absolute(f64),
    /// Exposed area as a ratio of the containing space's floor area.
    PerFloorArea(f64),
}

impl InternalMassAreaSpec {
    pub fn resolve(&self, floor_area: f64) -> f64 {
        match self {
            InternalMassAreaSpec::Absolute(area) => *area,
            InternalMassAreaSpec::PerFloorArea(ratio) => ratio * floor_area,
        }
    }
}

/// What a surface's outside face touches.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BoundaryCondition {
    Outdoors,
    Ground,
    Foundation,
    AdjacentZone,
    Adiabatic,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SurfaceShape {
    Wall,
    Floor,
    RoofCeiling,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SubSurfaceKind {
    Window,
    Door,
    GlassDoor,
}
