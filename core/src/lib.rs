#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridtown engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values summarizing the
//! generated layout. Systems and adapters consume the emitted
//! [`CellPlacement`] snapshots and never mutate world state directly.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

/// Default number of grid columns laid out along the x axis.
pub const DEFAULT_GRID_WIDTH: u32 = 10;

/// Default number of grid rows laid out along the z axis.
pub const DEFAULT_GRID_LENGTH: u32 = 10;

/// Default per-axis spacing converting grid indices into world units.
pub const DEFAULT_SPACING: f32 = 1.0;

/// Default seed feeding the world's height-sampling stream.
pub const DEFAULT_HEIGHT_SEED: u64 = 0x7c11_9a5e_42d0_8b31;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a new city configuration and generates the city from scratch.
    ConfigureCity {
        /// Configuration describing the grid, spacing and visual variants.
        config: CityConfig,
    },
    /// Discards every placement and recomputes the layout from the current
    /// configuration, drawing fresh height randomness.
    RegenerateCity,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a full layout was generated.
    CityGenerated {
        /// Monotonic identifier of the generation that produced the layout.
        generation: GenerationId,
        /// Dimensions of the generated grid.
        grid: GridDimensions,
        /// Number of cells classified as buildings.
        buildings: u32,
        /// Number of cells classified as plain road segments.
        roads: u32,
        /// Number of cells classified as four-way intersections.
        four_ways: u32,
        /// Number of cells classified as outer intersections.
        outer_intersections: u32,
    },
    /// Reports that a configuration command was rejected.
    ConfigurationRejected {
        /// Specific reason the configuration failed validation.
        reason: ConfigurationError,
    },
}

/// Location of a single grid cell expressed as signed x and z indices.
///
/// Coordinates are signed so neighbour probes outside the grid keep the same
/// remainder arithmetic as in-bounds cells; bounds checks live in
/// [`GridDimensions::contains`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: i32,
    z: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Index of the cell along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Index of the cell along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the cell displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }
}

/// Dimensions of the city grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    width: u32,
    length: u32,
}

impl GridDimensions {
    /// Creates a new grid dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, length: u32) -> Self {
        Self { width, length }
    }

    /// Number of cells along the x axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the z axis.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.length as u64
    }

    /// Reports whether the provided cell lies within the grid domain.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= 0
            && cell.z() >= 0
            && (cell.x() as u32) < self.width
            && (cell.z() as u32) < self.length
    }
}

/// Classification assigned to a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Plain road segment.
    Road,
    /// Intersection whose four orthogonal neighbours are all road-eligible.
    FourWayIntersection,
    /// Boundary-exact intersection marking the rim of the grid.
    OuterIntersection,
    /// Building lot.
    Building,
}

impl CellKind {
    /// Reports whether the kind is rendered as a flat road tile.
    #[must_use]
    pub const fn is_road_surface(self) -> bool {
        matches!(
            self,
            Self::Road | Self::FourWayIntersection | Self::OuterIntersection
        )
    }
}

/// Plain serializable triple describing a position or scale in world units.
///
/// Adapters convert to their math library's vector type at the seam.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldVec {
    /// Component along the x axis.
    pub x: f32,
    /// Component along the vertical axis.
    pub y: f32,
    /// Component along the z axis.
    pub z: f32,
}

impl WorldVec {
    /// Origin vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new world-space vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Placement decision emitted for a single grid cell.
///
/// The renderer collaborator materializes each placement by choosing a
/// concrete visual asset for the cell's kind and applying the transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellPlacement {
    /// Cell the placement was derived from.
    pub cell: CellCoord,
    /// Classification assigned to the cell.
    pub kind: CellKind,
    /// World-space position of the placed object.
    pub position: WorldVec,
    /// World-space scale of the placed object. For buildings the vertical
    /// component carries the sampled height.
    pub scale: WorldVec,
    /// Rotation about the vertical axis, in degrees.
    pub yaw_degrees: f32,
    /// Indicates whether a road segment was turned a quarter turn because
    /// buildings flank it on the perpendicular axis.
    pub rotated: bool,
}

/// Identifier naming a building visual variant understood by renderers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingVariantId(String);

impl BuildingVariantId {
    /// Creates a new building variant identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the variant as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier naming a road-tile visual variant understood by renderers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadVariantId(String);

impl RoadVariantId {
    /// Creates a new road variant identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the variant as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Monotonic identifier assigned to each generated layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationId(u32);

impl GenerationId {
    /// Creates a new generation identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the identifier of the following generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Configuration describing the city grid and its visual vocabulary.
#[derive(Clone, Debug, PartialEq)]
pub struct CityConfig {
    /// Number of cells along the x axis.
    pub width: u32,
    /// Number of cells along the z axis.
    pub length: u32,
    /// World units between neighbouring cells along the x axis.
    pub spacing_x: f32,
    /// World units between neighbouring cells along the z axis.
    pub spacing_z: f32,
    /// Lower building-height bound carried in the configuration. Values
    /// below [`CityConfig::MIN_HEIGHT_FLOOR`] are clamped during
    /// sanitization instead of rejected.
    pub min_height: f32,
    /// Upper building-height bound carried in the configuration.
    pub max_height: f32,
    /// Building variants renderers may choose from. Must not be empty.
    pub building_variants: Vec<BuildingVariantId>,
    /// Variant used for plain road segments.
    pub road_variant: RoadVariantId,
    /// Variant used for four-way intersections, when renderers distinguish
    /// them from plain roads.
    pub four_way_variant: Option<RoadVariantId>,
    /// Variant used for outer intersections.
    pub outer_variant: Option<RoadVariantId>,
    /// Enables the boundary-exact outer-intersection classification.
    pub outer_intersections: bool,
    /// Seed for the world's height-sampling stream.
    pub height_seed: u64,
}

impl CityConfig {
    /// Smallest permitted `min_height`; lower values are clamped here.
    pub const MIN_HEIGHT_FLOOR: f32 = 0.5;

    /// Dimensions of the configured grid.
    #[must_use]
    pub const fn grid(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.length)
    }

    /// Checks the configuration for errors that would make generation fail.
    ///
    /// A `min_height` below the floor is not an error; it is corrected by
    /// [`CityConfig::sanitized`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.length == 0 {
            return Err(ConfigurationError::EmptyGrid {
                width: self.width,
                length: self.length,
            });
        }

        if self.building_variants.is_empty() {
            return Err(ConfigurationError::NoBuildingVariants);
        }

        if self.spacing_x <= 0.0 {
            return Err(ConfigurationError::InvalidSpacing {
                axis: SpacingAxis::X,
                value: self.spacing_x,
            });
        }

        if self.spacing_z <= 0.0 {
            return Err(ConfigurationError::InvalidSpacing {
                axis: SpacingAxis::Z,
                value: self.spacing_z,
            });
        }

        Ok(())
    }

    /// Returns the configuration with out-of-range height bounds corrected.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.min_height < Self::MIN_HEIGHT_FLOOR {
            self.min_height = Self::MIN_HEIGHT_FLOOR;
        }
        self
    }
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            length: DEFAULT_GRID_LENGTH,
            spacing_x: DEFAULT_SPACING,
            spacing_z: DEFAULT_SPACING,
            min_height: 1.0,
            max_height: 5.0,
            building_variants: vec![
                BuildingVariantId::new("slab"),
                BuildingVariantId::new("tower"),
                BuildingVariantId::new("block"),
            ],
            road_variant: RoadVariantId::new("road"),
            four_way_variant: Some(RoadVariantId::new("four-way")),
            outer_variant: None,
            outer_intersections: false,
            height_seed: DEFAULT_HEIGHT_SEED,
        }
    }
}

/// Axis qualifying a spacing validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpacingAxis {
    /// Spacing along the x axis.
    X,
    /// Spacing along the z axis.
    Z,
}

impl fmt::Display for SpacingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Reasons a city configuration may be rejected before generation begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigurationError {
    /// The configuration carries no building variants to choose from.
    NoBuildingVariants,
    /// One or both grid dimensions are zero.
    EmptyGrid {
        /// Configured cell count along the x axis.
        width: u32,
        /// Configured cell count along the z axis.
        length: u32,
    },
    /// A spacing value is zero or negative.
    InvalidSpacing {
        /// Axis the offending spacing applies to.
        axis: SpacingAxis,
        /// Provided spacing value that failed validation.
        value: f32,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBuildingVariants => write!(f, "no building variants available"),
            Self::EmptyGrid { width, length } => {
                write!(f, "grid has no area ({width}x{length})")
            }
            Self::InvalidSpacing { axis, value } => {
                write!(f, "spacing along {axis} must be positive (received {value})")
            }
        }
    }
}

impl Error for ConfigurationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_offsets_are_signed() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.offset(-1, 0), CellCoord::new(-1, 0));
        assert_eq!(origin.offset(0, 1), CellCoord::new(0, 1));
    }

    #[test]
    fn grid_contains_rejects_negative_and_out_of_range_cells() {
        let grid = GridDimensions::new(4, 3);
        assert!(grid.contains(CellCoord::new(0, 0)));
        assert!(grid.contains(CellCoord::new(3, 2)));
        assert!(!grid.contains(CellCoord::new(-1, 0)));
        assert!(!grid.contains(CellCoord::new(0, -1)));
        assert!(!grid.contains(CellCoord::new(4, 0)));
        assert!(!grid.contains(CellCoord::new(0, 3)));
    }

    #[test]
    fn cell_kind_road_surfaces_exclude_buildings() {
        assert!(CellKind::Road.is_road_surface());
        assert!(CellKind::FourWayIntersection.is_road_surface());
        assert!(CellKind::OuterIntersection.is_road_surface());
        assert!(!CellKind::Building.is_road_surface());
    }

    #[test]
    fn cell_placement_round_trips_through_bincode() {
        let placement = CellPlacement {
            cell: CellCoord::new(3, 6),
            kind: CellKind::Building,
            position: WorldVec::new(2.5, 1.75, 5.5),
            scale: WorldVec::new(1.0, 3.5, 1.0),
            yaw_degrees: 0.0,
            rotated: false,
        };
        assert_round_trip(&placement);
    }

    #[test]
    fn variant_ids_round_trip_through_bincode() {
        assert_round_trip(&BuildingVariantId::new("slab"));
        assert_round_trip(&RoadVariantId::new("road"));
    }

    #[test]
    fn default_config_passes_validation() {
        assert_eq!(CityConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_empty_variant_list() {
        let config = CityConfig {
            building_variants: Vec::new(),
            ..CityConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::NoBuildingVariants)
        );
    }

    #[test]
    fn validation_rejects_zero_area_grids() {
        let config = CityConfig {
            length: 0,
            ..CityConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::EmptyGrid {
                width: DEFAULT_GRID_WIDTH,
                length: 0
            })
        );
    }

    #[test]
    fn validation_rejects_non_positive_spacing() {
        let config = CityConfig {
            spacing_z: 0.0,
            ..CityConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidSpacing {
                axis: SpacingAxis::Z,
                value: 0.0
            })
        );
    }

    #[test]
    fn sanitization_clamps_min_height_to_floor() {
        let config = CityConfig {
            min_height: 0.25,
            ..CityConfig::default()
        }
        .sanitized();
        assert_eq!(config.min_height, CityConfig::MIN_HEIGHT_FLOOR);
    }

    #[test]
    fn sanitization_preserves_min_height_above_floor() {
        let config = CityConfig {
            min_height: 1.5,
            ..CityConfig::default()
        }
        .sanitized();
        assert_eq!(config.min_height, 1.5);
    }

    #[test]
    fn generation_id_advances_monotonically() {
        let first = GenerationId::new(0);
        assert_eq!(first.next(), GenerationId::new(1));
        assert_eq!(first.next().next().get(), 2);
    }
}
