#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative city layout state for Gridtown.
//!
//! The world owns the installed [`CityConfig`] and the placements derived
//! from it. Adapters mutate the world exclusively through [`apply`] and read
//! it back through [`query`]. Generation itself is exposed as the pure
//! [`generate_city`] function so callers with their own random source can
//! produce layouts without constructing a world.

pub mod classifier;

use gridtown_core::{
    CellCoord, CellKind, CellPlacement, CityConfig, Command, Event, GenerationId,
    GridDimensions, WorldVec,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Low band floor for the left half of the grid.
const LOW_RISE_MIN: f32 = 1.0;
/// Shared boundary: low band ceiling and skyscraper band floor.
const LOW_RISE_MAX: f32 = 5.0;
/// Skyscraper band ceiling for the right half of the grid.
const HIGH_RISE_MAX: f32 = 10.0;

/// Represents the authoritative Gridtown world state.
#[derive(Debug)]
pub struct World {
    config: CityConfig,
    placements: Vec<CellPlacement>,
    generation: GenerationId,
    height_rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world with the default configuration and an initial
    /// layout generated from the default height seed.
    #[must_use]
    pub fn new() -> Self {
        let config = CityConfig::default().sanitized();
        let mut height_rng = ChaCha8Rng::seed_from_u64(config.height_seed);
        let placements = generate_city(&config, &mut height_rng);
        Self {
            config,
            placements,
            generation: GenerationId::new(0),
            height_rng,
        }
    }

    fn regenerate(&mut self, out_events: &mut Vec<Event>) {
        self.placements = generate_city(&self.config, &mut self.height_rng);
        self.generation = self.generation.next();
        out_events.push(self.layout_event());
    }

    fn layout_event(&self) -> Event {
        let mut buildings = 0;
        let mut roads = 0;
        let mut four_ways = 0;
        let mut outer_intersections = 0;

        for placement in &self.placements {
            match placement.kind {
                CellKind::Building => buildings += 1,
                CellKind::Road => roads += 1,
                CellKind::FourWayIntersection => four_ways += 1,
                CellKind::OuterIntersection => outer_intersections += 1,
            }
        }

        Event::CityGenerated {
            generation: self.generation,
            grid: self.config.grid(),
            buildings,
            roads,
            four_ways,
            outer_intersections,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureCity { config } => {
            if let Err(reason) = config.validate() {
                out_events.push(Event::ConfigurationRejected { reason });
                return;
            }

            let config = config.sanitized();
            world.height_rng = ChaCha8Rng::seed_from_u64(config.height_seed);
            world.config = config;
            world.regenerate(out_events);
        }
        Command::RegenerateCity => {
            world.regenerate(out_events);
        }
    }
}

/// Generates one placement for every cell of the configured grid.
///
/// The pass runs x-major over the domain and touches no shared state beyond
/// the provided random source, which feeds building-height sampling only.
/// Identical configuration and RNG state therefore reproduce the layout
/// exactly.
pub fn generate_city(config: &CityConfig, rng: &mut impl Rng) -> Vec<CellPlacement> {
    let grid = config.grid();
    let mut placements = Vec::with_capacity(grid.cell_count() as usize);

    for x in 0..grid.width() as i32 {
        for z in 0..grid.length() as i32 {
            let cell = CellCoord::new(x, z);
            let kind = classifier::classify(cell, grid, config.outer_intersections);
            let placement = match kind {
                CellKind::Building => building_placement(cell, config, rng),
                CellKind::Road => road_placement(cell, config, grid),
                CellKind::FourWayIntersection | CellKind::OuterIntersection => {
                    intersection_placement(cell, kind, config)
                }
            };
            placements.push(placement);
        }
    }

    placements
}

/// Samples a building height from the technology-progression bands.
///
/// Cells right of the grid midpoint (integer division) draw from the
/// skyscraper band `[5, 10)`; everything else draws from `[1, 5)`. The
/// configured `min_height`/`max_height` bounds are deliberately not
/// consulted: the shipped generator always drew from these literal bands.
// TODO: honour CityConfig::{min_height, max_height} here once the band
// split is made configurable.
#[must_use]
pub fn sample_building_height(x: i32, grid_width: u32, rng: &mut impl Rng) -> f32 {
    if x > (grid_width / 2) as i32 {
        rng.gen_range(LOW_RISE_MAX..HIGH_RISE_MAX)
    } else {
        rng.gen_range(LOW_RISE_MIN..LOW_RISE_MAX)
    }
}

fn building_placement(cell: CellCoord, config: &CityConfig, rng: &mut impl Rng) -> CellPlacement {
    let height = sample_building_height(cell.x(), config.width, rng);
    let position = WorldVec::new(
        cell.x() as f32 * config.spacing_x - config.spacing_x * 0.5,
        height * 0.5,
        cell.z() as f32 * config.spacing_z - config.spacing_z * 0.5,
    );

    CellPlacement {
        cell,
        kind: CellKind::Building,
        position,
        scale: WorldVec::new(config.spacing_x, height, config.spacing_z),
        yaw_degrees: 0.0,
        rotated: false,
    }
}

fn road_placement(cell: CellCoord, config: &CityConfig, grid: GridDimensions) -> CellPlacement {
    let mut position = tile_position(cell, config);
    let rotated = classifier::road_flanked_by_buildings(cell, grid);
    let yaw_degrees = if rotated {
        // The turned segment shifts one tile toward the origin so its long
        // edge lines up with the flanking lots.
        position.z -= config.spacing_z;
        90.0
    } else {
        0.0
    };

    CellPlacement {
        cell,
        kind: CellKind::Road,
        position,
        scale: tile_scale(config),
        yaw_degrees,
        rotated,
    }
}

fn intersection_placement(cell: CellCoord, kind: CellKind, config: &CityConfig) -> CellPlacement {
    CellPlacement {
        cell,
        kind,
        position: tile_position(cell, config),
        scale: tile_scale(config),
        yaw_degrees: 0.0,
        rotated: false,
    }
}

fn tile_position(cell: CellCoord, config: &CityConfig) -> WorldVec {
    WorldVec::new(
        cell.x() as f32 * config.spacing_x,
        0.0,
        cell.z() as f32 * config.spacing_z,
    )
}

fn tile_scale(config: &CityConfig) -> WorldVec {
    WorldVec::new(config.spacing_x, 1.0, config.spacing_z)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use gridtown_core::{CellCoord, CellPlacement, CityConfig, GenerationId, GridDimensions};

    /// Provides read-only access to the installed configuration.
    #[must_use]
    pub fn config(world: &World) -> &CityConfig {
        &world.config
    }

    /// Dimensions of the configured grid.
    #[must_use]
    pub fn grid(world: &World) -> GridDimensions {
        world.config.grid()
    }

    /// Placements emitted by the most recent generation, in x-major order.
    #[must_use]
    pub fn placements(world: &World) -> &[CellPlacement] {
        &world.placements
    }

    /// Identifier of the most recent generation.
    #[must_use]
    pub fn generation(world: &World) -> GenerationId {
        world.generation
    }

    /// Retrieves the placement covering the provided cell, if it exists.
    #[must_use]
    pub fn placement_at(world: &World, cell: CellCoord) -> Option<&CellPlacement> {
        world
            .placements
            .iter()
            .find(|placement| placement.cell == cell)
    }
}
