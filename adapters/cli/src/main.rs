#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates and displays Gridtown cities.

mod city_transfer;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use gridtown_core::{
    BuildingVariantId, CellKind, CellPlacement, CityConfig, Command, GenerationId,
    GridDimensions, RoadVariantId, DEFAULT_HEIGHT_SEED,
};
use gridtown_rendering::{
    world_vec3, BlockPresentation, CameraRig, Color, GridPresentation, Presentation,
    RenderingBackend, Scene, TilePresentation,
};
use gridtown_rendering_macroquad::MacroquadBackend;
use gridtown_system_analytics::{Analytics, CityMetrics};
use gridtown_system_orbit_camera::{Config as OrbitConfig, OrbitCamera};
use gridtown_world::{self as world, query, World};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::city_transfer::CityLayoutSnapshot;

const CLEAR_COLOR: Color = Color::from_rgb_u8(0x12, 0x14, 0x1c);
const GROUND_COLOR: Color = Color::from_rgb_u8(0x25, 0x2b, 0x22);
const GRID_LINE_COLOR: Color = Color::from_rgb_u8(0x3c, 0x40, 0x4a);

/// Procedural city-block generator.
#[derive(Debug, Parser)]
#[command(name = "gridtown")]
struct Args {
    /// Number of cells along the x axis.
    #[arg(long, default_value_t = 10)]
    width: u32,

    /// Number of cells along the z axis.
    #[arg(long, default_value_t = 10)]
    length: u32,

    /// World units between neighbouring cells along the x axis.
    #[arg(long, default_value_t = 1.0)]
    spacing_x: f32,

    /// World units between neighbouring cells along the z axis.
    #[arg(long, default_value_t = 1.0)]
    spacing_z: f32,

    /// Lower building-height bound carried in the configuration.
    #[arg(long, default_value_t = 1.0)]
    min_height: f32,

    /// Upper building-height bound carried in the configuration.
    #[arg(long, default_value_t = 5.0)]
    max_height: f32,

    /// Seed for height sampling and variant selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated building variant names renderers may choose from.
    #[arg(long, value_delimiter = ',', default_value = "slab,tower,block")]
    variants: Vec<String>,

    /// Classify boundary-exact outer intersections.
    #[arg(long)]
    outer_intersections: bool,

    /// Generate and print the summary without opening a window.
    #[arg(long)]
    headless: bool,

    /// Print the layout as a single-line transfer string and exit.
    #[arg(long)]
    export: bool,

    /// Decode a layout transfer string, print its summary, and exit.
    #[arg(long, value_name = "LAYOUT")]
    inspect: Option<String>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn city_config(&self) -> CityConfig {
        CityConfig {
            width: self.width,
            length: self.length,
            spacing_x: self.spacing_x,
            spacing_z: self.spacing_z,
            min_height: self.min_height,
            max_height: self.max_height,
            building_variants: self
                .variants
                .iter()
                .map(BuildingVariantId::new)
                .collect(),
            height_seed: self.seed.unwrap_or(DEFAULT_HEIGHT_SEED),
            outer_intersections: self.outer_intersections,
            ..CityConfig::default()
        }
    }
}

/// Entry point for the Gridtown command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(layout) = &args.inspect {
        return inspect_layout(layout);
    }

    let config = args.city_config();
    config.validate().context("invalid city configuration")?;

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureCity {
            config: config.clone(),
        },
        &mut events,
    );

    let mut analytics = Analytics::new();
    let metrics = analytics
        .handle(&events, query::placements(&world))
        .context("configuration produced no layout")?;
    print_summary(query::grid(&world), query::generation(&world), &metrics);

    if args.export {
        let snapshot = CityLayoutSnapshot {
            width: config.width,
            length: config.length,
            spacing_x: config.spacing_x,
            spacing_z: config.spacing_z,
            placements: query::placements(&world).to_vec(),
        };
        println!("{}", snapshot.encode());
        return Ok(());
    }

    if args.headless {
        return Ok(());
    }

    run_windowed(&args, config, world)
}

fn inspect_layout(layout: &str) -> Result<()> {
    let snapshot = CityLayoutSnapshot::decode(layout)?;
    let metrics = CityMetrics::collect(&snapshot.placements);

    println!(
        "layout {}x{} (spacing {} x {})",
        snapshot.width, snapshot.length, snapshot.spacing_x, snapshot.spacing_z
    );
    print_metrics(&metrics);
    Ok(())
}

fn print_summary(grid: GridDimensions, generation: GenerationId, metrics: &CityMetrics) {
    println!(
        "generated {}x{} city (generation {})",
        grid.width(),
        grid.length(),
        generation.get()
    );
    print_metrics(metrics);
}

fn print_metrics(metrics: &CityMetrics) {
    match (metrics.lowest_building, metrics.tallest_building) {
        (Some(lowest), Some(tallest)) => println!(
            "  buildings: {} (heights {lowest:.1}..{tallest:.1})",
            metrics.buildings
        ),
        _ => println!("  buildings: {}", metrics.buildings),
    }
    println!(
        "  roads: {} ({} rotated)",
        metrics.roads, metrics.rotated_roads
    );
    println!(
        "  intersections: {} four-way, {} outer",
        metrics.four_ways, metrics.outer_intersections
    );
}

fn run_windowed(args: &Args, config: CityConfig, mut world: World) -> Result<()> {
    let camera = OrbitCamera::new(query::grid(&world), OrbitConfig::default());
    let mut variant_rng = ChaCha8Rng::seed_from_u64(config.height_seed);

    let initial_pose = camera.pose_at(Duration::ZERO);
    let scene = build_scene(
        &config,
        query::placements(&world),
        CameraRig::new(initial_pose.position, initial_pose.target, initial_pose.up),
        &mut variant_rng,
    )?;
    let presentation = Presentation::new("Gridtown", CLEAR_COLOR, scene);

    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps);

    let mut elapsed = Duration::ZERO;
    backend.run(presentation, move |dt, input, scene| {
        elapsed = elapsed.saturating_add(dt);

        if input.regenerate {
            let mut events = Vec::new();
            world::apply(&mut world, Command::RegenerateCity, &mut events);
            populate_scene(scene, &config, query::placements(&world), &mut variant_rng);
        }

        let pose = camera.pose_at(elapsed);
        scene.camera = CameraRig::new(pose.position, pose.target, pose.up);
    })
}

fn build_scene(
    config: &CityConfig,
    placements: &[CellPlacement],
    camera: CameraRig,
    rng: &mut impl Rng,
) -> Result<Scene> {
    let grid = GridPresentation::new(
        config.width,
        config.length,
        config.spacing_x,
        config.spacing_z,
        GRID_LINE_COLOR,
    )
    .context("scene grid rejected the configured spacing")?;

    let mut scene = Scene::new(grid, GROUND_COLOR, Vec::new(), Vec::new(), camera);
    populate_scene(&mut scene, config, placements, rng);
    Ok(scene)
}

fn populate_scene(
    scene: &mut Scene,
    config: &CityConfig,
    placements: &[CellPlacement],
    rng: &mut impl Rng,
) {
    scene.blocks.clear();
    scene.tiles.clear();

    for placement in placements {
        match placement.kind {
            CellKind::Building => scene.blocks.push(BlockPresentation {
                position: world_vec3(placement.position),
                scale: world_vec3(placement.scale),
                yaw_degrees: placement.yaw_degrees,
                variant: choose_building_variant(&config.building_variants, rng).clone(),
            }),
            kind => scene.tiles.push(TilePresentation {
                position: world_vec3(placement.position),
                footprint: Vec2::new(placement.scale.x, placement.scale.z),
                rotated: placement.rotated,
                variant: tile_variant(config, kind).clone(),
            }),
        }
    }
}

fn choose_building_variant<'config>(
    variants: &'config [BuildingVariantId],
    rng: &mut impl Rng,
) -> &'config BuildingVariantId {
    // Configuration validation guarantees the list is non-empty.
    &variants[rng.gen_range(0..variants.len())]
}

fn tile_variant(config: &CityConfig, kind: CellKind) -> &RoadVariantId {
    match kind {
        CellKind::FourWayIntersection => {
            config.four_way_variant.as_ref().unwrap_or(&config.road_variant)
        }
        CellKind::OuterIntersection => config
            .outer_variant
            .as_ref()
            .or(config.four_way_variant.as_ref())
            .unwrap_or(&config.road_variant),
        _ => &config.road_variant,
    }
}
