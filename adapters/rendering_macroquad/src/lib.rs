#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Gridtown.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.
//!
//! The backend draws the city with macroquad's 3D primitives: a ground
//! plane, flat tiles for roads and intersections, and boxes for buildings,
//! all viewed through a `Camera3D` fed from the scene's camera rig each
//! frame.

mod palette;

pub use self::palette::VariantPalette;

use anyhow::{Context, Result};
use glam::Vec2;
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    input::{is_key_pressed, KeyCode},
    math::{Vec2 as MacroquadVec2, Vec3 as MacroquadVec3},
    models::{draw_cube, draw_line_3d, draw_plane},
};
use gridtown_rendering::{
    BlockPresentation, Color, FrameInput, GridPresentation, Presentation, RenderingBackend,
    Scene, TilePresentation,
};
use std::time::Duration;

/// Vertical thickness used when drawing flat road tiles.
const TILE_THICKNESS: f32 = 0.04;

/// Margin added around the grid when drawing the ground plane.
const GROUND_MARGIN: f32 = 2.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `R` to request a fresh city layout.
    regenerate: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let regenerate = is_key_pressed(KeyCode::R);

        Self {
            quit_requested,
            regenerate,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    palette: Option<VariantPalette>,
    load_palette: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            palette: None,
            load_palette: true,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Supplies an explicit variant palette, skipping manifest loading.
    #[must_use]
    pub fn with_palette(mut self, palette: VariantPalette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Configures whether the backend should attempt to load a palette manifest.
    #[must_use]
    pub fn with_palette_loading(mut self, enabled: bool) -> Self {
        self.load_palette = enabled;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second average once a
    /// full second has accumulated.
    fn record_frame(&mut self, dt: Duration) -> Option<f32> {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.frames += 1;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = if seconds <= f32::EPSILON {
            0.0
        } else {
            self.frames as f32 / seconds
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            palette,
            load_palette,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let palette = match palette {
            Some(palette) => palette,
            None if load_palette => VariantPalette::from_default_manifest()
                .context("failed to load variant palette")?,
            None => VariantPalette::builtin(),
        };

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    regenerate: keyboard.regenerate,
                };

                update_scene(frame_dt, frame_input, &mut scene);

                set_camera(&Camera3D {
                    position: to_macroquad_vec3(scene.camera.position),
                    target: to_macroquad_vec3(scene.camera.target),
                    up: to_macroquad_vec3(scene.camera.up),
                    ..Camera3D::default()
                });

                draw_ground(&scene);
                draw_grid_lines(&scene.grid);
                for tile in &scene.tiles {
                    draw_tile(tile, &palette);
                }
                for block in &scene.blocks {
                    draw_block(block, &palette);
                }

                set_default_camera();

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        println!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_ground(scene: &Scene) {
    let grid = scene.grid;
    let center = MacroquadVec3::new(
        grid.width() * 0.5 - grid.spacing_x * 0.5,
        -TILE_THICKNESS,
        grid.depth() * 0.5 - grid.spacing_z * 0.5,
    );
    let size = MacroquadVec2::new(
        grid.width() + GROUND_MARGIN,
        grid.depth() + GROUND_MARGIN,
    );
    draw_plane(center, size, None, to_macroquad_color(scene.ground_color));
}

fn draw_grid_lines(grid: &GridPresentation) {
    let color = to_macroquad_color(grid.line_color);
    let half_x = grid.spacing_x * 0.5;
    let half_z = grid.spacing_z * 0.5;
    let min_x = -half_x;
    let min_z = -half_z;
    let max_x = grid.width() - half_x;
    let max_z = grid.depth() - half_z;

    for column in 0..=grid.columns {
        let x = column as f32 * grid.spacing_x - half_x;
        draw_line_3d(
            MacroquadVec3::new(x, 0.0, min_z),
            MacroquadVec3::new(x, 0.0, max_z),
            color,
        );
    }

    for row in 0..=grid.rows {
        let z = row as f32 * grid.spacing_z - half_z;
        draw_line_3d(
            MacroquadVec3::new(min_x, 0.0, z),
            MacroquadVec3::new(max_x, 0.0, z),
            color,
        );
    }
}

fn draw_tile(tile: &TilePresentation, palette: &VariantPalette) {
    let extents = tile_extents(tile);
    let position = MacroquadVec3::new(
        tile.position.x,
        tile.position.y + TILE_THICKNESS * 0.5,
        tile.position.z,
    );
    draw_cube(
        position,
        MacroquadVec3::new(extents.x, TILE_THICKNESS, extents.y),
        None,
        to_macroquad_color(palette.road_color(&tile.variant)),
    );
}

fn draw_block(block: &BlockPresentation, palette: &VariantPalette) {
    let extents = block_extents(block);
    draw_cube(
        to_macroquad_vec3(block.position),
        MacroquadVec3::new(extents.x, block.scale.y, extents.z),
        None,
        to_macroquad_color(palette.building_color(&block.variant)),
    );
}

/// Planar extents of a tile with its quarter-turn applied.
///
/// A quarter turn on an axis-aligned box amounts to swapping its planar
/// extents.
fn tile_extents(tile: &TilePresentation) -> Vec2 {
    if tile.rotated {
        Vec2::new(tile.footprint.y, tile.footprint.x)
    } else {
        tile.footprint
    }
}

/// Planar extents of a building box with its yaw applied.
fn block_extents(block: &BlockPresentation) -> glam::Vec3 {
    if quarter_turned(block.yaw_degrees) {
        glam::Vec3::new(block.scale.z, block.scale.y, block.scale.x)
    } else {
        block.scale
    }
}

fn quarter_turned(yaw_degrees: f32) -> bool {
    let normalized = yaw_degrees.rem_euclid(180.0);
    (normalized - 90.0).abs() < 1.0
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn to_macroquad_vec3(value: glam::Vec3) -> MacroquadVec3 {
    MacroquadVec3::new(value.x, value.y, value.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtown_core::{BuildingVariantId, RoadVariantId};
    use glam::Vec3;

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(counter.record_frame(Duration::from_millis(16)), None);
        }
        let per_second = counter
            .record_frame(Duration::from_millis(64))
            .expect("one second accumulated");
        assert!(per_second > 0.0);
        // The counter resets after reporting.
        assert_eq!(counter.record_frame(Duration::from_millis(16)), None);
    }

    #[test]
    fn rotated_tiles_swap_their_planar_extents() {
        let tile = TilePresentation {
            position: Vec3::ZERO,
            footprint: Vec2::new(2.0, 1.0),
            rotated: true,
            variant: RoadVariantId::new("road"),
        };
        assert_eq!(tile_extents(&tile), Vec2::new(1.0, 2.0));

        let straight = TilePresentation {
            rotated: false,
            ..tile
        };
        assert_eq!(tile_extents(&straight), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn quarter_turned_blocks_swap_extents_and_keep_height() {
        let block = BlockPresentation {
            position: Vec3::ZERO,
            scale: Vec3::new(1.0, 7.5, 2.0),
            yaw_degrees: 90.0,
            variant: BuildingVariantId::new("slab"),
        };
        assert_eq!(block_extents(&block), Vec3::new(2.0, 7.5, 1.0));

        let unrotated = BlockPresentation {
            yaw_degrees: 0.0,
            ..block
        };
        assert_eq!(block_extents(&unrotated), Vec3::new(1.0, 7.5, 2.0));
    }

    #[test]
    fn color_conversion_preserves_channels() {
        let converted = to_macroquad_color(Color::new(0.25, 0.5, 0.75, 1.0));
        assert_eq!(converted.r, 0.25);
        assert_eq!(converted.g, 0.5);
        assert_eq!(converted.b, 0.75);
        assert_eq!(converted.a, 1.0);
    }
}
