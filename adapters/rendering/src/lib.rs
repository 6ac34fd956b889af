#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gridtown adapters.
//!
//! The world emits [`CellPlacement`](gridtown_core::CellPlacement) values;
//! adapters translate them into the scene description defined here and hand
//! the scene to a [`RenderingBackend`]. Variant identifiers stay symbolic in
//! the scene; resolving them to concrete colors or meshes is each backend's
//! concern.

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use gridtown_core::{BuildingVariantId, RoadVariantId, WorldVec};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Converts a core world-space triple into the adapter math type.
#[must_use]
pub fn world_vec3(value: WorldVec) -> Vec3 {
    Vec3::new(value.x, value.y, value.z)
}

/// Input snapshot gathered by backends before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the backend detected a regenerate request on this frame.
    pub regenerate: bool,
}

/// Describes the ground grid that backends may draw beneath the city.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of cells along the x axis.
    pub columns: u32,
    /// Number of cells along the z axis.
    pub rows: u32,
    /// World units between neighbouring cells along the x axis.
    pub spacing_x: f32,
    /// World units between neighbouring cells along the z axis.
    pub spacing_z: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when either spacing is zero or negative.
    pub fn new(
        columns: u32,
        rows: u32,
        spacing_x: f32,
        spacing_z: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if spacing_x <= 0.0 || spacing_z <= 0.0 {
            return Err(RenderingError::NonPositiveSpacing {
                spacing_x,
                spacing_z,
            });
        }

        Ok(Self {
            columns,
            rows,
            spacing_x,
            spacing_z,
            line_color,
        })
    }

    /// Total extent of the grid along the x axis in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.spacing_x
    }

    /// Total extent of the grid along the z axis in world units.
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.spacing_z
    }
}

/// Building box placed within the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPresentation {
    /// World-space center of the box.
    pub position: Vec3,
    /// World-space extents of the box; the vertical component is the
    /// sampled building height.
    pub scale: Vec3,
    /// Rotation about the vertical axis, in degrees.
    pub yaw_degrees: f32,
    /// Building variant the backend should resolve to a visual.
    pub variant: BuildingVariantId,
}

/// Flat road tile placed within the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TilePresentation {
    /// World-space center of the tile.
    pub position: Vec3,
    /// Planar extents of the tile.
    pub footprint: Vec2,
    /// Whether the tile is turned a quarter turn about the vertical axis.
    pub rotated: bool,
    /// Road variant the backend should resolve to a visual.
    pub variant: RoadVariantId,
}

/// Camera view consumed by backends each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// World-space position of the camera.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction for the view transform.
    pub up: Vec3,
}

impl CameraRig {
    /// Creates a new camera rig descriptor.
    #[must_use]
    pub const fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
        }
    }
}

/// Scene description combining the ground grid, city geometry and camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Ground grid underneath the city.
    pub grid: GridPresentation,
    /// Fill color of the ground plane.
    pub ground_color: Color,
    /// Building boxes visible in the scene.
    pub blocks: Vec<BlockPresentation>,
    /// Road and intersection tiles visible in the scene.
    pub tiles: Vec<TilePresentation>,
    /// Camera view for the frame.
    pub camera: CameraRig,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        grid: GridPresentation,
        ground_color: Color,
        blocks: Vec<BlockPresentation>,
        tiles: Vec<TilePresentation>,
        camera: CameraRig,
    ) -> Self {
        Self {
            grid,
            ground_color,
            blocks,
            tiles,
            camera,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Gridtown scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and
    /// per-frame input captured by the backend, and may mutate the scene
    /// before it is rendered, allowing adapters to orbit the camera and
    /// swap geometry after a regeneration.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Spacing must be positive on both axes to avoid zero-sized tiles.
    NonPositiveSpacing {
        /// Provided spacing along the x axis.
        spacing_x: f32,
        /// Provided spacing along the z axis.
        spacing_z: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveSpacing {
                spacing_x,
                spacing_z,
            } => {
                write!(
                    f,
                    "grid spacing must be positive (received {spacing_x} x {spacing_z})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_creation_accepts_positive_spacing() {
        let grid = GridPresentation::new(10, 8, 1.5, 1.0, Color::from_rgb_u8(64, 64, 64))
            .expect("positive spacing should succeed");

        assert_eq!(grid.width(), 15.0);
        assert_eq!(grid.depth(), 8.0);
    }

    #[test]
    fn grid_creation_rejects_non_positive_spacing_without_panicking() {
        let error = GridPresentation::new(10, 8, 0.0, 1.0, Color::from_rgb_u8(0, 0, 0))
            .expect_err("zero spacing must be rejected");

        assert_eq!(
            error,
            RenderingError::NonPositiveSpacing {
                spacing_x: 0.0,
                spacing_z: 1.0
            }
        );
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 128, 255).lighten(0.5);
        assert!(color.red > 0.49 && color.red < 0.51);
        assert!(color.green > 0.75);
        assert_eq!(color.blue, 1.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn lighten_clamps_the_amount() {
        let color = Color::from_rgb_u8(10, 20, 30).lighten(5.0);
        assert_eq!(color, Color::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn world_vec3_preserves_components() {
        let converted = world_vec3(gridtown_core::WorldVec::new(1.5, -2.0, 3.25));
        assert_eq!(converted, Vec3::new(1.5, -2.0, 3.25));
    }

    #[test]
    fn scene_new_preserves_all_channels() {
        let grid = GridPresentation::new(5, 5, 1.0, 1.0, Color::from_rgb_u8(32, 32, 32))
            .expect("valid grid");
        let camera = CameraRig::new(Vec3::new(0.0, 20.0, -20.0), Vec3::ZERO, Vec3::Y);
        let blocks = vec![BlockPresentation {
            position: Vec3::new(0.5, 1.0, 0.5),
            scale: Vec3::new(1.0, 2.0, 1.0),
            yaw_degrees: 0.0,
            variant: BuildingVariantId::new("slab"),
        }];
        let tiles = vec![TilePresentation {
            position: Vec3::ZERO,
            footprint: Vec2::splat(1.0),
            rotated: true,
            variant: RoadVariantId::new("road"),
        }];

        let scene = Scene::new(
            grid,
            Color::from_rgb_u8(40, 60, 40),
            blocks.clone(),
            tiles.clone(),
            camera,
        );

        assert_eq!(scene.grid, grid);
        assert_eq!(scene.blocks, blocks);
        assert_eq!(scene.tiles, tiles);
        assert_eq!(scene.camera, camera);
    }
}
