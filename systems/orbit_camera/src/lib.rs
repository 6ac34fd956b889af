#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure orbit-camera system that derives a camera pose from elapsed time.
//!
//! The camera circles the grid center at a fixed distance and angular
//! speed. [`OrbitCamera::pose_at`] is a pure function of elapsed time, so
//! the host render loop decides the cadence and the system holds no frame
//! state beyond the center computed at construction.

use std::time::Duration;

use glam::{Quat, Vec3};
use gridtown_core::GridDimensions;

/// Configuration parameters required to construct the orbit camera.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    distance: f32,
    degrees_per_second: f32,
}

impl Config {
    /// Creates a new configuration using the provided orbit distance and
    /// angular speed in degrees per second.
    #[must_use]
    pub const fn new(distance: f32, degrees_per_second: f32) -> Self {
        Self {
            distance,
            degrees_per_second,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance: 20.0,
            degrees_per_second: 10.0,
        }
    }
}

/// Camera pose produced for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// World-space position of the camera.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction for the view transform.
    pub up: Vec3,
}

/// Camera that orbits the grid center at constant angular speed.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    center: Vec3,
    distance: f32,
    degrees_per_second: f32,
}

impl OrbitCamera {
    /// Creates an orbit camera centered on the provided grid.
    ///
    /// The center uses the integer-division midpoint `((w - 1) / 2, 0,
    /// (l - 1) / 2)`, so even-sized grids pivot on the cell left of the
    /// true middle.
    #[must_use]
    pub fn new(grid: GridDimensions, config: Config) -> Self {
        let center = Vec3::new(
            (grid.width().saturating_sub(1) / 2) as f32,
            0.0,
            (grid.length().saturating_sub(1) / 2) as f32,
        );

        Self {
            center,
            distance: config.distance,
            degrees_per_second: config.degrees_per_second,
        }
    }

    /// Point the camera orbits around and looks at.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Computes the camera pose after the provided elapsed time.
    ///
    /// The initial offset `(0, distance, -distance)` is rotated about the
    /// vertical axis by `degrees_per_second * elapsed` degrees; the pose
    /// always targets the center.
    #[must_use]
    pub fn pose_at(&self, elapsed: Duration) -> CameraPose {
        let angle_degrees = self.degrees_per_second * elapsed.as_secs_f32();
        let rotation = Quat::from_rotation_y(angle_degrees.to_radians());
        let offset = rotation * Vec3::new(0.0, self.distance, -self.distance);

        CameraPose {
            position: self.center + offset,
            target: self.center,
            up: Vec3::Y,
        }
    }
}
