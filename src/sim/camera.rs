//! Camera framing for the whole herd
//!
//! The rig follows the center of the herd's bounding box and zooms out when
//! the herd spreads. After victory it switches to a slow close-up orbit.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::{smooth_damp, smooth_damp_vec3, wrap_degrees};

/// Shot type, from tightest to widest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    CloseUp,
    LongShot,
    ExtremeLongShot,
}

impl CameraMode {
    /// Target field of view for this shot
    pub fn fov(self, tuning: &Tuning) -> f32 {
        match self {
            CameraMode::CloseUp => tuning.close_up_fov,
            CameraMode::LongShot => tuning.long_shot_fov,
            CameraMode::ExtremeLongShot => tuning.extreme_long_shot_fov,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Zero-size box at a point
    pub fn at(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Smallest box containing every point, `None` if there are none
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::at(first), |mut b, p| {
            b.encapsulate(p);
            b
        }))
    }

    pub fn encapsulate(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three axis extents
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }
}

/// Pick the shot for a herd spread: wide at or above the threshold
pub fn select_mode(bounds: &Bounds, threshold: f32) -> CameraMode {
    if bounds.max_extent() >= threshold {
        CameraMode::ExtremeLongShot
    } else {
        CameraMode::LongShot
    }
}

/// Camera rig state (the rig parents the actual camera)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRig {
    pub position: Vec3,
    velocity: Vec3,
    /// Rotation about +Y in degrees
    pub yaw: f32,
    pub fov: f32,
    fov_velocity: f32,
    mode: CameraMode,
    /// Latched by victory
    close_up: bool,
    /// Horizontal pan input for the current frame
    pan_input: Vec2,
}

impl CameraRig {
    pub fn new(position: Vec3, yaw: f32, tuning: &Tuning) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: wrap_degrees(yaw),
            fov: tuning.long_shot_fov,
            fov_velocity: 0.0,
            mode: CameraMode::LongShot,
            close_up: false,
            pan_input: Vec2::ZERO,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_pan_input(&mut self, input: Vec2) {
        self.pan_input = input;
    }

    /// Frame the winners up close from now on
    pub fn on_victory(&mut self) {
        self.close_up = true;
        self.mode = CameraMode::CloseUp;
    }

    /// Flat forward direction of the rig
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw.to_radians()) * Vec3::Z
    }

    /// Advance framing by `dt` game seconds. No-op for an empty herd.
    pub fn update(&mut self, herd: &[Vec3], tuning: &Tuning, dt: f32) {
        let Some(bounds) = Bounds::from_points(herd.iter().copied()) else {
            return;
        };

        self.position = smooth_damp_vec3(
            self.position,
            bounds.center(),
            &mut self.velocity,
            tuning.camera_smooth_time,
            dt,
        );

        self.mode = if self.close_up {
            CameraMode::CloseUp
        } else {
            select_mode(&bounds, tuning.extreme_long_shot_threshold)
        };

        self.fov = smooth_damp(
            self.fov,
            self.mode.fov(tuning),
            &mut self.fov_velocity,
            tuning.fov_smooth_time,
            dt,
        );

        let pan = if self.mode == CameraMode::CloseUp {
            tuning.close_up_orbit_input
        } else {
            self.pan_input.x
        };
        self.yaw = wrap_degrees(self.yaw + pan * dt * tuning.pan_rate);
    }
}
