//! Herd Hop - A co-op 3D platformer where one input drives the whole herd
//!
//! Core modules:
//! - `sim`: Deterministic gameplay logic (session, roster, locomotion, camera, puzzles)
//! - `ui`: Menu coordinators and the fade curtain
//! - `app`: Scene shell that owns the active level and performs scene swaps
//! - `tuning`: Data-driven gameplay constants
//! - `level_desc`: Serializable level descriptions

pub mod app;
pub mod error;
pub mod level_desc;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use app::Game;
pub use error::{GameError, Result};
pub use level_desc::{LevelCatalog, LevelDesc};
pub use settings::{Resolution, Settings};
pub use tuning::Tuning;

use glam::{Quat, Vec3};

/// Engine-level constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the shell (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World gravity applied by the host physics
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    /// Scene name of the title screen
    pub const MAIN_TITLE: &str = "MainTitle";
    /// Level scenes are named `Level_1`, `Level_2`, ...
    pub const LEVEL_PREFIX: &str = "Level_";
}

/// Scene name for a zero-based level-select index
pub fn level_scene_name(index: usize) -> String {
    format!("{}{}", consts::LEVEL_PREFIX, index + 1)
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Critically damped spring toward `target` (scalar).
///
/// `velocity` carries state between calls. A zero `dt` leaves both the value
/// and the velocity untouched.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Never overshoot the target
    if (target - current) * (output - target) > 0.0 {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Critically damped spring toward `target` (vector), see [`smooth_damp`].
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

/// Move `current` toward `target` by at most `max_step` units
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_step: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_step
    }
}

/// Rotate direction `from` toward `to` by at most `max_radians`.
///
/// The result keeps the length of `from`. Degenerate inputs return `from`.
pub fn rotate_towards(from: Vec3, to: Vec3, max_radians: f32) -> Vec3 {
    let from_len = from.length();
    if from_len <= f32::EPSILON || to.length_squared() <= f32::EPSILON {
        return from;
    }
    let a = from / from_len;
    let b = to.normalize();
    let angle = a.angle_between(b);
    if angle <= max_radians {
        return b * from_len;
    }

    let axis = a.cross(b);
    let axis = if axis.length_squared() <= 1e-12 {
        // Opposite directions: any perpendicular axis works
        a.any_orthonormal_vector()
    } else {
        axis.normalize()
    };
    Quat::from_axis_angle(axis, max_radians) * a * from_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_scene_name() {
        assert_eq!(level_scene_name(0), "Level_1");
        assert_eq!(level_scene_name(4), "Level_5");
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut vel = 0.0;
        for _ in 0..200 {
            value = smooth_damp(value, 10.0, &mut vel, 0.3, 1.0 / 60.0);
            assert!(value <= 10.0 + 1e-4);
        }
        assert!((value - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_smooth_damp_zero_dt_is_noop() {
        let mut vel = 3.0;
        let value = smooth_damp(1.0, 5.0, &mut vel, 0.3, 0.0);
        assert_eq!(value, 1.0);
        assert_eq!(vel, 3.0);
    }

    #[test]
    fn test_smooth_damp_vec3_at_target_stays() {
        let mut vel = Vec3::ZERO;
        let out = smooth_damp_vec3(Vec3::ONE, Vec3::ONE, &mut vel, 0.3, 0.02);
        assert!((out - Vec3::ONE).length() < 1e-6);
        assert!(vel.length() < 1e-6);
    }

    #[test]
    fn test_move_towards() {
        let p = move_towards(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.1);
        assert!((p.x - 0.1).abs() < 1e-6);
        let p = move_towards(Vec3::ZERO, Vec3::new(0.05, 0.0, 0.0), 0.1);
        assert_eq!(p, Vec3::new(0.05, 0.0, 0.0));
    }

    #[test]
    fn test_rotate_towards_bounded() {
        let from = Vec3::Z;
        let to = Vec3::X;
        let out = rotate_towards(from, to, 0.1);
        assert!((from.angle_between(out) - 0.1).abs() < 1e-4);
        assert!((out.length() - 1.0).abs() < 1e-5);

        // Within reach snaps to target
        let out = rotate_towards(from, to, 2.0);
        assert!((out - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_opposite() {
        let out = rotate_towards(Vec3::Z, -Vec3::Z, 0.5);
        assert!((Vec3::Z.angle_between(out) - 0.5).abs() < 1e-4);
    }
}
