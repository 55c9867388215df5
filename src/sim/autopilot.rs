//! Seeded input driver for the headless demo and soak tests
//!
//! Steers the herd toward the finish point through the same camera-relative
//! stick input a player would use, with a little wander so runs differ by seed.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::level::{Level, TickInput};

/// Frames between wander re-rolls
const WANDER_PERIOD: u32 = 25;
/// Largest wander angle (radians)
const MAX_WANDER: f32 = 0.6;

#[derive(Debug, Clone)]
pub struct Autopilot {
    seed: u64,
    rng: Pcg32,
    wander: f32,
    frames: u32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            wander: 0.0,
            frames: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Input for the next frame of `level`
    pub fn next_input(&mut self, level: &Level) -> TickInput {
        if self.frames % WANDER_PERIOD == 0 {
            self.wander = self.rng.random_range(-MAX_WANDER..MAX_WANDER);
        }
        self.frames = self.frames.wrapping_add(1);

        let herd = level.herd_positions();
        let (Some(target), false) = (level.finish_position(), herd.is_empty()) else {
            return TickInput::default();
        };
        let centroid = herd.iter().copied().sum::<Vec3>() / herd.len() as f32;
        let to_target = Vec3::new(target.x - centroid.x, 0.0, target.z - centroid.z);
        let dir = Quat::from_rotation_y(self.wander) * to_target.normalize_or_zero();

        let forward = level.camera().forward();
        let right = Quat::from_rotation_y(FRAC_PI_2) * forward;
        TickInput {
            movement: Vec2::new(dir.dot(right), dir.dot(forward)),
            ..Default::default()
        }
    }
}
