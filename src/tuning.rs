//! Data-driven gameplay constants
//!
//! Every number a designer might want to tweak lives here. Missing fields in
//! a tuning file fall back to the stock values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Camera ===
    /// FOV when framing a finished level
    pub close_up_fov: f32,
    /// FOV for a tight herd
    pub long_shot_fov: f32,
    /// FOV for a spread-out herd
    pub extreme_long_shot_fov: f32,
    /// Largest bounds extent at which the camera switches to the extreme long shot
    pub extreme_long_shot_threshold: f32,
    /// Smoothing time for camera position (seconds)
    pub camera_smooth_time: f32,
    /// Smoothing time for FOV changes (seconds)
    pub fov_smooth_time: f32,
    /// Degrees per second per unit of pan input
    pub pan_rate: f32,
    /// Pan input used for the victory orbit
    pub close_up_orbit_input: f32,

    // === Locomotion ===
    /// Max turn speed toward the heading (radians/sec)
    pub turn_rate: f32,
    /// Force applied along the heading
    pub move_force: f32,
    /// Multiplier on gravity added while airborne
    pub extra_gravity_scale: f32,
    /// Ground probe starts this far below the body
    pub ground_probe_offset: f32,
    /// Ground probe cast length
    pub ground_probe_distance: f32,
    /// Bodies below this height die
    pub kill_height: f32,
    /// Speed above which dust and impact sounds kick in
    pub fast_speed: f32,

    // === Puzzles ===
    /// Distance a captured ball moves toward its goal per update
    pub goal_snap_step: f32,
    /// Signals needed by a counting aggregator
    pub aggregator_target: u32,

    // === Transitions ===
    /// Curtain fade before a level swap (real seconds)
    pub level_fade_secs: f32,
    /// Curtain fade in the main menu (real seconds)
    pub menu_fade_secs: f32,
    /// Delay before the win panel appears (game seconds)
    pub win_menu_delay_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            close_up_fov: 8.0,
            long_shot_fov: 13.5,
            extreme_long_shot_fov: 20.0,
            extreme_long_shot_threshold: 8.0,
            camera_smooth_time: 0.3,
            fov_smooth_time: 0.3,
            pan_rate: 50.0,
            close_up_orbit_input: 0.3,

            turn_rate: 10.0,
            move_force: 20.0,
            extra_gravity_scale: 2.5,
            ground_probe_offset: 0.1,
            ground_probe_distance: 1.0,
            kill_height: -15.0,
            fast_speed: 1.0,

            goal_snap_step: 0.1,
            aggregator_target: 3,

            level_fade_secs: 1.0,
            menu_fade_secs: 0.2,
            win_menu_delay_secs: 0.3,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
