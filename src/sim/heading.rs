//! Stick input to world-space heading, relative to the camera

use glam::{Quat, Vec2, Vec3};

/// Convert 2D movement input into a flat world heading.
///
/// `camera_forward` is the camera rig's forward vector; its vertical part is
/// ignored. Returns zero for no input or a degenerate camera.
pub fn compute_heading(camera_forward: Vec3, input: Vec2) -> Vec3 {
    let forward = Vec3::new(camera_forward.x, 0.0, camera_forward.z).normalize_or_zero();
    let right = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2) * forward;
    (right * input.x + forward * input.y).normalize_or_zero()
}

/// Per-consumer enable switch for an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputGate {
    enabled: bool,
}

impl Default for InputGate {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl InputGate {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pass `value` through when enabled, otherwise the default
    pub fn filter<T: Default>(&self, value: T) -> T {
        if self.enabled { value } else { T::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_forward_input_follows_camera() {
        let heading = compute_heading(Vec3::Z, Vec2::new(0.0, 1.0));
        assert!(close(heading, Vec3::Z));
    }

    #[test]
    fn test_right_is_clockwise_from_above() {
        // Camera looking down +Z: right is +X
        let heading = compute_heading(Vec3::Z, Vec2::new(1.0, 0.0));
        assert!(close(heading, Vec3::X));
    }

    #[test]
    fn test_pitch_is_flattened_and_diagonal_normalized() {
        let pitched = Vec3::new(0.0, -0.8, 0.6);
        let heading = compute_heading(pitched, Vec2::new(1.0, 1.0));
        assert!(heading.y.abs() < 1e-6);
        assert!((heading.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_input_is_zero() {
        assert_eq!(compute_heading(Vec3::Z, Vec2::ZERO), Vec3::ZERO);
        assert_eq!(compute_heading(Vec3::Y, Vec2::new(0.0, 1.0)), Vec3::ZERO);
    }

    #[test]
    fn test_gate_filters() {
        let mut gate = InputGate::default();
        assert_eq!(gate.filter(Vec2::ONE), Vec2::ONE);
        gate.disable();
        assert_eq!(gate.filter(Vec2::ONE), Vec2::ZERO);
        assert!(!gate.filter(true));
    }
}
