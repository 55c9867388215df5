//! Entity identifiers and the rigid-body mirror
//!
//! The host physics owns the real bodies. The level keeps a mirror of the
//! fields gameplay reads and writes, and the host syncs it each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A physical entity (player character, ball, prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A sensor volume (trigger, switch, goal, finish point, platform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorId(pub u32);

/// A counting aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregatorId(pub u32);

/// Collision tag used by sensor filters and the ground probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tag {
    Player,
    Ball,
    #[default]
    Untagged,
}

/// Default capsule radius of a player character
pub const PLAYER_RADIUS: f32 = 0.5;
/// Default radius of a pushable ball
pub const BALL_RADIUS: f32 = 0.5;

/// Gameplay view of a rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub tag: Tag,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Facing direction (unit length)
    pub forward: Vec3,
    pub radius: f32,
    pub mass: f32,
    /// Kinematic bodies ignore forces and gravity
    pub kinematic: bool,
}

impl Body {
    pub fn new(id: EntityId, tag: Tag, position: Vec3, radius: f32) -> Self {
        Self {
            id,
            tag,
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            forward: Vec3::Z,
            radius,
            mass: 1.0,
            kinematic: false,
        }
    }

    pub fn player(id: EntityId, position: Vec3) -> Self {
        Self::new(id, Tag::Player, position, PLAYER_RADIUS)
    }

    pub fn ball(id: EntityId, position: Vec3) -> Self {
        Self::new(id, Tag::Ball, position, BALL_RADIUS)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Apply a continuous force over `dt`
    pub fn add_force(&mut self, force: Vec3, dt: f32) {
        if !self.kinematic {
            self.velocity += force / self.mass.max(f32::EPSILON) * dt;
        }
    }
}

/// What the host should show for a body this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPresentation {
    /// Drives the walk animation blend
    pub walk_speed: f32,
    /// Whether the dust trail is emitting
    pub dust: bool,
}
