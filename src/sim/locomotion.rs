//! Per-character movement, grounding and fall-out detection

use glam::Vec3;

use super::physics::PhysicsQuery;
use super::state::{Body, BodyPresentation, Tag};
use crate::consts::GRAVITY;
use crate::rotate_towards;
use crate::tuning::Tuning;

/// Turn toward `heading` and push along it.
///
/// A zero heading means "no input": spin is stopped but momentum is kept.
pub fn rotate_and_move(body: &mut Body, heading: Vec3, tuning: &Tuning, dt: f32) {
    if heading.length_squared() <= 0.0 {
        body.angular_velocity = Vec3::ZERO;
        return;
    }
    let new_dir = rotate_towards(body.forward, heading, tuning.turn_rate * dt);
    body.forward = new_dir.normalize_or(body.forward);
    body.add_force(heading * tuning.move_force, dt);
}

/// Probe below the body for anything that is not a player character
pub fn is_grounded(body: &Body, physics: &dyn PhysicsQuery, tuning: &Tuning) -> bool {
    let origin = body.position - Vec3::new(0.0, tuning.ground_probe_offset, 0.0);
    physics
        .sphere_cast_all(origin, body.radius, Vec3::NEG_Y, tuning.ground_probe_distance)
        .iter()
        .any(|hit| hit.tag != Tag::Player)
}

/// Pull airborne bodies down harder than plain gravity.
///
/// Returns whether the body was grounded.
pub fn apply_extra_gravity(body: &mut Body, physics: &dyn PhysicsQuery, tuning: &Tuning, dt: f32) -> bool {
    if body.kinematic {
        return true;
    }
    let grounded = is_grounded(body, physics, tuning);
    if !grounded {
        body.velocity.y += GRAVITY.y * tuning.extra_gravity_scale * dt;
    }
    grounded
}

/// Whether the body has dropped below the kill plane
#[inline]
pub fn fell_out(body: &Body, tuning: &Tuning) -> bool {
    body.position.y < tuning.kill_height
}

/// Whether a contact at the current speed should make an impact sound
#[inline]
pub fn is_hard_contact(body: &Body, tuning: &Tuning) -> bool {
    body.speed() > tuning.fast_speed
}

pub fn presentation(body: &Body, tuning: &Tuning) -> BodyPresentation {
    let speed = body.speed();
    BodyPresentation {
        walk_speed: speed,
        dust: speed > tuning.fast_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::{EmptyWorld, FlatGround};
    use crate::sim::state::EntityId;
    use glam::Vec2;

    const DT: f32 = 0.02;

    #[test]
    fn test_zero_heading_stops_spin_keeps_momentum() {
        let tuning = Tuning::default();
        let mut body = Body::player(EntityId(1), Vec3::ZERO);
        body.velocity = Vec3::new(3.0, 0.0, 0.0);
        body.angular_velocity = Vec3::new(0.0, 2.0, 0.0);

        rotate_and_move(&mut body, Vec3::ZERO, &tuning, DT);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
        assert_eq!(body.velocity, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_turn_rate_is_bounded() {
        let tuning = Tuning::default();
        let mut body = Body::player(EntityId(1), Vec3::ZERO);
        body.forward = Vec3::Z;

        rotate_and_move(&mut body, Vec3::X, &tuning, DT);
        let turned = Vec3::Z.angle_between(body.forward);
        assert!((turned - tuning.turn_rate * DT).abs() < 1e-4);
        // Force along heading
        assert!((body.velocity.x - tuning.move_force * DT).abs() < 1e-5);
    }

    #[test]
    fn test_faces_heading_eventually() {
        let tuning = Tuning::default();
        let mut body = Body::player(EntityId(1), Vec3::ZERO);
        for _ in 0..50 {
            rotate_and_move(&mut body, -Vec3::X, &tuning, DT);
        }
        assert!((body.forward - -Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_extra_gravity_only_when_airborne() {
        let tuning = Tuning::default();
        let mut world = FlatGround::new(0.0, Vec2::new(10.0, 10.0));

        let mut standing = Body::player(EntityId(1), Vec3::new(0.0, 0.5, 0.0));
        world.sync([&standing]);
        assert!(apply_extra_gravity(&mut standing, &world, &tuning, DT));
        assert_eq!(standing.velocity.y, 0.0);

        let mut falling = Body::player(EntityId(2), Vec3::new(0.0, 0.5, 0.0));
        assert!(!apply_extra_gravity(&mut falling, &EmptyWorld, &tuning, DT));
        let expected = GRAVITY.y * tuning.extra_gravity_scale * DT;
        assert!((falling.velocity.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_other_players_are_not_ground() {
        let tuning = Tuning::default();
        let mut world = FlatGround::new(-100.0, Vec2::ZERO);
        let below = Body::player(EntityId(1), Vec3::new(0.0, 0.0, 0.0));
        let mut above = Body::player(EntityId(2), Vec3::new(0.0, 1.0, 0.0));
        world.sync([&below, &above]);
        assert!(!is_grounded(&above, &world, &tuning));

        // A ball underneath does count
        let ball = Body::ball(EntityId(3), Vec3::new(0.0, 0.0, 0.0));
        world.sync([&ball, &above]);
        assert!(apply_extra_gravity(&mut above, &world, &tuning, DT));
    }

    #[test]
    fn test_fell_out() {
        let tuning = Tuning::default();
        let mut body = Body::player(EntityId(1), Vec3::new(0.0, -14.9, 0.0));
        assert!(!fell_out(&body, &tuning));
        body.position.y = -15.1;
        assert!(fell_out(&body, &tuning));
    }

    #[test]
    fn test_presentation_dust_threshold() {
        let tuning = Tuning::default();
        let mut body = Body::player(EntityId(1), Vec3::ZERO);
        body.velocity = Vec3::new(0.5, 0.0, 0.0);
        assert!(!presentation(&body, &tuning).dust);
        body.velocity = Vec3::new(2.0, 0.0, 0.0);
        let p = presentation(&body, &tuning);
        assert!(p.dust);
        assert!((p.walk_speed - 2.0).abs() < 1e-6);
    }
}
