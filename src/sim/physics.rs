//! Physics collaborator interface and a flat-ground reference world
//!
//! Gameplay only needs spatial queries and overlap notifications from the
//! host. `FlatGround` and `OverlapTracker` provide both for headless runs;
//! they are deliberately crude (spheres over a rectangular floor).

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};

use super::state::{Body, EntityId, SensorId, Tag};
use crate::consts::GRAVITY;

/// One hit reported by a sweep query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// `None` for static level geometry
    pub entity: Option<EntityId>,
    pub tag: Tag,
    /// Distance travelled along the sweep before contact
    pub distance: f32,
}

/// Spatial queries supplied by the host physics
pub trait PhysicsQuery {
    /// Sweep a sphere from `origin` along `direction` and report every hit,
    /// including colliders the sphere starts inside (distance 0)
    fn sphere_cast_all(&self, origin: Vec3, radius: f32, direction: Vec3, distance: f32) -> Vec<CastHit>;
}

/// A world with no geometry at all
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl PhysicsQuery for EmptyWorld {
    fn sphere_cast_all(&self, _: Vec3, _: f32, _: Vec3, _: f32) -> Vec<CastHit> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct Collider {
    id: EntityId,
    tag: Tag,
    center: Vec3,
    radius: f32,
}

/// Rectangular floor plus sphere colliders for every body
#[derive(Debug, Clone)]
pub struct FlatGround {
    /// Floor height
    pub height: f32,
    /// Floor half-size on x/z, centered at the origin
    pub half_extent: Vec2,
    /// Horizontal velocity damping per second
    pub drag: f32,
    colliders: Vec<Collider>,
}

impl FlatGround {
    pub fn new(height: f32, half_extent: Vec2) -> Self {
        Self {
            height,
            half_extent,
            drag: 2.0,
            colliders: Vec::new(),
        }
    }

    /// Whether a horizontal position is over the floor
    pub fn covers(&self, pos: Vec3) -> bool {
        pos.x.abs() <= self.half_extent.x && pos.z.abs() <= self.half_extent.y
    }

    /// Refresh body colliders used by queries
    pub fn sync<'a>(&mut self, bodies: impl IntoIterator<Item = &'a Body>) {
        self.colliders = bodies
            .into_iter()
            .map(|b| Collider {
                id: b.id,
                tag: b.tag,
                center: b.position,
                radius: b.radius,
            })
            .collect();
    }

    /// Integrate bodies by one step: gravity, velocity, floor contact, drag
    pub fn step<'a>(&self, bodies: impl IntoIterator<Item = &'a mut Body>, dt: f32) {
        for body in bodies {
            if body.kinematic {
                continue;
            }
            body.velocity += GRAVITY * dt;
            let damping = 1.0 / (1.0 + self.drag * dt);
            body.velocity.x *= damping;
            body.velocity.z *= damping;
            body.position += body.velocity * dt;

            let floor = self.height + body.radius;
            // Only catch bodies that have not already sunk past the floor
            if self.covers(body.position) && body.position.y < floor && body.position.y > self.height - body.radius {
                body.position.y = floor;
                if body.velocity.y < 0.0 {
                    body.velocity.y = 0.0;
                }
            }
        }
    }

    fn sweep_floor(&self, origin: Vec3, radius: f32, dir: Vec3, max: f32) -> Option<f32> {
        let gap = origin.y - radius - self.height;
        let t = if gap <= 0.0 {
            if origin.y + radius < self.height {
                return None;
            }
            0.0
        } else if dir.y < 0.0 {
            gap / -dir.y
        } else {
            return None;
        };
        if t > max {
            return None;
        }
        self.covers(origin + dir * t).then_some(t)
    }
}

/// Distance along `dir` at which a sphere of `radius` touches a sphere
/// (`center`, `other_radius`), if within `max`
fn sweep_sphere(origin: Vec3, radius: f32, dir: Vec3, max: f32, center: Vec3, other_radius: f32) -> Option<f32> {
    let r = radius + other_radius;
    let m = origin - center;
    let c = m.length_squared() - r * r;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t <= max).then_some(t.max(0.0))
}

impl PhysicsQuery for FlatGround {
    fn sphere_cast_all(&self, origin: Vec3, radius: f32, direction: Vec3, distance: f32) -> Vec<CastHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec::new();
        }
        let mut hits = Vec::new();
        if let Some(d) = self.sweep_floor(origin, radius, dir, distance) {
            hits.push(CastHit {
                entity: None,
                tag: Tag::Untagged,
                distance: d,
            });
        }
        for c in &self.colliders {
            if let Some(d) = sweep_sphere(origin, radius, dir, distance, c.center, c.radius) {
                hits.push(CastHit {
                    entity: Some(c.id),
                    tag: c.tag,
                    distance: d,
                });
            }
        }
        hits
    }
}

/// A sensor as a sphere, for proximity detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorVolume {
    pub id: SensorId,
    pub center: Vec3,
    pub radius: f32,
    /// Solid sensors report contacts instead of overlaps
    pub solid: bool,
}

/// Begin/end of a sensor-body intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapChange {
    pub sensor: SensorId,
    pub entity: EntityId,
    pub entered: bool,
}

/// Turns per-tick proximity into enter/exit notifications
#[derive(Debug, Clone, Default)]
pub struct OverlapTracker {
    inside: BTreeSet<(SensorId, EntityId)>,
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare current intersections against the previous call.
    /// Exits are reported before enters, each in (sensor, entity) order.
    pub fn update<'a>(
        &mut self,
        sensors: &[SensorVolume],
        bodies: impl IntoIterator<Item = &'a Body>,
    ) -> Vec<OverlapChange> {
        let bodies: Vec<&Body> = bodies.into_iter().collect();
        let mut now = BTreeSet::new();
        for sensor in sensors {
            for body in &bodies {
                if sensor.center.distance(body.position) <= sensor.radius + body.radius {
                    now.insert((sensor.id, body.id));
                }
            }
        }

        let mut changes: Vec<OverlapChange> = self
            .inside
            .difference(&now)
            .map(|&(sensor, entity)| OverlapChange {
                sensor,
                entity,
                entered: false,
            })
            .collect();
        changes.extend(now.difference(&self.inside).map(|&(sensor, entity)| OverlapChange {
            sensor,
            entity,
            entered: true,
        }));
        self.inside = now;
        changes
    }

    /// Forget an entity (despawned); no exit is reported
    pub fn forget(&mut self, entity: EntityId) {
        self.inside.retain(|&(_, e)| e != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> FlatGround {
        FlatGround::new(0.0, Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_floor_hit_below() {
        let world = floor();
        let hits = world.sphere_cast_all(Vec3::new(0.0, 1.0, 0.0), 0.5, Vec3::NEG_Y, 1.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 0.5).abs() < 1e-5);
        assert_eq!(hits[0].tag, Tag::Untagged);
    }

    #[test]
    fn test_floor_out_of_reach() {
        let world = floor();
        assert!(world.sphere_cast_all(Vec3::new(0.0, 5.0, 0.0), 0.5, Vec3::NEG_Y, 1.0).is_empty());
        // Off the edge
        assert!(world.sphere_cast_all(Vec3::new(20.0, 1.0, 0.0), 0.5, Vec3::NEG_Y, 1.0).is_empty());
    }

    #[test]
    fn test_cast_reports_overlapping_bodies() {
        let mut world = FlatGround::new(-100.0, Vec2::ZERO);
        let body = Body::player(EntityId(1), Vec3::new(0.0, 0.5, 0.0));
        world.sync([&body]);
        let hits = world.sphere_cast_all(Vec3::new(0.0, 0.4, 0.0), 0.5, Vec3::NEG_Y, 1.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, Some(EntityId(1)));
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_step_rests_on_floor() {
        let world = floor();
        let mut body = Body::player(EntityId(1), Vec3::new(0.0, 2.0, 0.0));
        for _ in 0..200 {
            world.step([&mut body], 0.02);
        }
        assert!((body.position.y - body.radius).abs() < 1e-4);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_step_falls_off_edge() {
        let world = floor();
        let mut body = Body::player(EntityId(1), Vec3::new(15.0, 0.5, 0.0));
        for _ in 0..100 {
            world.step([&mut body], 0.02);
        }
        assert!(body.position.y < -5.0);
    }

    #[test]
    fn test_overlap_tracker_enter_exit() {
        let mut tracker = OverlapTracker::new();
        let sensors = [SensorVolume {
            id: SensorId(7),
            center: Vec3::ZERO,
            radius: 1.0,
            solid: false,
        }];
        let mut body = Body::player(EntityId(1), Vec3::new(5.0, 0.0, 0.0));

        assert!(tracker.update(&sensors, [&body]).is_empty());

        body.position = Vec3::new(1.0, 0.0, 0.0);
        let changes = tracker.update(&sensors, [&body]);
        assert_eq!(
            changes,
            vec![OverlapChange {
                sensor: SensorId(7),
                entity: EntityId(1),
                entered: true
            }]
        );
        // Staying inside reports nothing
        assert!(tracker.update(&sensors, [&body]).is_empty());

        body.position = Vec3::new(5.0, 0.0, 0.0);
        let changes = tracker.update(&sensors, [&body]);
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].entered);
    }
}
