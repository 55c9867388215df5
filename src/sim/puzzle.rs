//! Puzzle building blocks driven by overlap and contact notifications
//!
//! Each primitive is a small state machine. They report signals; the level
//! turns signals into notifications, effects and wired follow-ups.

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::Signal;
use super::state::{EntityId, SensorId, Tag};

/// Which tags a sensor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagFilter {
    Any,
    Only(Tag),
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::Only(Tag::Player)
    }
}

impl TagFilter {
    pub fn accepts(&self, tag: Tag) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Only(t) => *t == tag,
        }
    }
}

/// Stateless sensor: fires on every qualifying overlap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub filter: TagFilter,
    /// Also fire on solid contacts
    #[serde(default)]
    pub on_contact: bool,
}

impl Trigger {
    pub fn on_overlap_enter(&self, tag: Tag) -> Option<Signal> {
        self.filter.accepts(tag).then_some(Signal::Fired)
    }

    pub fn on_contact_begin(&self, tag: Tag) -> Option<Signal> {
        (self.on_contact && self.filter.accepts(tag)).then_some(Signal::Fired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchKind {
    /// Stays down after the first press
    #[default]
    Momentary,
    /// Down only while something stands on it
    Holdable,
}

/// Pressure plate for player characters
#[derive(Debug, Clone, Default)]
pub struct Switch {
    pub kind: SwitchKind,
    /// Bodies standing on a holdable switch
    occupancy: u32,
    activated: bool,
}

impl Switch {
    pub fn new(kind: SwitchKind) -> Self {
        Self {
            kind,
            occupancy: 0,
            activated: false,
        }
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn on_enter(&mut self, tag: Tag) -> Option<Signal> {
        if tag != Tag::Player {
            return None;
        }
        match self.kind {
            SwitchKind::Momentary => {
                if self.activated {
                    return None;
                }
                self.activated = true;
                Some(Signal::Pressed)
            }
            SwitchKind::Holdable => {
                self.occupancy += 1;
                if self.occupancy == 1 {
                    self.activated = true;
                    Some(Signal::Pressed)
                } else {
                    None
                }
            }
        }
    }

    pub fn on_exit(&mut self, tag: Tag) -> Option<Signal> {
        if tag != Tag::Player || self.kind != SwitchKind::Holdable || self.occupancy == 0 {
            return None;
        }
        self.occupancy -= 1;
        if self.occupancy == 0 {
            self.activated = false;
            Some(Signal::Released)
        } else {
            None
        }
    }
}

/// One-shot hole that captures the first ball dropped into it
#[derive(Debug, Clone)]
pub struct Goal {
    pub position: Vec3,
    pub filter: TagFilter,
    captured: Option<EntityId>,
}

impl Goal {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            filter: TagFilter::Only(Tag::Ball),
            captured: None,
        }
    }

    pub fn captured(&self) -> Option<EntityId> {
        self.captured
    }

    pub fn has_scored(&self) -> bool {
        self.captured.is_some()
    }

    /// Latch onto the first qualifying entity
    pub fn on_enter(&mut self, entity: EntityId, tag: Tag) -> Option<Signal> {
        if self.captured.is_some() || !self.filter.accepts(tag) {
            return None;
        }
        self.captured = Some(entity);
        Some(Signal::Scored)
    }
}

/// Counts incoming signals and completes once at the target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregator {
    pub target: u32,
    count: u32,
}

impl Aggregator {
    pub fn new(target: u32) -> Self {
        Self { target, count: 0 }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.target
    }

    /// Count one signal. Fires on the signal that reaches the target;
    /// signals after that are ignored.
    pub fn signal(&mut self) -> Option<Signal> {
        if self.is_complete() {
            return None;
        }
        self.count += 1;
        self.is_complete().then_some(Signal::Completed)
    }
}

/// What happened when a player entered the finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    Ignored,
    Arrived,
    /// Every player is inside
    AllArrived,
}

/// Pit at the end of the level; the level is won when the whole herd is in
#[derive(Debug, Clone, Default)]
pub struct FinishPoint {
    pub next_level: Option<String>,
    inside: u32,
}

impl FinishPoint {
    pub fn new(next_level: Option<String>) -> Self {
        Self { next_level, inside: 0 }
    }

    pub fn inside(&self) -> u32 {
        self.inside
    }

    pub fn on_enter(&mut self, tag: Tag, herd_size: usize, game_over: bool) -> FinishOutcome {
        if game_over || tag != Tag::Player {
            return FinishOutcome::Ignored;
        }
        self.inside += 1;
        if self.inside as usize >= herd_size {
            FinishOutcome::AllArrived
        } else {
            FinishOutcome::Arrived
        }
    }

    pub fn on_exit(&mut self, tag: Tag) {
        if tag == Tag::Player {
            self.inside = self.inside.saturating_sub(1);
        }
    }

    /// Every remaining herd member is inside
    pub fn holds_herd(&self, herd_size: usize) -> bool {
        self.inside > 0 && self.inside as usize >= herd_size
    }
}

/// Back-and-forth motion between two points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingPong {
    pub from: Vec3,
    pub to: Vec3,
    /// Units per second
    pub speed: f32,
    #[serde(skip)]
    progress: f32,
    #[serde(skip)]
    returning: bool,
}

impl PingPong {
    pub fn new(from: Vec3, to: Vec3, speed: f32) -> Self {
        Self {
            from,
            to,
            speed,
            progress: 0.0,
            returning: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.from.lerp(self.to, self.progress)
    }

    /// Advance and return the new position
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        let length = self.from.distance(self.to);
        if length <= f32::EPSILON {
            return self.from;
        }
        let step = self.speed * dt / length;
        if self.returning {
            self.progress -= step;
            if self.progress <= 0.0 {
                self.progress = -self.progress;
                self.returning = false;
            }
        } else {
            self.progress += step;
            if self.progress >= 1.0 {
                self.progress = 2.0 - self.progress;
                self.returning = true;
            }
        }
        self.progress = self.progress.clamp(0.0, 1.0);
        self.position()
    }
}

/// Platform that carries players standing on top of it
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    pub position: Vec3,
    /// Distance from the platform center to its top surface
    pub half_height: f32,
    pub path: Option<PingPong>,
    riders: BTreeSet<EntityId>,
}

impl MovingPlatform {
    pub fn new(position: Vec3, half_height: f32, path: Option<PingPong>) -> Self {
        let position = path.as_ref().map(|p| p.position()).unwrap_or(position);
        Self {
            position,
            half_height,
            path,
            riders: BTreeSet::new(),
        }
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.half_height
    }

    pub fn riders(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.riders.iter().copied()
    }

    pub fn is_rider(&self, entity: EntityId) -> bool {
        self.riders.contains(&entity)
    }

    /// A player touching from above becomes a rider
    pub fn on_contact_begin(&mut self, entity: EntityId, tag: Tag, entity_y: f32) -> bool {
        tag == Tag::Player && entity_y > self.top() && self.riders.insert(entity)
    }

    pub fn on_contact_end(&mut self, entity: EntityId, tag: Tag) -> bool {
        tag == Tag::Player && self.riders.remove(&entity)
    }

    /// Forget a despawned rider
    pub fn drop_rider(&mut self, entity: EntityId) {
        self.riders.remove(&entity);
    }

    /// Move along the path. Returns the displacement riders must follow.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        let Some(path) = self.path.as_mut() else {
            return Vec3::ZERO;
        };
        let next = path.advance(dt);
        let delta = next - self.position;
        self.position = next;
        delta
    }
}

/// A sensor's behavior
#[derive(Debug, Clone)]
pub enum SensorKind {
    Trigger(Trigger),
    Switch(Switch),
    Goal(Goal),
    Finish(FinishPoint),
    Platform(MovingPlatform),
}

/// A placed sensor volume
#[derive(Debug, Clone)]
pub struct Sensor {
    pub id: SensorId,
    pub position: Vec3,
    pub radius: f32,
    pub kind: SensorKind,
}

impl Sensor {
    /// Platforms are solid and report contacts; everything else overlaps
    pub fn is_solid(&self) -> bool {
        matches!(self.kind, SensorKind::Platform(_))
    }

    /// Current center (platforms move)
    pub fn center(&self) -> Vec3 {
        match &self.kind {
            SensorKind::Platform(p) => p.position,
            _ => self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trigger_filter() {
        let trigger = Trigger::default();
        assert_eq!(trigger.on_overlap_enter(Tag::Player), Some(Signal::Fired));
        assert_eq!(trigger.on_overlap_enter(Tag::Ball), None);
        // Contacts only when enabled
        assert_eq!(trigger.on_contact_begin(Tag::Player), None);

        let any = Trigger {
            filter: TagFilter::Any,
            on_contact: true,
        };
        assert_eq!(any.on_overlap_enter(Tag::Untagged), Some(Signal::Fired));
        assert_eq!(any.on_contact_begin(Tag::Ball), Some(Signal::Fired));
        // Stateless: fires every time
        assert_eq!(any.on_overlap_enter(Tag::Ball), Some(Signal::Fired));
    }

    #[test]
    fn test_momentary_switch_fires_once() {
        let mut switch = Switch::new(SwitchKind::Momentary);
        assert_eq!(switch.on_enter(Tag::Player), Some(Signal::Pressed));
        assert_eq!(switch.on_enter(Tag::Player), None);
        assert_eq!(switch.on_exit(Tag::Player), None);
        assert_eq!(switch.on_exit(Tag::Player), None);
        assert_eq!(switch.on_enter(Tag::Player), None);
        assert!(switch.is_activated());
    }

    #[test]
    fn test_holdable_switch_press_release() {
        let mut switch = Switch::new(SwitchKind::Holdable);
        assert_eq!(switch.on_enter(Tag::Player), Some(Signal::Pressed));
        assert_eq!(switch.on_enter(Tag::Player), None);
        assert_eq!(switch.occupancy(), 2);
        assert_eq!(switch.on_exit(Tag::Player), None);
        assert_eq!(switch.on_exit(Tag::Player), Some(Signal::Released));
        assert_eq!(switch.occupancy(), 0);
        assert!(!switch.is_activated());
        // Stray exit stays at zero and fires nothing
        assert_eq!(switch.on_exit(Tag::Player), None);
        assert_eq!(switch.occupancy(), 0);
        // Non-players are ignored
        assert_eq!(switch.on_enter(Tag::Ball), None);
    }

    #[test]
    fn test_goal_latches_first_ball() {
        let mut goal = Goal::new(Vec3::ZERO);
        assert_eq!(goal.on_enter(EntityId(1), Tag::Player), None);
        assert_eq!(goal.on_enter(EntityId(2), Tag::Ball), Some(Signal::Scored));
        assert_eq!(goal.on_enter(EntityId(3), Tag::Ball), None);
        assert_eq!(goal.on_enter(EntityId(2), Tag::Ball), None);
        assert_eq!(goal.captured(), Some(EntityId(2)));
    }

    #[test]
    fn test_aggregator_fires_on_third() {
        let mut agg = Aggregator::new(3);
        assert_eq!(agg.signal(), None);
        assert_eq!(agg.signal(), None);
        assert_eq!(agg.signal(), Some(Signal::Completed));
        assert_eq!(agg.signal(), None);
        assert_eq!(agg.count(), 3);
    }

    #[test]
    fn test_finish_point_counts_herd() {
        let mut finish = FinishPoint::new(Some("Level_2".into()));
        assert_eq!(finish.on_enter(Tag::Player, 2, false), FinishOutcome::Arrived);
        assert_eq!(finish.on_enter(Tag::Ball, 2, false), FinishOutcome::Ignored);
        assert_eq!(finish.on_enter(Tag::Player, 2, false), FinishOutcome::AllArrived);
        assert_eq!(finish.on_enter(Tag::Player, 2, true), FinishOutcome::Ignored);
        finish.on_exit(Tag::Player);
        finish.on_exit(Tag::Player);
        finish.on_exit(Tag::Player);
        assert_eq!(finish.inside(), 0);
    }

    #[test]
    fn test_finish_point_holds_herd() {
        let mut finish = FinishPoint::new(None);
        assert!(!finish.holds_herd(0));
        finish.on_enter(Tag::Player, 3, false);
        assert!(!finish.holds_herd(2));
        assert!(finish.holds_herd(1));
        finish.on_exit(Tag::Player);
        assert!(!finish.holds_herd(1));
    }

    #[test]
    fn test_platform_riders_from_above_only() {
        let mut platform = MovingPlatform::new(Vec3::ZERO, 0.25, None);
        assert!(!platform.on_contact_begin(EntityId(1), Tag::Player, 0.0));
        assert!(platform.on_contact_begin(EntityId(2), Tag::Player, 0.8));
        assert!(!platform.on_contact_begin(EntityId(3), Tag::Ball, 0.8));
        assert!(platform.is_rider(EntityId(2)));
        assert!(platform.on_contact_end(EntityId(2), Tag::Player));
        assert!(!platform.is_rider(EntityId(2)));
    }

    #[test]
    fn test_ping_pong_reverses() {
        let mut path = PingPong::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 1.0);
        let p = path.advance(1.0);
        assert!((p.x - 1.0).abs() < 1e-5);
        let p = path.advance(1.5);
        assert!((p.x - 1.5).abs() < 1e-5);
        let p = path.advance(1.0);
        assert!((p.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_platform_advance_reports_delta() {
        let path = PingPong::new(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0), 2.0);
        let mut platform = MovingPlatform::new(Vec3::new(9.0, 9.0, 9.0), 0.25, Some(path));
        assert_eq!(platform.position, Vec3::ZERO);
        let delta = platform.advance(0.5);
        assert!((delta - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    proptest! {
        /// Any enter/exit order that nets to zero yields one press and one release
        #[test]
        fn prop_holdable_balanced(players in 1usize..6, seed in any::<u64>()) {
            use rand::{Rng, SeedableRng};
            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            let mut switch = Switch::new(SwitchKind::Holdable);
            let mut outside = players;
            let mut inside = 0usize;
            let mut signals = Vec::new();

            while outside > 0 || inside > 0 {
                let enter = outside > 0 && (inside == 0 || rng.random_bool(0.5));
                let signal = if enter {
                    outside -= 1;
                    inside += 1;
                    switch.on_enter(Tag::Player)
                } else {
                    inside -= 1;
                    switch.on_exit(Tag::Player)
                };
                signals.extend(signal);
                if inside == 0 && outside > 0 {
                    // Occupancy hit zero mid-sequence: a full press/release cycle
                    prop_assert_eq!(signals.last(), Some(&Signal::Released));
                }
            }
            prop_assert_eq!(switch.occupancy(), 0);
            let presses = signals.iter().filter(|s| **s == Signal::Pressed).count();
            let releases = signals.iter().filter(|s| **s == Signal::Released).count();
            prop_assert_eq!(presses, releases);
            prop_assert!(presses >= 1);
        }

        #[test]
        fn prop_aggregator_fires_exactly_once(n in 0u32..20) {
            let mut agg = Aggregator::new(3);
            let fired = (0..n).filter(|_| agg.signal().is_some()).count();
            prop_assert_eq!(fired, if n >= 3 { 1 } else { 0 });
        }
    }
}
