//! Deterministic gameplay module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep for movement, explicit deltas everywhere else
//! - Seeded RNG only
//! - Stable iteration order (by entity/sensor ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod camera;
pub mod events;
pub mod heading;
pub mod level;
pub mod locomotion;
pub mod physics;
pub mod puzzle;
pub mod roster;
pub mod session;
pub mod state;
pub mod timer;

pub use autopilot::Autopilot;
pub use camera::{Bounds, CameraMode, CameraRig, select_mode};
pub use events::{
    AnimTrigger, Effect, EventBus, Foot, GameEvent, SceneRequest, Signal, SignalSource, SoundCue,
    Subscription,
};
pub use heading::{InputGate, compute_heading};
pub use level::{Level, TickInput, Wire, WireTarget};
pub use physics::{CastHit, EmptyWorld, FlatGround, OverlapChange, OverlapTracker, PhysicsQuery, SensorVolume};
pub use puzzle::{
    Aggregator, FinishOutcome, FinishPoint, Goal, MovingPlatform, PingPong, Sensor, SensorKind,
    Switch, SwitchKind, TagFilter, Trigger,
};
pub use roster::Roster;
pub use session::{Session, SessionPhase};
pub use state::{AggregatorId, Body, BodyPresentation, EntityId, SensorId, Tag};
pub use timer::{Clock, TimeBase, TimerId, TimerQueue};
