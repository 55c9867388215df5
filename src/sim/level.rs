//! One running level: the context object every gameplay system lives in
//!
//! The level owns the session, the herd, the camera, the puzzle sensors, the
//! timer queue and the observer registry. Dropping it tears all of them down
//! together, so no handler can outlive the level it listens to.
//!
//! Per frame the host calls, in order:
//! 1. `update` once with the real frame delta (pause key, gravity, death,
//!    camera, curtain, timers)
//! 2. `fixed_update` for every fixed step of game time (herd movement,
//!    platforms)
//! 3. the overlap/contact entry points for whatever its physics reported

use std::collections::{BTreeMap, BTreeSet};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::events::{
    AnimTrigger, Effect, EventBus, Foot, GameEvent, SceneRequest, Signal, SignalSource, SoundCue, Subscription,
};
use super::heading::compute_heading;
use super::locomotion;
use super::physics::{PhysicsQuery, SensorVolume};
use super::puzzle::{Aggregator, FinishOutcome, Sensor, SensorKind};
use super::roster::Roster;
use super::session::Session;
use super::state::{AggregatorId, Body, BodyPresentation, EntityId, SensorId, Tag};
use super::timer::{Clock, TimeBase, TimerQueue};
use crate::error::{GameError, Result};
use crate::move_towards;
use crate::tuning::Tuning;
use crate::ui::{Curtain, GameMenu, MenuButton};

/// Input commands for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement stick / WASD
    pub movement: Vec2,
    /// Camera pan (left/right arrows)
    pub camera: Vec2,
    /// Pause key pressed this frame
    pub pause: bool,
}

/// Where a wired signal goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireTarget {
    /// Counts toward an aggregator
    Aggregator(AggregatorId),
    /// Host-side action such as opening a gate
    Hook(String),
}

/// Designer connection from a signal to a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub from: SignalSource,
    pub signal: Signal,
    pub to: WireTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    SceneSwap,
    ShowWinMenu,
}

pub struct Level {
    name: String,
    tuning: Tuning,
    clock: Clock,
    session: Session,
    roster: Roster,
    bodies: BTreeMap<EntityId, Body>,
    camera: CameraRig,
    sensors: BTreeMap<SensorId, Sensor>,
    /// (sensor, entity) overlaps entered and not yet exited
    occupants: BTreeSet<(SensorId, EntityId)>,
    aggregators: BTreeMap<AggregatorId, Aggregator>,
    wires: Vec<Wire>,
    timers: TimerQueue<Deferred>,
    bus: EventBus,
    effects: Vec<Effect>,
    menu: GameMenu,
    curtain: Curtain,
    scene_request: Option<SceneRequest>,
}

impl Level {
    pub fn new(name: impl Into<String>, tuning: Tuning, camera_position: Vec3, camera_yaw: f32) -> Self {
        let name = name.into();
        let mut curtain = Curtain::new(1.0);
        curtain.fade_to(0.0, tuning.level_fade_secs);
        Self {
            session: Session::new(name.clone()),
            camera: CameraRig::new(camera_position, camera_yaw, &tuning),
            name,
            tuning,
            clock: Clock::default(),
            roster: Roster::new(),
            bodies: BTreeMap::new(),
            sensors: BTreeMap::new(),
            occupants: BTreeSet::new(),
            aggregators: BTreeMap::new(),
            wires: Vec::new(),
            timers: TimerQueue::new(),
            bus: EventBus::new(),
            effects: Vec::new(),
            menu: GameMenu::new(),
            curtain,
            scene_request: None,
        }
    }

    // === Construction ===

    /// Spawn a player character and add it to the herd
    pub fn add_player(&mut self, body: Body) -> Result<()> {
        let id = body.id;
        self.add_body(body)?;
        self.roster.add(id);
        Ok(())
    }

    /// Spawn a non-player body (ball, crate)
    pub fn add_prop(&mut self, body: Body) -> Result<()> {
        self.add_body(body)
    }

    fn add_body(&mut self, body: Body) -> Result<()> {
        if self.bodies.contains_key(&body.id) {
            return Err(GameError::DuplicateEntity(body.id));
        }
        self.bodies.insert(body.id, body);
        Ok(())
    }

    /// Remove a body from the level and the herd
    ///
    /// Every sensor the body is still inside sees it leave first, so held
    /// switches release and finish counts drop. The herd may then already
    /// be complete at a finish point.
    pub fn despawn(&mut self, id: EntityId) -> Option<Body> {
        let inside: Vec<SensorId> = self
            .occupants
            .iter()
            .filter(|(_, entity)| *entity == id)
            .map(|(sensor, _)| *sensor)
            .collect();
        for sensor in inside {
            self.overlap_exit(sensor, id);
        }
        self.roster.remove(id);
        for sensor in self.sensors.values_mut() {
            if let SensorKind::Platform(platform) = &mut sensor.kind {
                platform.drop_rider(id);
            }
        }
        let body = self.bodies.remove(&id);
        if body.is_some() {
            log::debug!("Despawned {:?}, herd of {}", id, self.roster.len());
            self.check_finish();
        }
        body
    }

    /// Declare victory if a finish point already holds the whole herd
    fn check_finish(&mut self) {
        if self.session.is_game_over() {
            return;
        }
        let herd = self.roster.len();
        let complete = self.sensors.values().any(|sensor| match &sensor.kind {
            SensorKind::Finish(finish) => finish.holds_herd(herd),
            _ => false,
        });
        if complete {
            self.handle(GameEvent::Victory);
        }
    }

    pub fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        if self.sensors.contains_key(&sensor.id) {
            return Err(GameError::DuplicateSensor(sensor.id));
        }
        if let SensorKind::Finish(finish) = &sensor.kind {
            if let Some(next) = &finish.next_level {
                self.session.set_next_level(next.clone());
            }
        }
        self.sensors.insert(sensor.id, sensor);
        Ok(())
    }

    pub fn add_aggregator(&mut self, id: AggregatorId, aggregator: Aggregator) -> Result<()> {
        if self.aggregators.contains_key(&id) {
            return Err(GameError::DuplicateAggregator(id));
        }
        self.aggregators.insert(id, aggregator);
        Ok(())
    }

    /// Connect a signal to a target; both ends must already exist
    pub fn add_wire(&mut self, wire: Wire) -> Result<()> {
        match wire.from {
            SignalSource::Sensor(id) if !self.sensors.contains_key(&id) => {
                return Err(GameError::UnknownSensor(id));
            }
            SignalSource::Aggregator(id) if !self.aggregators.contains_key(&id) => {
                return Err(GameError::UnknownAggregator(id));
            }
            _ => {}
        }
        if let WireTarget::Aggregator(id) = &wire.to {
            if !self.aggregators.contains_key(id) {
                return Err(GameError::UnknownAggregator(*id));
            }
        }
        self.wires.push(wire);
        Ok(())
    }

    /// Announce the level to subscribers
    pub fn start(&mut self) {
        log::info!(
            "Level '{}' started: {} players, {} sensors",
            self.name,
            self.roster.len(),
            self.sensors.len()
        );
        self.handle(GameEvent::LevelStarted { name: self.name.clone() });
    }

    /// Listen to this level's notifications until the guard is dropped
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.bus.subscribe(handler)
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn menu(&self) -> &GameMenu {
        &self.menu
    }

    pub fn curtain(&self) -> &Curtain {
        &self.curtain
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.values_mut()
    }

    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(&id)
    }

    pub fn aggregator(&self, id: AggregatorId) -> Option<&Aggregator> {
        self.aggregators.get(&id)
    }

    /// Positions of the herd, in roster order
    pub fn herd_positions(&self) -> Vec<Vec3> {
        self.roster
            .iter()
            .filter_map(|id| self.bodies.get(&id))
            .map(|b| b.position)
            .collect()
    }

    /// Where the finish point is, if the level has one
    pub fn finish_position(&self) -> Option<Vec3> {
        self.sensors
            .values()
            .find(|s| matches!(s.kind, SensorKind::Finish(_)))
            .map(|s| s.position)
    }

    /// Sensor shapes for a proximity-based overlap detector
    pub fn sensor_volumes(&self) -> Vec<SensorVolume> {
        self.sensors
            .values()
            .map(|s| SensorVolume {
                id: s.id,
                center: s.center(),
                radius: s.radius,
                solid: s.is_solid(),
            })
            .collect()
    }

    pub fn presentation(&self, id: EntityId) -> Option<BodyPresentation> {
        self.bodies.get(&id).map(|b| locomotion::presentation(b, &self.tuning))
    }

    /// Take every effect queued since the last call
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Scene swap ready to perform, once the fade-out has finished
    pub fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.scene_request.take()
    }

    // === Session commands ===

    /// Toggle pause. Returns false when refused.
    pub fn pause(&mut self) -> bool {
        let Some(event) = self.session.pause() else {
            return false;
        };
        self.clock.time_scale = self.session.time_scale();
        self.handle(event);
        true
    }

    pub fn load_level(&mut self, name: &str) -> bool {
        let request = self.session.load_level(name);
        self.begin_transition(request)
    }

    pub fn load_current_level(&mut self) -> bool {
        let request = self.session.load_current_level();
        self.begin_transition(request)
    }

    pub fn load_next_level(&mut self) -> bool {
        let request = self.session.load_next_level();
        self.begin_transition(request)
    }

    pub fn quit(&mut self) -> bool {
        let request = self.session.quit();
        self.begin_transition(request)
    }

    fn begin_transition(&mut self, request: Option<SceneRequest>) -> bool {
        let Some(request) = request else {
            return false;
        };
        self.curtain.fade_to(1.0, self.tuning.level_fade_secs);
        self.timers
            .schedule(&self.clock, TimeBase::Real, self.tuning.level_fade_secs, Deferred::SceneSwap);
        self.handle(GameEvent::TransitionStarted { request });
        true
    }

    /// A menu button was clicked. Returns false if the click was ignored.
    pub fn press(&mut self, button: MenuButton) -> bool {
        if !self.session.ui_gate.is_enabled() {
            log::debug!("{:?} ignored, UI disabled", button);
            return false;
        }
        if !self.menu.accepts(button) {
            log::debug!("{:?} ignored, not on screen", button);
            return false;
        }
        match button {
            MenuButton::Pause | MenuButton::Continue => self.pause(),
            MenuButton::Restart | MenuButton::PlayAgain | MenuButton::Retry => self.load_current_level(),
            MenuButton::Next => self.load_next_level(),
            MenuButton::Quit => self.quit(),
        }
    }

    // === Per-frame ===

    /// Frame update with the real delta. Returns the game-time delta.
    pub fn update(&mut self, input: &TickInput, physics: &dyn PhysicsQuery, real_dt: f32) -> f32 {
        if input.pause && self.session.pause_gate.is_enabled() {
            self.pause();
        }
        let dt = self.clock.advance(real_dt);
        self.camera.set_pan_input(input.camera);

        let mut fallen = None;
        for id in self.roster.iter() {
            if let Some(body) = self.bodies.get_mut(&id) {
                locomotion::apply_extra_gravity(body, physics, &self.tuning, dt);
                if fallen.is_none() && locomotion::fell_out(body, &self.tuning) {
                    fallen = Some(id);
                }
            }
        }
        if let Some(entity) = fallen {
            if !self.session.is_game_over() {
                self.handle(GameEvent::PlayerDied { entity });
            }
        }

        if dt > 0.0 {
            for sensor in self.sensors.values() {
                if let SensorKind::Goal(goal) = &sensor.kind {
                    if let Some(body) = goal.captured().and_then(|id| self.bodies.get_mut(&id)) {
                        body.position = move_towards(body.position, goal.position, self.tuning.goal_snap_step);
                    }
                }
            }
        }

        let herd = self.herd_positions();
        self.camera.update(&herd, &self.tuning, dt);
        self.curtain.update(real_dt);

        for action in self.timers.take_due(&self.clock) {
            match action {
                Deferred::SceneSwap => self.scene_request = self.session.pending_transition().cloned(),
                Deferred::ShowWinMenu => self.menu.show_win(),
            }
        }
        dt
    }

    /// One fixed step of game time
    pub fn fixed_update(&mut self, input: &TickInput, dt: f32) {
        for sensor in self.sensors.values_mut() {
            if let SensorKind::Platform(platform) = &mut sensor.kind {
                let delta = platform.advance(dt);
                if delta != Vec3::ZERO {
                    for rider in platform.riders() {
                        if let Some(body) = self.bodies.get_mut(&rider) {
                            body.position += delta;
                        }
                    }
                }
            }
        }

        if self.session.is_game_over() {
            return;
        }
        let movement = self.session.movement_gate.filter(input.movement);
        let heading = compute_heading(self.camera.forward(), movement);
        for id in self.roster.iter() {
            if let Some(body) = self.bodies.get_mut(&id) {
                locomotion::rotate_and_move(body, heading, &self.tuning, dt);
            }
        }
    }

    // === Physics notifications ===

    pub fn overlap_enter(&mut self, sensor_id: SensorId, entity: EntityId) {
        let Some(tag) = self.bodies.get(&entity).map(|b| b.tag) else {
            log::debug!("Overlap from unknown entity {:?}", entity);
            return;
        };
        let herd = self.roster.len();
        let game_over = self.session.is_game_over();
        let Some(sensor) = self.sensors.get_mut(&sensor_id) else {
            log::debug!("Overlap on unknown sensor {:?}", sensor_id);
            return;
        };
        self.occupants.insert((sensor_id, entity));
        let at = sensor.position;

        let mut signal = None;
        let mut captured = false;
        let mut victory = false;
        match &mut sensor.kind {
            SensorKind::Trigger(trigger) => signal = trigger.on_overlap_enter(tag),
            SensorKind::Switch(switch) => {
                signal = switch.on_enter(tag);
                if signal.is_some() {
                    self.effects.push(Effect::Animate {
                        sensor: sensor_id,
                        trigger: AnimTrigger::Down,
                    });
                    self.effects.push(Effect::Sound(SoundCue::Switch(sensor_id)));
                }
            }
            SensorKind::Goal(goal) => {
                signal = goal.on_enter(entity, tag);
                if signal.is_some() {
                    captured = true;
                    self.effects.push(Effect::Particles { sensor: sensor_id, at });
                    self.effects.push(Effect::Sound(SoundCue::Score(sensor_id)));
                }
            }
            SensorKind::Finish(finish) => {
                let outcome = finish.on_enter(tag, herd, game_over);
                if outcome != FinishOutcome::Ignored {
                    self.effects.push(Effect::Particles { sensor: sensor_id, at });
                    self.effects.push(Effect::Sound(SoundCue::Score(sensor_id)));
                }
                victory = outcome == FinishOutcome::AllArrived;
            }
            SensorKind::Platform(_) => {}
        }

        if captured {
            if let Some(body) = self.bodies.get_mut(&entity) {
                body.kinematic = true;
                body.velocity = Vec3::ZERO;
                body.angular_velocity = Vec3::ZERO;
            }
        }
        if let Some(signal) = signal {
            self.route_signal(SignalSource::Sensor(sensor_id), signal);
        }
        if victory {
            self.handle(GameEvent::Victory);
        }
    }

    pub fn overlap_exit(&mut self, sensor_id: SensorId, entity: EntityId) {
        self.occupants.remove(&(sensor_id, entity));
        let Some(tag) = self.bodies.get(&entity).map(|b| b.tag) else {
            return;
        };
        let Some(sensor) = self.sensors.get_mut(&sensor_id) else {
            return;
        };
        let mut signal = None;
        match &mut sensor.kind {
            SensorKind::Switch(switch) => {
                signal = switch.on_exit(tag);
                if signal.is_some() {
                    self.effects.push(Effect::Sound(SoundCue::Switch(sensor_id)));
                    self.effects.push(Effect::Animate {
                        sensor: sensor_id,
                        trigger: AnimTrigger::Up,
                    });
                }
            }
            SensorKind::Finish(finish) => finish.on_exit(tag),
            _ => {}
        }
        if let Some(signal) = signal {
            self.route_signal(SignalSource::Sensor(sensor_id), signal);
        }
    }

    pub fn contact_begin(&mut self, sensor_id: SensorId, entity: EntityId) {
        let Some((tag, y)) = self.bodies.get(&entity).map(|b| (b.tag, b.position.y)) else {
            return;
        };
        self.body_collision(entity);
        let Some(sensor) = self.sensors.get_mut(&sensor_id) else {
            return;
        };
        let signal = match &mut sensor.kind {
            SensorKind::Trigger(trigger) => trigger.on_contact_begin(tag),
            SensorKind::Platform(platform) => {
                if platform.on_contact_begin(entity, tag, y) {
                    log::debug!("{:?} boarded platform {:?}", entity, sensor_id);
                }
                None
            }
            _ => None,
        };
        if let Some(signal) = signal {
            self.route_signal(SignalSource::Sensor(sensor_id), signal);
        }
    }

    pub fn contact_end(&mut self, sensor_id: SensorId, entity: EntityId) {
        let Some(tag) = self.bodies.get(&entity).map(|b| b.tag) else {
            return;
        };
        if let Some(SensorKind::Platform(platform)) = self.sensors.get_mut(&sensor_id).map(|s| &mut s.kind) {
            platform.on_contact_end(entity, tag);
        }
    }

    /// Any solid collision of a body; fast players make an impact sound
    pub fn body_collision(&mut self, entity: EntityId) {
        if let Some(body) = self.bodies.get(&entity) {
            if body.tag == Tag::Player && locomotion::is_hard_contact(body, &self.tuning) {
                self.effects.push(Effect::Sound(SoundCue::Impact(entity)));
            }
        }
    }

    /// Named event from a character's animation clip
    pub fn animation_event(&mut self, entity: EntityId, name: &str) {
        let foot = match name {
            "FootL" => Foot::Left,
            "FootR" => Foot::Right,
            _ => {
                log::debug!("Unhandled animation event '{}'", name);
                return;
            }
        };
        self.effects.push(Effect::Sound(SoundCue::Footstep(entity, foot)));
    }

    // === Internals ===

    fn route_signal(&mut self, source: SignalSource, signal: Signal) {
        self.handle(GameEvent::Signal { source, signal });
        let targets: Vec<WireTarget> = self
            .wires
            .iter()
            .filter(|w| w.from == source && w.signal == signal)
            .map(|w| w.to.clone())
            .collect();
        for target in targets {
            match target {
                WireTarget::Aggregator(id) => {
                    let completed = self.aggregators.get_mut(&id).and_then(|a| a.signal());
                    if let Some(signal) = completed {
                        self.route_signal(SignalSource::Aggregator(id), signal);
                    }
                }
                WireTarget::Hook(name) => {
                    log::debug!("Hook '{}' from {:?}", name, source);
                    self.effects.push(Effect::Hook(name));
                }
            }
        }
    }

    /// Apply a notification to the owned systems, then publish it
    fn handle(&mut self, event: GameEvent) {
        match &event {
            GameEvent::PlayerDied { entity } => {
                if !self.session.on_player_death() {
                    return;
                }
                log::info!("{:?} fell out of '{}'", entity, self.name);
                self.roster.clear();
                self.menu.on_player_death();
            }
            GameEvent::Victory => {
                if !self.session.on_victory() {
                    return;
                }
                self.camera.on_victory();
                self.timers.schedule(
                    &self.clock,
                    TimeBase::Scaled,
                    self.tuning.win_menu_delay_secs,
                    Deferred::ShowWinMenu,
                );
            }
            GameEvent::Paused => self.menu.on_pause(),
            GameEvent::Resumed => self.menu.on_resume(),
            _ => {}
        }
        self.bus.publish(&event);
    }
}

impl Drop for Level {
    fn drop(&mut self) {
        log::info!(
            "Level '{}' torn down, releasing {} subscribers",
            self.name,
            self.bus.subscriber_count()
        );
    }
}
