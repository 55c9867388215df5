//! Gameplay notifications, presentation effects and the observer registry
//!
//! Notifications (`GameEvent`) are published on the level's `EventBus`.
//! Effects are fire-and-forget commands for the host's audio, particle and
//! animation systems.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{AggregatorId, EntityId, SensorId};

/// Where to go when a scene transition finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneRequest {
    /// Load the named scene
    Load(String),
    /// Shut the game down
    Quit,
}

/// A puzzle signal emitted by a sensor or an aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// A trigger saw a qualifying overlap or contact
    Fired,
    /// A switch went down
    Pressed,
    /// A holdable switch came back up
    Released,
    /// A goal captured its object
    Scored,
    /// An aggregator reached its target
    Completed,
}

/// Origin of a puzzle signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalSource {
    Sensor(SensorId),
    Aggregator(AggregatorId),
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelStarted { name: String },
    Paused,
    Resumed,
    PlayerDied { entity: EntityId },
    Victory,
    TransitionStarted { request: SceneRequest },
    Signal { source: SignalSource, signal: Signal },
}

/// Which foot an animation event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foot {
    Left,
    Right,
}

/// Sound cues the host maps to clips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Switch(SensorId),
    Score(SensorId),
    Impact(EntityId),
    Footstep(EntityId, Foot),
}

/// Animator triggers on sensor props
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimTrigger {
    Down,
    Up,
}

/// Fire-and-forget presentation command
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Sound(SoundCue),
    Particles { sensor: SensorId, at: Vec3 },
    Animate { sensor: SensorId, trigger: AnimTrigger },
    /// A designer-wired host hook, e.g. "open_gate"
    Hook(String),
}

type Handler = Box<dyn FnMut(&GameEvent)>;

struct Slot {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    slots: RefCell<Vec<Slot>>,
    /// Subscriptions added while a dispatch held `slots`
    pending: RefCell<Vec<Slot>>,
    /// Subscriptions dropped while a dispatch held `slots`
    dead: RefCell<Vec<u64>>,
    next_id: Cell<u64>,
}

impl Registry {
    fn remove(&self, id: u64) {
        match self.slots.try_borrow_mut() {
            Ok(mut slots) => slots.retain(|s| s.id != id),
            Err(_) => self.dead.borrow_mut().push(id),
        }
        self.pending.borrow_mut().retain(|s| s.id != id);
    }

    fn settle(&self) {
        let mut slots = self.slots.borrow_mut();
        let dead: Vec<u64> = self.dead.borrow_mut().drain(..).collect();
        if !dead.is_empty() {
            slots.retain(|s| !dead.contains(&s.id));
        }
        slots.append(&mut self.pending.borrow_mut());
    }
}

/// Observer registry scoped to one level.
///
/// Handlers live exactly as long as their `Subscription` guard and never
/// outlive the bus that holds them.
pub struct EventBus {
    registry: Rc<Registry>,
}

/// Keeps a handler registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry::default()),
        }
    }

    /// Register a handler. Subscribing from inside a handler takes effect
    /// on the next publish.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        let slot = Slot {
            id,
            handler: Box::new(handler),
        };
        match self.registry.slots.try_borrow_mut() {
            Ok(mut slots) => slots.push(slot),
            Err(_) => self.registry.pending.borrow_mut().push(slot),
        }
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver an event to every live subscriber, in subscription order
    pub fn publish(&self, event: &GameEvent) {
        {
            let Ok(mut slots) = self.registry.slots.try_borrow_mut() else {
                log::warn!("Nested publish of {:?} dropped", event);
                return;
            };
            for slot in slots.iter_mut() {
                if self.registry.dead.borrow().contains(&slot.id) {
                    continue;
                }
                (slot.handler)(event);
            }
        }
        self.registry.settle();
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        let dead = self.registry.dead.borrow();
        let live = self
            .registry
            .slots
            .try_borrow()
            .map(|slots| slots.iter().filter(|s| !dead.contains(&s.id)).count())
            .unwrap_or(0);
        live + self.registry.pending.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscribers() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        bus.publish(&GameEvent::Paused);
        bus.publish(&GameEvent::Resumed);
        assert_eq!(*seen.borrow(), vec![GameEvent::Paused, GameEvent::Resumed]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = bus.subscribe(move |_| c.set(c.get() + 1));
        bus.publish(&GameEvent::Victory);
        drop(sub);
        bus.publish(&GameEvent::Victory);
        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let bus = EventBus::new();
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let h = holder.clone();
        let c = count.clone();
        let sub = bus.subscribe(move |_| {
            c.set(c.get() + 1);
            // Handler drops its own registration
            h.borrow_mut().take();
        });
        *holder.borrow_mut() = Some(sub);

        bus.publish(&GameEvent::Paused);
        bus.publish(&GameEvent::Paused);
        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
