//! Deferred actions
//!
//! Timed sequences (curtain fades, delayed menus) schedule an action with a
//! due time. The level drains due actions at update boundaries.

/// Which clock a timer runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    /// Wall-clock time, unaffected by pause
    Real,
    /// Game time, frozen while paused
    Scaled,
}

/// Real and scaled time for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    pub real: f64,
    pub scaled: f64,
    pub time_scale: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            real: 0.0,
            scaled: 0.0,
            time_scale: 1.0,
        }
    }
}

impl Clock {
    /// Advance by a real delta; returns the scaled delta
    pub fn advance(&mut self, real_dt: f32) -> f32 {
        let scaled_dt = real_dt * self.time_scale;
        self.real += real_dt as f64;
        self.scaled += scaled_dt as f64;
        scaled_dt
    }

    pub fn now(&self, base: TimeBase) -> f64 {
        match base {
            TimeBase::Real => self.real,
            TimeBase::Scaled => self.scaled,
        }
    }
}

/// Handle for cancelling a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<A> {
    id: TimerId,
    base: TimeBase,
    due: f64,
    action: A,
}

/// Queue of actions waiting for their due time
#[derive(Debug)]
pub struct TimerQueue<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Run `action` once `delay` seconds have passed on `base`
    pub fn schedule(&mut self, clock: &Clock, base: TimeBase, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            base,
            due: clock.now(base) + delay.max(0.0) as f64,
            action,
        });
        id
    }

    /// Remove a pending action. Returns it if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<A> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).action)
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Take every action whose due time has passed, earliest first
    /// (ties in scheduling order)
    pub fn take_due(&mut self, clock: &Clock) -> Vec<A> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|e| e.due <= clock.now(e.base));
        self.entries = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
