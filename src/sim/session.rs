//! Session state for one level instance: pause, game over, transitions
//!
//! ```text
//! Running <-> Paused
//! Running  -> GameOver        (death or victory, terminal)
//! any      -> Transitioning   (level load requested, ends in a scene swap)
//! ```

use super::events::{GameEvent, SceneRequest};
use super::heading::InputGate;
use crate::consts::MAIN_TITLE;

/// Coarse session phase, for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    Paused,
    GameOver,
    Transitioning,
}

#[derive(Debug, Clone)]
pub struct Session {
    current_level: String,
    next_level: Option<String>,
    paused: bool,
    game_over: bool,
    pending: Option<SceneRequest>,
    /// Herd movement input
    pub movement_gate: InputGate,
    /// Pause key input
    pub pause_gate: InputGate,
    /// Menu buttons
    pub ui_gate: InputGate,
}

impl Session {
    pub fn new(current_level: impl Into<String>) -> Self {
        Self {
            current_level: current_level.into(),
            next_level: None,
            paused: false,
            game_over: false,
            pending: None,
            movement_gate: InputGate::default(),
            pause_gate: InputGate::default(),
            ui_gate: InputGate::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.pending.is_some() {
            SessionPhase::Transitioning
        } else if self.game_over {
            SessionPhase::GameOver
        } else if self.paused {
            SessionPhase::Paused
        } else {
            SessionPhase::Running
        }
    }

    pub fn current_level(&self) -> &str {
        &self.current_level
    }

    pub fn next_level(&self) -> Option<&str> {
        self.next_level.as_deref()
    }

    pub fn set_next_level(&mut self, name: impl Into<String>) {
        self.next_level = Some(name.into());
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_transition(&self) -> Option<&SceneRequest> {
        self.pending.as_ref()
    }

    /// World time multiplier
    pub fn time_scale(&self) -> f32 {
        if self.paused { 0.0 } else { 1.0 }
    }

    /// Toggle pause. Returns the notification to publish, or `None` when
    /// the toggle is refused (game over or a transition is pending).
    pub fn pause(&mut self) -> Option<GameEvent> {
        if self.game_over || self.pending.is_some() {
            log::debug!("Pause ignored in {:?}", self.phase());
            return None;
        }
        self.paused = !self.paused;
        if self.paused {
            self.movement_gate.disable();
            log::info!("Paused");
            Some(GameEvent::Paused)
        } else {
            self.movement_gate.enable();
            log::info!("Resumed");
            Some(GameEvent::Resumed)
        }
    }

    /// Start a transition to `name`. Returns `None` if one is already pending.
    pub fn load_level(&mut self, name: &str) -> Option<SceneRequest> {
        self.begin(SceneRequest::Load(name.to_string()))
    }

    /// Reload the level this session belongs to
    pub fn load_current_level(&mut self) -> Option<SceneRequest> {
        let name = self.current_level.clone();
        self.load_level(&name)
    }

    /// Load the level after this one, if the level declared one
    pub fn load_next_level(&mut self) -> Option<SceneRequest> {
        match self.next_level.clone() {
            Some(name) => self.load_level(&name),
            None => {
                log::warn!("Level '{}' has no next level", self.current_level);
                None
            }
        }
    }

    /// Back to the title screen
    pub fn quit(&mut self) -> Option<SceneRequest> {
        self.load_level(MAIN_TITLE)
    }

    fn begin(&mut self, request: SceneRequest) -> Option<SceneRequest> {
        if let Some(pending) = &self.pending {
            log::debug!("Ignoring {:?}, already heading to {:?}", request, pending);
            return None;
        }
        log::info!("Transition to {:?}", request);
        self.ui_gate.disable();
        self.pause_gate.disable();
        self.pending = Some(request.clone());
        Some(request)
    }

    /// A player fell out. Returns false if the session was already over.
    pub fn on_player_death(&mut self) -> bool {
        self.end("defeat")
    }

    /// Every player reached the finish. Returns false if already over.
    pub fn on_victory(&mut self) -> bool {
        self.end("victory")
    }

    fn end(&mut self, why: &str) -> bool {
        if self.game_over {
            return false;
        }
        log::info!("Level '{}' over: {}", self.current_level, why);
        self.game_over = true;
        self.pause_gate.disable();
        self.movement_gate.disable();
        true
    }
}
