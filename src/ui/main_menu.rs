//! Title screen: level select with previews, and quit

use crate::error::{GameError, Result};
use crate::level_scene_name;
use crate::sim::SceneRequest;
use crate::sim::heading::InputGate;
use crate::sim::timer::{Clock, TimeBase, TimerQueue};
use crate::tuning::Tuning;

use super::curtain::Curtain;

#[derive(Debug)]
pub struct MainMenu {
    /// Preview image per level-select slot
    previews: Vec<String>,
    preview: Option<usize>,
    curtain: Curtain,
    fade_secs: f32,
    ui_gate: InputGate,
    clock: Clock,
    timers: TimerQueue<SceneRequest>,
    request: Option<SceneRequest>,
}

impl MainMenu {
    /// Open the title screen; the curtain lifts immediately
    pub fn new(previews: Vec<String>, tuning: &Tuning) -> Self {
        let mut curtain = Curtain::new(1.0);
        curtain.fade_to(0.0, tuning.menu_fade_secs);
        Self {
            previews,
            preview: None,
            curtain,
            fade_secs: tuning.menu_fade_secs,
            ui_gate: InputGate::default(),
            clock: Clock::default(),
            timers: TimerQueue::new(),
            request: None,
        }
    }

    pub fn level_count(&self) -> usize {
        self.previews.len()
    }

    pub fn curtain(&self) -> &Curtain {
        &self.curtain
    }

    pub fn is_interactive(&self) -> bool {
        self.ui_gate.is_enabled()
    }

    /// Currently previewed image, if any
    pub fn preview(&self) -> Option<&str> {
        self.preview.and_then(|i| self.previews.get(i)).map(String::as_str)
    }

    /// Hovering a level-select button shows its preview
    pub fn set_preview(&mut self, index: usize) -> Option<&str> {
        if index < self.previews.len() {
            self.preview = Some(index);
        }
        self.preview()
    }

    /// Fade out and load `Level_{index + 1}`
    pub fn load_level(&mut self, index: usize) -> Result<()> {
        if !self.ui_gate.is_enabled() {
            log::debug!("Level select ignored, already loading");
            return Ok(());
        }
        if index >= self.previews.len() {
            return Err(GameError::LevelIndexOutOfRange(index));
        }
        self.ui_gate.disable();
        self.curtain.fade_to(1.0, self.fade_secs);
        let name = level_scene_name(index);
        log::info!("Main menu loading {}", name);
        self.timers
            .schedule(&self.clock, TimeBase::Real, self.fade_secs, SceneRequest::Load(name));
        Ok(())
    }

    /// Exit the game
    pub fn quit_game(&mut self) {
        if self.ui_gate.is_enabled() {
            self.ui_gate.disable();
            self.request = Some(SceneRequest::Quit);
        }
    }

    pub fn update(&mut self, real_dt: f32) {
        self.clock.advance(real_dt);
        self.curtain.update(real_dt);
        for request in self.timers.take_due(&self.clock) {
            self.request.get_or_insert(request);
        }
    }

    /// Scene swap ready to perform, once
    pub fn take_scene_request(&mut self) -> Option<SceneRequest> {
        self.request.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> MainMenu {
        MainMenu::new(vec!["preview_1".into(), "preview_2".into()], &Tuning::default())
    }

    #[test]
    fn test_curtain_lifts_on_open() {
        let mut menu = menu();
        assert_eq!(menu.curtain().alpha(), 1.0);
        menu.update(0.2);
        assert_eq!(menu.curtain().alpha(), 0.0);
    }

    #[test]
    fn test_load_level_after_fade() {
        let mut menu = menu();
        menu.load_level(1).unwrap();
        assert!(!menu.is_interactive());
        menu.update(0.1);
        assert_eq!(menu.take_scene_request(), None);
        menu.update(0.1);
        assert_eq!(menu.take_scene_request(), Some(SceneRequest::Load("Level_2".into())));
        assert_eq!(menu.take_scene_request(), None);
    }

    #[test]
    fn test_second_select_ignored() {
        let mut menu = menu();
        menu.load_level(0).unwrap();
        menu.load_level(1).unwrap();
        menu.update(1.0);
        assert_eq!(menu.take_scene_request(), Some(SceneRequest::Load("Level_1".into())));
    }

    #[test]
    fn test_out_of_range_select() {
        let mut menu = menu();
        assert!(matches!(menu.load_level(5), Err(GameError::LevelIndexOutOfRange(5))));
        assert!(menu.is_interactive());
    }

    #[test]
    fn test_preview_and_quit() {
        let mut menu = menu();
        assert_eq!(menu.set_preview(1), Some("preview_2"));
        assert_eq!(menu.set_preview(9), Some("preview_2"));
        menu.quit_game();
        assert_eq!(menu.take_scene_request(), Some(SceneRequest::Quit));
    }
}
