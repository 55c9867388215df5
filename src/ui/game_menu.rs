//! In-level menus: pause, win and lose panels

/// Buttons on the in-level canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuButton {
    /// HUD pause button
    Pause,
    // Pause panel
    Continue,
    Restart,
    Quit,
    // Win panel
    Next,
    PlayAgain,
    // Lose panel
    Retry,
}

/// Which panel is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    None,
    Pause,
    Win,
    Lose,
}

#[derive(Debug, Clone)]
pub struct GameMenu {
    panel: Panel,
    pause_button_visible: bool,
    selected: Option<MenuButton>,
}

impl Default for GameMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMenu {
    pub fn new() -> Self {
        Self {
            panel: Panel::None,
            pause_button_visible: true,
            selected: None,
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn selected(&self) -> Option<MenuButton> {
        self.selected
    }

    pub fn is_pause_button_visible(&self) -> bool {
        self.pause_button_visible
    }

    /// Buttons the player can currently click
    pub fn visible_buttons(&self) -> &'static [MenuButton] {
        match self.panel {
            Panel::None if self.pause_button_visible => &[MenuButton::Pause],
            Panel::None => &[],
            Panel::Pause => &[MenuButton::Restart, MenuButton::Continue, MenuButton::Quit],
            Panel::Win => &[MenuButton::Next, MenuButton::PlayAgain],
            Panel::Lose => &[MenuButton::Retry],
        }
    }

    pub fn accepts(&self, button: MenuButton) -> bool {
        self.visible_buttons().contains(&button)
    }

    pub fn on_pause(&mut self) {
        self.panel = Panel::Pause;
        self.selected = Some(MenuButton::Continue);
        self.pause_button_visible = false;
    }

    pub fn on_resume(&mut self) {
        // Leave Restart selected so Continue highlights properly on the next pause
        self.selected = Some(MenuButton::Restart);
        self.panel = Panel::None;
        self.pause_button_visible = true;
    }

    pub fn on_player_death(&mut self) {
        self.panel = Panel::Lose;
        self.pause_button_visible = false;
        self.selected = Some(MenuButton::Retry);
    }

    /// Show the results screen (scheduled shortly after victory)
    pub fn show_win(&mut self) {
        self.pause_button_visible = false;
        self.panel = Panel::Win;
        self.selected = Some(MenuButton::Next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_resume_panels() {
        let mut menu = GameMenu::new();
        assert!(menu.accepts(MenuButton::Pause));

        menu.on_pause();
        assert_eq!(menu.panel(), Panel::Pause);
        assert_eq!(menu.selected(), Some(MenuButton::Continue));
        assert!(!menu.accepts(MenuButton::Pause));
        assert!(menu.accepts(MenuButton::Quit));

        menu.on_resume();
        assert_eq!(menu.panel(), Panel::None);
        assert_eq!(menu.selected(), Some(MenuButton::Restart));
        assert!(menu.is_pause_button_visible());
    }

    #[test]
    fn test_lose_panel() {
        let mut menu = GameMenu::new();
        menu.on_player_death();
        assert_eq!(menu.panel(), Panel::Lose);
        assert_eq!(menu.visible_buttons(), &[MenuButton::Retry]);
        assert!(!menu.is_pause_button_visible());
    }

    #[test]
    fn test_win_panel() {
        let mut menu = GameMenu::new();
        menu.show_win();
        assert_eq!(menu.selected(), Some(MenuButton::Next));
        assert!(menu.accepts(MenuButton::PlayAgain));
        assert!(!menu.accepts(MenuButton::Retry));
    }
}
