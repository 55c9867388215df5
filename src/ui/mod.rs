//! Menu coordinators
//!
//! Pure state: which panel is up, which button is selected, curtain opacity.
//! The host renders whatever these report.

pub mod curtain;
pub mod game_menu;
pub mod main_menu;

pub use curtain::Curtain;
pub use game_menu::{GameMenu, MenuButton, Panel};
pub use main_menu::MainMenu;
