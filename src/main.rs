//! Herd Hop headless demo
//!
//! Plays through the built-in levels with a seeded autopilot and logs the
//! notification stream. `RUST_LOG=debug` also shows effects.
//!
//! Usage: `herd-hop [seed]`

use std::path::Path;

use herd_hop::sim::Autopilot;
use herd_hop::ui::{MenuButton, Panel};
use herd_hop::{Game, LevelCatalog, Settings, Tuning};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this many frames (10 minutes of play)
const MAX_FRAMES: u32 = 60 * 600;

fn main() -> herd_hop::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    log::info!("Herd Hop (headless) starting, seed {:#x}", seed);

    let tuning = Tuning::load_or_default(Path::new("tuning.json"));
    let settings = Settings::load(Path::new("settings.json"));
    log::info!(
        "Audio: bgm {:.1} dB, sfx {:.1} dB; display {} {}",
        settings.bgm_db(),
        settings.sfx_db(),
        settings.resolution.as_str(),
        if settings.fullscreen { "fullscreen" } else { "windowed" }
    );

    let mut game = Game::new(LevelCatalog::builtin()?, tuning, settings);
    game.observe(|event| log::info!("event: {:?}", event));
    let mut pilot = Autopilot::new(seed);

    game.select_level(0)?;
    let mut frames = 0;
    while game.is_running() && frames < MAX_FRAMES {
        let input = game
            .level()
            .map(|level| pilot.next_input(level))
            .unwrap_or_default();
        game.frame(&input, FRAME_DT)?;
        for effect in game.drain_effects() {
            log::debug!("effect: {:?}", effect);
        }
        drive_menus(&mut game);
        frames += 1;
    }

    log::info!("Demo finished after {} frames, {} level loads", frames, game.loads());
    Ok(())
}

/// Click through the results screens like a player would
fn drive_menus(game: &mut Game) {
    if let Some(menu) = game.main_menu_mut() {
        // Back on the title screen after the last level
        if menu.is_interactive() && menu.curtain().alpha() == 0.0 {
            menu.quit_game();
        }
        return;
    }
    let Some(level) = game.level_mut() else {
        return;
    };
    if level.session().is_transitioning() {
        return;
    }
    match level.menu().panel() {
        Panel::Win if level.session().next_level().is_some() => {
            level.press(MenuButton::Next);
        }
        Panel::Win => {
            level.quit();
        }
        Panel::Lose => {
            level.press(MenuButton::Retry);
        }
        _ => {}
    }
}
