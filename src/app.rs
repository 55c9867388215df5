//! Scene shell: owns the active scene and performs scene swaps
//!
//! `Game` is what a host drives once per rendered frame. It runs the
//! fixed-timestep accumulator for the active level and stands in for the
//! host physics with a flat floor and a proximity overlap detector.

use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::{MAIN_TITLE, MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;
use crate::level_desc::LevelCatalog;
use crate::settings::Settings;
use crate::sim::{
    Body, Effect, EntityId, FlatGround, GameEvent, Level, OverlapTracker, SceneRequest, Subscription, TickInput,
};
use crate::tuning::Tuning;
use crate::ui::{MainMenu, MenuButton};

/// What is on screen
pub enum Scene {
    MainMenu(MainMenu),
    Level(Box<Level>),
    /// The player asked to exit
    Quit,
}

type Observer = Rc<RefCell<dyn FnMut(&GameEvent)>>;

pub struct Game {
    catalog: LevelCatalog,
    tuning: Tuning,
    settings: Settings,
    scene: Scene,
    world: FlatGround,
    overlaps: OverlapTracker,
    accumulator: f32,
    /// Levels loaded so far, restarts included
    loads: u32,
    observer: Option<Observer>,
    subscription: Option<Subscription>,
}

impl Game {
    /// Start on the title screen
    pub fn new(catalog: LevelCatalog, tuning: Tuning, settings: Settings) -> Self {
        let menu = MainMenu::new(catalog.previews(), &tuning);
        Self {
            catalog,
            tuning,
            settings,
            scene: Scene::MainMenu(menu),
            world: FlatGround::new(0.0, glam::Vec2::ZERO),
            overlaps: OverlapTracker::new(),
            accumulator: 0.0,
            loads: 0,
            observer: None,
            subscription: None,
        }
    }

    /// Receive every notification of every level loaded from now on
    pub fn observe<F>(&mut self, handler: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.observer = Some(Rc::new(RefCell::new(handler)));
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn level(&self) -> Option<&Level> {
        match &self.scene {
            Scene::Level(level) => Some(level.as_ref()),
            _ => None,
        }
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        match &mut self.scene {
            Scene::Level(level) => Some(level.as_mut()),
            _ => None,
        }
    }

    pub fn main_menu_mut(&mut self) -> Option<&mut MainMenu> {
        match &mut self.scene {
            Scene::MainMenu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn loads(&self) -> u32 {
        self.loads
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.scene, Scene::Quit)
    }

    /// Load a level by scene name, replacing whatever is active
    pub fn start_level(&mut self, name: &str) -> Result<()> {
        let desc = self.catalog.get(name)?;
        let mut level = desc.build(&self.tuning)?;
        self.world = FlatGround::new(0.0, desc.floor_half_extent);
        self.world.sync(level.bodies());
        self.overlaps = OverlapTracker::new();
        self.accumulator = 0.0;
        self.loads += 1;

        // Drop the old subscription before the old level goes away
        self.subscription = None;
        if let Some(observer) = &self.observer {
            let observer = observer.clone();
            self.subscription = Some(level.subscribe(move |event| (&mut *observer.borrow_mut())(event)));
        }
        level.start();
        self.scene = Scene::Level(Box::new(level));
        Ok(())
    }

    /// Level-select button on the title screen
    pub fn select_level(&mut self, index: usize) -> Result<()> {
        match self.main_menu_mut() {
            Some(menu) => menu.load_level(index),
            None => {
                log::debug!("Level select outside the title screen");
                Ok(())
            }
        }
    }

    /// In-level menu button
    pub fn press(&mut self, button: MenuButton) -> bool {
        self.level_mut().is_some_and(|level| level.press(button))
    }

    /// Remove a body from the active level. The overlap detector forgets
    /// it too, since the level has already seen it leave every sensor.
    pub fn despawn(&mut self, id: EntityId) -> Option<Body> {
        let body = self.level_mut()?.despawn(id);
        self.overlaps.forget(id);
        body
    }

    /// Effects queued by the active level
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.level_mut().map(|level| level.drain_effects()).unwrap_or_default()
    }

    /// Advance one rendered frame
    pub fn frame(&mut self, input: &TickInput, real_dt: f32) -> Result<()> {
        let real_dt = real_dt.clamp(0.0, MAX_FRAME_DT);
        let request = match &mut self.scene {
            Scene::MainMenu(menu) => {
                menu.update(real_dt);
                menu.take_scene_request()
            }
            Scene::Level(level) => {
                let dt = level.update(input, &self.world, real_dt);
                self.accumulator += dt;

                let mut substeps = 0;
                while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                    level.fixed_update(input, SIM_DT);
                    self.world.step(level.bodies_mut(), SIM_DT);
                    self.world.sync(level.bodies());
                    route_overlaps(level, &mut self.overlaps);
                    self.accumulator -= SIM_DT;
                    substeps += 1;
                }
                level.take_scene_request()
            }
            Scene::Quit => None,
        };

        match request {
            Some(request) => self.apply(request),
            None => Ok(()),
        }
    }

    fn apply(&mut self, request: SceneRequest) -> Result<()> {
        match request {
            SceneRequest::Quit => {
                log::info!("Quit requested");
                self.subscription = None;
                self.scene = Scene::Quit;
                Ok(())
            }
            SceneRequest::Load(name) if name == MAIN_TITLE => {
                log::info!("Back to the title screen");
                self.subscription = None;
                self.scene = Scene::MainMenu(MainMenu::new(self.catalog.previews(), &self.tuning));
                Ok(())
            }
            SceneRequest::Load(name) => self.start_level(&name),
        }
    }
}

/// Feed proximity changes to the level: solid sensors get contacts
fn route_overlaps(level: &mut Level, tracker: &mut OverlapTracker) {
    let volumes = level.sensor_volumes();
    for change in tracker.update(&volumes, level.bodies()) {
        let solid = volumes.iter().any(|v| v.id == change.sensor && v.solid);
        match (solid, change.entered) {
            (false, true) => level.overlap_enter(change.sensor, change.entity),
            (false, false) => level.overlap_exit(change.sensor, change.entity),
            (true, true) => level.contact_begin(change.sensor, change.entity),
            (true, false) => level.contact_end(change.sensor, change.entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(LevelCatalog::builtin().unwrap(), Tuning::default(), Settings::default())
    }

    #[test]
    fn test_select_level_swaps_after_fade() {
        let mut game = game();
        game.select_level(0).unwrap();
        game.frame(&TickInput::default(), 0.1).unwrap();
        assert!(game.level().is_none());
        game.frame(&TickInput::default(), 0.1).unwrap();
        assert_eq!(game.level().map(|l| l.name()), Some("Level_1"));
        assert_eq!(game.loads(), 1);
    }

    #[test]
    fn test_quit_from_title() {
        let mut game = game();
        game.main_menu_mut().unwrap().quit_game();
        game.frame(&TickInput::default(), 0.016).unwrap();
        assert!(!game.is_running());
    }

    #[test]
    fn test_unknown_level_errors() {
        let mut game = game();
        assert!(game.start_level("Level_42").is_err());
        assert!(game.level().is_none());
    }

    #[test]
    fn test_observer_follows_level_changes() {
        let mut game = game();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        game.observe(move |e| sink.borrow_mut().push(e.clone()));

        game.start_level("Level_1").unwrap();
        game.start_level("Level_2").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                GameEvent::LevelStarted { name: "Level_1".into() },
                GameEvent::LevelStarted { name: "Level_2".into() },
            ]
        );
    }

    #[test]
    fn test_pause_stops_fixed_steps() {
        let mut game = game();
        game.start_level("Level_1").unwrap();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        game.frame(&pause, 0.02).unwrap();
        let before: Vec<_> = game.level().unwrap().bodies().map(|b| b.position).collect();
        let walk = TickInput {
            movement: glam::Vec2::Y,
            ..Default::default()
        };
        for _ in 0..10 {
            game.frame(&walk, 0.05).unwrap();
        }
        let after: Vec<_> = game.level().unwrap().bodies().map(|b| b.position).collect();
        assert_eq!(before, after);
    }
}
