use std::rc::{Rc, Weak};
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::event::{EventDispatcher, GameStateChanged, Handler};
use crate::game::{GameInstance, GameState, State};
use crate::save::{LoadOutcome, SaveDataRegistry, SaveError, SaveLoadManager};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save error: {0}")]
    Save(#[from] SaveError),
}

/// Application wiring containing all collaborators
///
/// There is exactly one dispatcher per `App`; every collaborator receives it
/// through its constructor.
pub struct App {
    pub config: AppConfig,
    pub dispatcher: Rc<EventDispatcher>,
    pub game_instance: Rc<GameInstance>,
    pub game_state: Rc<GameState>,
    pub save_registry: Rc<SaveDataRegistry>,
    pub save_manager: SaveLoadManager,
    pause_link: Handler<GameStateChanged>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let dispatcher = Rc::new(EventDispatcher::new());
        let game_instance = Rc::new(GameInstance::with_level_score_step(
            dispatcher.clone(),
            config.level_score_step,
        ));
        let game_state = Rc::new(GameState::new(dispatcher.clone()));
        let save_registry = Rc::new(SaveDataRegistry::new());
        let save_manager = SaveLoadManager::new(
            config.save_file_path(),
            game_instance.clone(),
            save_registry.clone(),
        );

        let pause_link = pause_link(Rc::downgrade(&game_instance));
        dispatcher.subscribe(pause_link.clone());

        Self {
            config,
            dispatcher,
            game_instance,
            game_state,
            save_registry,
            save_manager,
            pause_link,
        }
    }

    /// Startup sequence; a broken save file is logged and play starts fresh
    pub fn initialize(&self) {
        self.dispatcher.initialize();
        self.game_instance.initialize();
        self.game_state.initialize();
        self.save_registry.initialize();

        if self.config.autoload {
            match self.save_manager.initialize() {
                Ok(LoadOutcome::Loaded { save_time }) => {
                    info!(save_time = %save_time, "Resumed from save file")
                }
                Ok(LoadOutcome::NoSaveFile) => {}
                Err(e) => error!(error = %e, "Failed to load game"),
            }
        }
    }

    pub fn tick(&self, delta: Duration) {
        self.game_instance.tick(delta);
    }

    /// Save, then tear everything down
    pub fn shutdown(&self) -> Result<(), AppError> {
        let saved = self.save_manager.save_game();

        self.dispatcher.unsubscribe(&self.pause_link);
        self.game_state.dispose();
        self.game_instance.dispose();
        self.dispatcher.dispose();

        saved?;
        Ok(())
    }
}

/// Mirror the state machine onto the instance pause flag
fn pause_link(instance: Weak<GameInstance>) -> Handler<GameStateChanged> {
    Handler::new("pause_link", move |e: &GameStateChanged| {
        let Some(instance) = instance.upgrade() else {
            return Ok(());
        };
        match e.current {
            State::Paused => instance.set_paused(true),
            State::Playing => instance.set_paused(false),
            State::Menu | State::GameOver => {}
        }
        Ok(())
    })
}
