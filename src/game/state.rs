use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::info;

use crate::event::{EventDispatcher, GameStateChanged};

/// High-level phase of a play session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
pub enum State {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Game state machine
///
/// Transitions are announced as [`GameStateChanged`] events; setting the
/// current state again is logged but publishes nothing.
pub struct GameState {
    current: Cell<State>,
    dispatcher: Rc<EventDispatcher>,
}

impl GameState {
    pub fn new(dispatcher: Rc<EventDispatcher>) -> Self {
        Self {
            current: Cell::new(State::Menu),
            dispatcher,
        }
    }

    pub fn initialize(&self) {
        info!("GameState initialized");
        self.set_state(State::Menu);
    }

    pub fn dispose(&self) {
        info!("GameState disposed");
    }

    pub fn current_state(&self) -> State {
        self.current.get()
    }

    pub fn is_in_state(&self, state: State) -> bool {
        self.current.get() == state
    }

    pub fn set_state(&self, new_state: State) {
        let previous = self.current.replace(new_state);
        if previous != new_state {
            self.dispatcher.publish(GameStateChanged {
                previous,
                current: new_state,
            });
        }
        info!(state = %new_state, "Game state changed");
    }

    pub fn start_game(&self) {
        self.set_state(State::Playing);
    }

    /// Only pauses a running game
    pub fn pause_game(&self) {
        if self.is_in_state(State::Playing) {
            self.set_state(State::Paused);
        }
    }

    /// Only resumes a paused game
    pub fn resume_game(&self) {
        if self.is_in_state(State::Paused) {
            self.set_state(State::Playing);
        }
    }

    pub fn end_game(&self) {
        self.set_state(State::GameOver);
    }

    pub fn return_to_menu(&self) {
        self.set_state(State::Menu);
    }
}
