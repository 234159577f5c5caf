use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::State;

/// A value that can travel through the [`EventDispatcher`](super::EventDispatcher)
///
/// Events represent facts about things that have already happened. Each
/// payload struct is its own event type: handlers are matched on the exact
/// concrete type, never on a trait or a parent type.
pub trait Event: Any + fmt::Debug {
    /// Short name used in log fields
    fn event_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// View used by the dispatcher to recover the concrete type
    fn as_any(&self) -> &dyn Any;
}

macro_rules! game_event {
    ($ty:ty, $name:literal) => {
        impl Event for $ty {
            fn event_type(&self) -> &'static str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// The score has changed; carries the new total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChanged {
    pub score: i32,
}

/// The level has changed; carries the new level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChanged {
    pub level: i32,
}

/// The game instance was paused or resumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseStateChanged {
    pub paused: bool,
}

/// All game instance data went back to its defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInstanceReset;

/// The game state machine moved between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateChanged {
    pub previous: State,
    pub current: State,
}

game_event!(ScoreChanged, "score_changed");
game_event!(LevelChanged, "level_changed");
game_event!(PauseStateChanged, "pause_state_changed");
game_event!(GameInstanceReset, "game_instance_reset");
game_event!(GameStateChanged, "game_state_changed");
