// Event-driven architecture components
//
// This module provides the in-process dispatcher that lets the game core
// talk to its collaborators without holding references to them.

// Public API - what other modules can use
pub use dispatcher::EventDispatcher;
pub use events::{
    Event, GameInstanceReset, GameStateChanged, LevelChanged, PauseStateChanged, ScoreChanged,
};
pub use handler::{EventError, Handler};

// Internal modules
mod dispatcher;
mod events;
mod handler;
