// Library crate for the factory base game core
// This file exposes the public API for the host binary and integration tests

pub mod config;
pub mod event;
pub mod game;
pub mod hud;
pub mod save;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use event::{Event, EventDispatcher, EventError, Handler};
pub use game::{GameInstance, GameState, State};
pub use hud::{Hud, HudView};
pub use save::{SaveDataRegistry, SaveLoadManager, Saveable};
pub use shared::{App, AppError};
