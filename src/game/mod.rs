// Public API
pub use instance::{GameInstance, GameInstanceData, DEFAULT_LEVEL_SCORE_STEP};
pub use state::{GameState, State};

// Internal modules
mod instance;
mod state;
