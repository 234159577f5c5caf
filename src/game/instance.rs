use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::event::{
    EventDispatcher, GameInstanceReset, LevelChanged, PauseStateChanged, ScoreChanged,
};

/// Points needed per level before the next level unlocks
pub const DEFAULT_LEVEL_SCORE_STEP: i32 = 1000;

/// Persisted slice of the game instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameInstanceData {
    pub game_time: f64,
    pub score: i32,
    pub level: i32,
}

impl Default for GameInstanceData {
    fn default() -> Self {
        Self {
            game_time: 0.0,
            score: 0,
            level: 1,
        }
    }
}

/// Session-wide score, level, pause flag and play time
///
/// Every change is announced through the dispatcher; nothing else holds a
/// reference back to the instance.
pub struct GameInstance {
    game_time: Cell<f64>,
    score: Cell<i32>,
    level: Cell<i32>,
    paused: Cell<bool>,
    level_score_step: i32,
    dispatcher: Rc<EventDispatcher>,
}

impl GameInstance {
    pub fn new(dispatcher: Rc<EventDispatcher>) -> Self {
        Self::with_level_score_step(dispatcher, DEFAULT_LEVEL_SCORE_STEP)
    }

    pub fn with_level_score_step(dispatcher: Rc<EventDispatcher>, level_score_step: i32) -> Self {
        Self {
            game_time: Cell::new(0.0),
            score: Cell::new(0),
            level: Cell::new(1),
            paused: Cell::new(false),
            level_score_step,
            dispatcher,
        }
    }

    pub fn initialize(&self) {
        info!("GameInstance initialized");
        self.reset_game_data();
    }

    pub fn dispose(&self) {
        info!("GameInstance disposed");
    }

    /// Seconds of unpaused play
    pub fn game_time(&self) -> f64 {
        self.game_time.get()
    }

    pub fn score(&self) -> i32 {
        self.score.get()
    }

    pub fn level(&self) -> i32 {
        self.level.get()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Advance the play clock; a paused instance does not age
    pub fn tick(&self, delta: Duration) {
        if !self.paused.get() {
            self.game_time.set(self.game_time.get() + delta.as_secs_f64());
        }
    }

    /// Score arithmetic wraps on overflow
    pub fn add_score(&self, points: i32) {
        let score = self.score.get().wrapping_add(points);
        self.score.set(score);
        self.dispatcher.publish(ScoreChanged { score });

        self.check_level_progression();
    }

    pub fn set_score(&self, score: i32) {
        self.score.set(score);
        self.dispatcher.publish(ScoreChanged { score });
    }

    pub fn next_level(&self) {
        let level = self.level.get().wrapping_add(1);
        self.level.set(level);
        self.dispatcher.publish(LevelChanged { level });
        info!(level, "Advanced to next level");
    }

    pub fn set_level(&self, level: i32) {
        self.level.set(level);
        self.dispatcher.publish(LevelChanged { level });
    }

    /// Publishes only when the flag actually flips
    pub fn set_paused(&self, paused: bool) {
        if self.paused.replace(paused) != paused {
            self.dispatcher.publish(PauseStateChanged { paused });
        }
    }

    // One level per call, even if the score jumped past several thresholds
    fn check_level_progression(&self) {
        let required = self.level.get().saturating_mul(self.level_score_step);
        if self.score.get() >= required {
            debug!(score = self.score.get(), required, "Level threshold reached");
            self.next_level();
        }
    }

    pub fn reset_game_data(&self) {
        self.game_time.set(0.0);
        self.score.set(0);
        self.level.set(1);
        self.paused.set(false);

        self.dispatcher.publish(ScoreChanged { score: 0 });
        self.dispatcher.publish(LevelChanged { level: 1 });
        self.dispatcher.publish(PauseStateChanged { paused: false });
        self.dispatcher.publish(GameInstanceReset);

        info!("Game data reset");
    }

    pub fn save_data(&self) -> GameInstanceData {
        GameInstanceData {
            game_time: self.game_time.get(),
            score: self.score.get(),
            level: self.level.get(),
        }
    }

    pub fn load_save_data(&self, data: GameInstanceData) {
        self.game_time.set(data.game_time);
        self.score.set(data.score);
        self.level.set(data.level);

        self.dispatcher.publish(ScoreChanged { score: data.score });
        self.dispatcher.publish(LevelChanged { level: data.level });

        info!(
            level = data.level,
            score = data.score,
            game_time = data.game_time,
            "Loaded save data"
        );
    }
}
