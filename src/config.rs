use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::game::DEFAULT_LEVEL_SCORE_STEP;
use crate::shared::AppError;

pub const SAVE_DIR_VAR: &str = "FACTORYBASE_SAVE_DIR";
pub const SAVE_FILE_VAR: &str = "FACTORYBASE_SAVE_FILE";
pub const TICK_MS_VAR: &str = "FACTORYBASE_TICK_MS";
pub const LEVEL_SCORE_STEP_VAR: &str = "FACTORYBASE_LEVEL_SCORE_STEP";
pub const AUTOLOAD_VAR: &str = "FACTORYBASE_AUTOLOAD";

/// Runtime settings for the game host
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub save_dir: PathBuf,
    pub save_file_name: String,
    pub tick_interval: Duration,
    pub level_score_step: i32,
    /// Load the save file during `App::initialize`
    pub autoload: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("save"),
            save_file_name: "gamedata.json".to_string(),
            tick_interval: Duration::from_millis(100),
            level_score_step: DEFAULT_LEVEL_SCORE_STEP,
            autoload: true,
        }
    }
}

impl AppConfig {
    /// Build from `FACTORYBASE_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_ms: u64 = parse_var(&lookup, TICK_MS_VAR)?
            .unwrap_or(defaults.tick_interval.as_millis() as u64);
        if tick_ms == 0 {
            return Err(AppError::Config(format!("{TICK_MS_VAR} must be positive")));
        }

        let level_score_step: i32 =
            parse_var(&lookup, LEVEL_SCORE_STEP_VAR)?.unwrap_or(defaults.level_score_step);
        if level_score_step <= 0 {
            return Err(AppError::Config(format!(
                "{LEVEL_SCORE_STEP_VAR} must be positive"
            )));
        }

        Ok(Self {
            save_dir: lookup(SAVE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.save_dir),
            save_file_name: lookup(SAVE_FILE_VAR).unwrap_or(defaults.save_file_name),
            tick_interval: Duration::from_millis(tick_ms),
            level_score_step,
            autoload: parse_var(&lookup, AUTOLOAD_VAR)?.unwrap_or(defaults.autoload),
        })
    }

    pub fn save_file_path(&self) -> PathBuf {
        self.save_dir.join(&self.save_file_name)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AppError::Config(format!("{name}={raw:?}: {e}")))
        })
        .transpose()
}
