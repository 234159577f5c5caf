use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Local};
use tracing::{info, instrument};

use super::{
    errors::SaveError,
    models::{LoadOutcome, SaveData},
    registry::SaveDataRegistry,
};
use crate::game::GameInstance;

const SAVE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads and writes the JSON save file
///
/// The file holds the game instance data, every registered component's data
/// and the local time of the save.
pub struct SaveLoadManager {
    save_file_path: PathBuf,
    game_instance: Rc<GameInstance>,
    registry: Rc<SaveDataRegistry>,
}

impl SaveLoadManager {
    pub fn new(
        save_file_path: PathBuf,
        game_instance: Rc<GameInstance>,
        registry: Rc<SaveDataRegistry>,
    ) -> Self {
        Self {
            save_file_path,
            game_instance,
            registry,
        }
    }

    pub fn save_file_path(&self) -> &Path {
        &self.save_file_path
    }

    /// Log the save location and load whatever is there
    pub fn initialize(&self) -> Result<LoadOutcome, SaveError> {
        info!(path = %self.save_file_path.display(), "Save file path");
        self.load_game()
    }

    /// Write the current game to disk, returns the recorded save time
    #[instrument(skip(self), fields(path = %self.save_file_path.display()))]
    pub fn save_game(&self) -> Result<String, SaveError> {
        let save_data = SaveData {
            game_instance: self.game_instance.save_data(),
            components: self.registry.collect_all_save_data(),
            save_time: Local::now().format(SAVE_TIME_FORMAT).to_string(),
        };

        let json = serde_json::to_string_pretty(&save_data)?;

        if let Some(parent) = self.save_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target and rename so a crash never leaves half a file
        let staging = self.save_file_path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.save_file_path)?;

        info!(save_time = %save_data.save_time, "Game saved successfully");
        Ok(save_data.save_time)
    }

    /// Apply the save file; a missing file is a fresh start, not an error
    #[instrument(skip(self), fields(path = %self.save_file_path.display()))]
    pub fn load_game(&self) -> Result<LoadOutcome, SaveError> {
        if !self.has_save_file() {
            info!("No save file found, starting fresh");
            return Ok(LoadOutcome::NoSaveFile);
        }

        let json = fs::read_to_string(&self.save_file_path)?;
        let save_data: SaveData = serde_json::from_str(&json)?;

        self.game_instance.load_save_data(save_data.game_instance);
        self.registry.load_all_save_data(&save_data.components);

        info!(save_time = %save_data.save_time, "Game loaded successfully");
        Ok(LoadOutcome::Loaded {
            save_time: save_data.save_time,
        })
    }

    /// Remove the save file, returns whether one existed
    #[instrument(skip(self), fields(path = %self.save_file_path.display()))]
    pub fn delete_save(&self) -> Result<bool, SaveError> {
        if !self.has_save_file() {
            return Ok(false);
        }

        fs::remove_file(&self.save_file_path)?;
        info!("Save file deleted");
        Ok(true)
    }

    pub fn has_save_file(&self) -> bool {
        self.save_file_path.is_file()
    }

    /// Human-readable status line for menus
    pub fn save_file_info(&self) -> String {
        if !self.has_save_file() {
            return "No save file".to_string();
        }

        match fs::metadata(&self.save_file_path).and_then(|meta| meta.modified()) {
            Ok(modified) => format!(
                "Last saved: {}",
                DateTime::<Local>::from(modified).format(SAVE_TIME_FORMAT)
            ),
            Err(_) => "Save file corrupted".to_string(),
        }
    }
}
