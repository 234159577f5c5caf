use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::GameInstanceData;

/// Per-component data keyed by save key
///
/// Each value is the JSON form of one component's `Saveable::Data`, so the
/// shape under a key is fixed by that component's type.
pub type ComponentData = BTreeMap<String, serde_json::Value>;

/// Layout of the save file on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub game_instance: GameInstanceData,
    #[serde(default)]
    pub components: ComponentData,
    pub save_time: String,
}

/// Result of attempting to load the save file
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Save file was read and applied, returns the time it was written
    Loaded { save_time: String },
    /// No save file exists yet
    NoSaveFile,
}
