mod errors;
mod manager;
pub mod models;
mod registry;

pub use errors::SaveError;
pub use manager::SaveLoadManager;
pub use models::{ComponentData, LoadOutcome, SaveData};
pub use registry::{SaveDataRegistry, Saveable};
