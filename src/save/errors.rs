use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Save file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save data (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Component {key} rejected its save data: {reason}")]
    Component { key: String, reason: String },
}
