use std::path::PathBuf;

use factorybase::AppConfig;

/// Unique save directory under the system temp dir, removed on drop
#[allow(dead_code)]
pub struct TempSaveDir {
    path: PathBuf,
}

#[allow(dead_code)]
impl TempSaveDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("factorybase-it-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Default config pointed at this directory
    pub fn config(&self) -> AppConfig {
        AppConfig {
            save_dir: self.path.clone(),
            ..AppConfig::default()
        }
    }
}

impl Drop for TempSaveDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
