pub mod recorders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use recorders::CallLog;
#[allow(unused_imports)]
pub use setup::TempSaveDir;
