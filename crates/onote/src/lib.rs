// Onote library exports

pub mod app;
pub mod config;
pub mod console;
pub mod file_manager;
pub mod status;
pub mod ui;

pub use app::{App, Mode, PendingAction, PromptKind};
pub use config::Config;
pub use file_manager::FileManager;
pub use status::{MessageType, StatusLine, StatusMessage};
