//! Utility modules for error handling, configuration and platform lookups

pub mod config;
pub mod error;
pub mod platform;

// Re-export for convenience
pub use config::{AppSettings, UpdateSettings};
pub use error::YtgrabError;
pub use platform::{find_ytdlp, sanitize_folder_name};
