use directories::ProjectDirs;
use std::path::PathBuf;

pub const LOG_FILE: &str = "reflex.log";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/reflex`, or the platform data dir without a HOME.
    /// Database, record files and the log live here.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("reflex"),
            )
        } else {
            ProjectDirs::from("", "", "reflex")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
