use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Score files (history, best run, high score) live under
    /// $HOME/.local/state/typespeed, falling back to the platform dirs.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("typespeed"),
            )
        } else {
            ProjectDirs::from("", "", "typespeed")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typespeed")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }
}
