use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typeclock";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/typeclock`, or the platform data dir without HOME.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn best_score_db() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("best.db"))
            .unwrap_or_else(|| PathBuf::from("typeclock_best.db"))
    }

    pub fn log_dir() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    pub fn config_file() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typeclock_config.json"))
    }
}
