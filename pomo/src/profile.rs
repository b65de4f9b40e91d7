//! User profile storage. The session controller itself is never
//! persisted; only these presentation-side settings survive restarts.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub notifications_enabled: bool,
    pub dark_mode: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            notifications_enabled: true,
            dark_mode: true,
        }
    }
}

impl Profile {
    fn data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "spalijama", "Pomo")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        let data_dir = proj_dirs.data_dir();
        fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("profile.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::data_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)?;
        let profile: Self = serde_json::from_str(&json)?;
        Ok(profile)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::data_path()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
