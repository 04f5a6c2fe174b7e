//! Engine settings
//!
//! Uses RON (Rusty Object Notation) for a human-editable settings file.
//! Missing file or bad contents fall back to defaults with a warning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::renderer::Vec3;

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SettingsError {
    fn from(e: ron::error::SpannedError) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<ron::Error> for SettingsError {
    fn from(e: ron::Error) -> Self {
        SettingsError::Serialize(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
            SettingsError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

/// Runtime-tunable engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OBJ mesh shown at startup
    pub mesh_path: String,
    /// Background music (empty = none)
    pub bgm_path: String,
    /// Toggle blip (empty = none)
    pub sfx_path: String,
    /// Texture for the textured fill mode (empty or unreadable falls
    /// back to a built-in checkerboard)
    pub texture_path: String,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub light_dir: Vec3,
    /// World-space units the model sits in front of the origin
    pub model_distance: f32,
    /// Camera translation speed, units per second
    pub move_speed: f32,
    /// Camera yaw speed, radians per second
    pub turn_speed: f32,
    /// Model spin speed, radians per second
    pub spin_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mesh_path: "assets/obj/teapot.obj".to_string(),
            bgm_path: "assets/bgm/mars.wav".to_string(),
            sfx_path: "assets/sfx/hop.wav".to_string(),
            texture_path: "assets/img/tex.png".to_string(),
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            light_dir: Vec3::new(0.5, 0.5, -1.0),
            model_distance: 5.0,
            move_speed: 8.0,
            turn_speed: 2.0,
            spin_speed: 1.0,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load settings, falling back to defaults when the file is absent
    /// or unreadable. A missing file is written back with the defaults
    /// so there is something to edit.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Settings {
        match Settings::load(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                if let Some(parent) = path.as_ref().parent() {
                    let _ = fs::create_dir_all(parent);
                }
                match settings.save(&path) {
                    Ok(()) => println!("Wrote default settings to {}", path.as_ref().display()),
                    Err(e) => eprintln!("Could not write {}: {}", path.as_ref().display(), e),
                }
                settings
            }
            Err(e) => {
                eprintln!(
                    "Settings {}: {} - using defaults",
                    path.as_ref().display(),
                    e
                );
                Settings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");

        let mut settings = Settings::default();
        settings.fov_y_degrees = 70.0;
        settings.mesh_path = "assets/obj/ship.obj".to_string();
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.fov_y_degrees, 70.0);
        assert_eq!(loaded.mesh_path, "assets/obj/ship.obj");
        assert_eq!(loaded.near, settings.near);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let loaded: Settings = ron::from_str("(fov_y_degrees: 60.0)").unwrap();
        assert_eq!(loaded.fov_y_degrees, 60.0);
        assert_eq!(loaded.far, Settings::default().far);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let settings = Settings::load_or_default("definitely/not/here.ron");
        assert_eq!(settings.fov_y_degrees, Settings::default().fov_y_degrees);
    }
}
