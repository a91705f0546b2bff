//! Reads/writes `~/.trundle/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted tuning stored in `~/.trundle/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Standoff distance for a one-shot approach, in centimetres.
    #[serde(default = "default_safe_distance")]
    pub safe_distance_cm: f32,

    /// Standoff distance while following.
    #[serde(default = "default_follow_distance")]
    pub follow_distance_cm: f32,

    /// Lost vision frames tolerated before a search rotation.
    #[serde(default = "default_max_lost_frames")]
    pub max_lost_frames: u32,
}

fn default_safe_distance() -> f32 {
    50.0
}
fn default_follow_distance() -> f32 {
    40.0
}
fn default_max_lost_frames() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            safe_distance_cm: default_safe_distance(),
            follow_distance_cm: default_follow_distance(),
            max_lost_frames: default_max_lost_frames(),
        }
    }
}

/// Return the path to `~/.trundle/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".trundle").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `TRUNDLE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `TRUNDLE_SAFE_DISTANCE` | `safe_distance_cm` |
/// | `TRUNDLE_FOLLOW_DISTANCE` | `follow_distance_cm` |
/// | `TRUNDLE_MAX_LOST_FRAMES` | `max_lost_frames` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TRUNDLE_SAFE_DISTANCE")
        && let Ok(cm) = v.parse::<f32>()
    {
        cfg.safe_distance_cm = cm;
    }
    if let Ok(v) = std::env::var("TRUNDLE_FOLLOW_DISTANCE")
        && let Ok(cm) = v.parse::<f32>()
    {
        cfg.follow_distance_cm = cm;
    }
    if let Ok(v) = std::env::var("TRUNDLE_MAX_LOST_FRAMES")
        && let Ok(frames) = v.parse::<u32>()
    {
        cfg.max_lost_frames = frames;
    }
}

/// Save the config to disk, creating `~/.trundle/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn config_path_points_to_trundle_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".trundle"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "safe_distance_cm = 25.0\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.safe_distance_cm, 25.0);
        assert_eq!(loaded.follow_distance_cm, default_follow_distance());
        assert_eq!(loaded.max_lost_frames, default_max_lost_frames());
    }

    #[test]
    fn apply_env_overrides_changes_safe_distance() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("TRUNDLE_SAFE_DISTANCE", "33.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.safe_distance_cm, 33.5);
        unsafe { std::env::remove_var("TRUNDLE_SAFE_DISTANCE") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_values() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("TRUNDLE_MAX_LOST_FRAMES", "lots") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.max_lost_frames, default_max_lost_frames());
        unsafe { std::env::remove_var("TRUNDLE_MAX_LOST_FRAMES") };
    }
}
