use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::extract::DEFAULT_JPEG_QUALITY;
use crate::render::DEFAULT_HANDLE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "avatar-crop";
const APP_CONFIG_FILE: &str = "config.json";

/// Editor settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Side of the resize handle, in display pixels.
    pub handle_size: f64,
    pub default_mime_type: String,
    pub jpeg_quality: u8,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: DEFAULT_HANDLE_SIZE,
            default_mime_type: "image/png".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EditorConfig::default(),
    };
    if !path.exists() {
        return EditorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EditorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EditorConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "avatar-crop",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/avatar-crop/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("avatar-crop", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/avatar-crop/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("avatar-crop", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"jpeg_quality": 75}"#).expect("config should parse");
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.handle_size, DEFAULT_HANDLE_SIZE);
        assert_eq!(config.default_mime_type, "image/png");
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = std::env::temp_dir().join(format!("avatar-crop-config-{}", std::process::id()));
        let config = load_editor_config_with(Some(dir.as_path()), None);
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn malformed_config_file_yields_defaults() {
        let root =
            std::env::temp_dir().join(format!("avatar-crop-bad-config-{}", std::process::id()));
        let dir = root.join(APP_DIR);
        std::fs::create_dir_all(&dir).expect("config dir should be created");
        std::fs::write(dir.join(APP_CONFIG_FILE), "{ not json").expect("config should write");

        let config = load_editor_config_with(Some(root.as_path()), None);
        assert_eq!(config, EditorConfig::default());

        let _ = std::fs::remove_dir_all(&root);
    }
}
