use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::{PickerConfig, StopFailurePolicy},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["picker.toml", "picker.yaml", "picker.yml", "picker.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<PickerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./picker.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/element-picker/picker.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PickerConfig::default()` if no config file is found.
pub fn discover_and_load() -> PickerConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    PickerConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/element-picker/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "element-picker").map(|d| d.config_dir().to_path_buf())
}

/// Apply `PICKER_*` environment overrides on top of a loaded config.
///
/// Recognized variables: `PICKER_LOG_LEVEL`, `PICKER_LOG_JSON`,
/// `PICKER_STOP_FAILURE_POLICY`, `PICKER_MAX_MESSAGE_BYTES`.
pub fn apply_env_overrides(config: &mut PickerConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_env_overrides_with(
    config: &mut PickerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(level) = lookup("PICKER_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
        config.logging.level = level.trim().to_string();
    }

    if let Some(json) = lookup("PICKER_LOG_JSON") {
        config.logging.json = matches!(json.trim(), "1" | "true" | "yes");
    }

    if let Some(raw) = lookup("PICKER_STOP_FAILURE_POLICY") {
        match StopFailurePolicy::from_name(&raw) {
            Some(policy) => config.coordinator.stop_failure_policy = policy,
            None => warn!(value = %raw, "ignoring unknown PICKER_STOP_FAILURE_POLICY"),
        }
    }

    if let Some(raw) = lookup("PICKER_MAX_MESSAGE_BYTES") {
        match raw.trim().parse::<usize>() {
            Ok(bytes) => config.bus.max_message_bytes = bytes,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid PICKER_MAX_MESSAGE_BYTES"),
        }
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<PickerConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_with_env_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picker.toml");
        std::fs::write(
            &path,
            "[coordinator]\nstop_failure_policy = \"${PICKER_TEST_UNSET_POLICY:-clear}\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.coordinator.stop_failure_policy, StopFailurePolicy::Clear);
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("picker.yaml");
        std::fs::write(&yaml, "inspector:\n  text_limit: 42\n").unwrap();
        assert_eq!(load_config(&yaml).unwrap().inspector.text_limit, 42);

        let json = dir.path().join("picker.json");
        std::fs::write(&json, r#"{ "logging": { "json": true } }"#).unwrap();
        assert!(load_config(&json).unwrap().logging.json);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picker.ini");
        std::fs::write(&path, "").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/picker.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/picker.toml"));
    }

    #[test]
    fn env_overrides_apply_known_values() {
        let mut cfg = PickerConfig::default();
        apply_env_overrides_with(&mut cfg, |name| match name {
            "PICKER_LOG_LEVEL" => Some("debug".into()),
            "PICKER_LOG_JSON" => Some("true".into()),
            "PICKER_STOP_FAILURE_POLICY" => Some("clear".into()),
            "PICKER_MAX_MESSAGE_BYTES" => Some("1024".into()),
            _ => None,
        });
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.json);
        assert_eq!(cfg.coordinator.stop_failure_policy, StopFailurePolicy::Clear);
        assert_eq!(cfg.bus.max_message_bytes, 1024);
    }

    #[test]
    fn env_overrides_ignore_garbage() {
        let mut cfg = PickerConfig::default();
        apply_env_overrides_with(&mut cfg, |name| match name {
            "PICKER_STOP_FAILURE_POLICY" => Some("sometimes".into()),
            "PICKER_MAX_MESSAGE_BYTES" => Some("lots".into()),
            _ => None,
        });
        assert_eq!(cfg, PickerConfig::default());
    }
}
