//! Configuration loading, validation and env substitution.
//!
//! Config files: `picker.toml`, `picker.yaml`, `picker.yml` or `picker.json`
//! Searched in `./` then `~/.config/element-picker/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in all values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        BusConfig, CoordinatorConfig, InspectorConfig, LoggingConfig, PickerConfig,
        StopFailurePolicy,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
