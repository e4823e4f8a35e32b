//! YAML configuration with `<<` merge keys.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use serde::{Deserialize, Serialize};
use serde_yml::Value;
use yaml_merge_keys::merge_keys_serde_yml;

use crate::error::ConfigError;
use crate::framework::logging::*;
use crate::input::dispatch::{DEFAULT_WHEEL_SCALE, Dispatcher, DrainPolicy};
use crate::pixels::SurfaceSize;

pub const CONFIG_FILE_NAME: &str = "canvas-bridge.yaml";
pub const CONFIG_ENV: &str = "CANVAS_BRIDGE_CONFIG";
pub const WHEEL_SCALE_ENV: &str = "CANVAS_BRIDGE_WHEEL_SCALE";
pub const WEB_VIEW_BIN_ENV: &str = "CANVAS_BRIDGE_WEB_VIEW_BIN";

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("CanvasBridge"))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub window: WindowConfig,
    pub input: InputConfig,
    pub present: PresentConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Canvas Bridge".to_string(),
            width: 640,
            height: 480,
        }
    }
}

impl WindowConfig {
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub wheel_scale: f64,
    pub drain_policy: DrainPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel_scale: DEFAULT_WHEEL_SCALE,
            drain_policy: DrainPolicy::default(),
        }
    }
}

impl InputConfig {
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.wheel_scale, self.drain_policy)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentConfig {
    pub vsync: bool,
    pub clear_color: [f64; 4],
    /// Optional WGSL replacement for the built-in presentation shader.
    pub shader: Option<PathBuf>,
}

impl Default for PresentConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shader: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loaded in order; the first one that fails stops the rest.
    pub scripts: Vec<PathBuf>,
    pub watch_scripts: bool,
    pub show_window: bool,
    pub devtools: bool,
    /// Prebuilt `web_view_process` binary. When unset the child is started
    /// with `cargo run`.
    pub web_view_bin: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scripts: Vec::new(),
            watch_scripts: true,
            show_window: false,
            devtools: false,
            web_view_bin: None,
        }
    }
}

impl BridgeConfig {
    /// Loads `path`, resolving relative script and shader paths against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source =
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::from_yaml(&source, path)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        info!("loaded config from {}", path.display());

        Ok(config)
    }

    /// Parses YAML source. `origin` is only used in error messages.
    pub fn from_yaml(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: origin.to_path_buf(),
            message,
        };

        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: Value = serde_yml::from_str(source)
            .map_err(|err| parse_error(err.to_string()))?;

        let merged = merge_keys_serde_yml(raw).map_err(|err| {
            parse_error(format!("failed to process YAML merge keys: {}", err))
        })?;

        let config: Self = serde_yml::from_value(merged)
            .map_err(|err| parse_error(err.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds and loads the configuration: `explicit` first, then the
    /// `CANVAS_BRIDGE_CONFIG` variable, then `canvas-bridge.yaml` in the user
    /// config directory, then defaults. Environment overrides are applied
    /// last.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let user_path = config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file());

        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load(&path)?,
            None => match user_path {
                Some(path) => Self::load(&path)?,
                None => {
                    debug!("no config file found; using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(WHEEL_SCALE_ENV) {
            self.input.wheel_scale =
                value.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: WHEEL_SCALE_ENV.to_string(),
                    message: format!("'{}' is not a number", value),
                })?;
            debug!("wheel scale overridden to {}", self.input.wheel_scale);
        }

        if let Some(value) = env::var_os(WEB_VIEW_BIN_ENV) {
            self.engine.web_view_bin = Some(PathBuf::from(value));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.size().is_empty() {
            return Err(ConfigError::Invalid {
                name: "window".to_string(),
                message: format!(
                    "size must be non-zero, got {}",
                    self.window.size()
                ),
            });
        }

        if !self.input.wheel_scale.is_finite() {
            return Err(ConfigError::Invalid {
                name: "input.wheel_scale".to_string(),
                message: "must be finite".to_string(),
            });
        }

        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        self.engine.scripts.iter_mut().for_each(resolve);
        if let Some(shader) = self.present.shader.as_mut() {
            resolve(shader);
        }
        if let Some(bin) = self.engine.web_view_bin.as_mut() {
            resolve(bin);
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn parse(source: &str) -> Result<BridgeConfig, ConfigError> {
        BridgeConfig::from_yaml(source, Path::new("test.yaml"))
    }

    #[test]
    fn empty_source_is_default() {
        assert_eq!(parse("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
window:
  width: 1024
input:
  drain_policy: discard
"#,
        )
        .unwrap();

        assert_eq!(config.window.size(), SurfaceSize::new(1024, 480));
        assert_eq!(config.window.title, "Canvas Bridge");
        assert_eq!(config.input.drain_policy, DrainPolicy::Discard);
        assert_eq!(config.input.wheel_scale, 50.0);
        assert!(config.present.vsync);
    }

    #[test]
    fn merge_keys_are_resolved() {
        let config = parse(
            r#"
defaults: &defaults
  title: Shared
  height: 300
window:
  <<: *defaults
  width: 400
"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Shared");
        assert_eq!(config.window.size(), SurfaceSize::new(400, 300));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let err = parse("window: { width: 0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "window"));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let err = parse("window: [").unwrap_err();
        assert!(err.to_string().contains("test.yaml"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.yaml");
        fs::write(
            &path,
            "engine:\n  scripts: [scripts/a.js, /abs/b.js]\npresent:\n  shader: blit.wgsl\n",
        )
        .unwrap();

        let config = BridgeConfig::load(&path).unwrap();

        assert_eq!(
            config.engine.scripts,
            vec![dir.path().join("scripts/a.js"), PathBuf::from("/abs/b.js")]
        );
        assert_eq!(config.present.shader, Some(dir.path().join("blit.wgsl")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    #[serial]
    fn env_config_path_and_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.yaml");
        fs::write(&path, "window: { title: From Env }\n").unwrap();

        unsafe {
            env::set_var(CONFIG_ENV, &path);
            env::set_var(WHEEL_SCALE_ENV, "12.5");
            env::set_var(WEB_VIEW_BIN_ENV, "/opt/web_view_process");
        }

        let config = BridgeConfig::discover(None);

        unsafe {
            env::remove_var(CONFIG_ENV);
            env::remove_var(WHEEL_SCALE_ENV);
            env::remove_var(WEB_VIEW_BIN_ENV);
        }

        let config = config.unwrap();
        assert_eq!(config.window.title, "From Env");
        assert_eq!(config.input.wheel_scale, 12.5);
        assert_eq!(
            config.engine.web_view_bin,
            Some(PathBuf::from("/opt/web_view_process"))
        );
    }

    #[test]
    #[serial]
    fn explicit_path_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        fs::write(&explicit, "window: { title: Explicit }\n").unwrap();

        unsafe {
            env::set_var(CONFIG_ENV, dir.path().join("missing.yaml"));
        }
        let config = BridgeConfig::discover(Some(&explicit));
        unsafe {
            env::remove_var(CONFIG_ENV);
        }

        assert_eq!(config.unwrap().window.title, "Explicit");
    }

    #[test]
    #[serial]
    fn bad_wheel_scale_override_is_invalid() {
        unsafe {
            env::set_var(WHEEL_SCALE_ENV, "lots");
        }
        let mut config = BridgeConfig::default();
        let result = config.apply_env_overrides();
        unsafe {
            env::remove_var(WHEEL_SCALE_ENV);
        }

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
