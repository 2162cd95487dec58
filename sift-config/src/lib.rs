//! Run configuration for `sift`: an optional YAML file overlaid by `SIFT_`
//! environment variables, with `${VAR}` and `~` placeholders expanded.
//!
//! Precedence, lowest first: built-in defaults, YAML file, environment. The
//! CLI applies its two path flags on top through [`SiftConfig::with_overrides`].
//!
//! ```yaml
//! input_dir: ~/captures/alice
//! output_path: ${DATA_ROOT}/alice_tweets.json
//! logging:
//!   format: json
//!   stderr: true
//!   filter: "sift_social=debug,info"
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "sift.yaml";
pub const DEFAULT_INPUT_DIR: &str = "./captured_tweets";
pub const DEFAULT_OUTPUT_PATH: &str = "data_combined_tweets.json";
pub const ENV_PREFIX: &str = "SIFT";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Directory holding the capture bundles (`*.json`).
    pub input_dir: PathBuf,
    /// Where the combined dataset is written.
    pub output_path: PathBuf,
    pub logging: LoggingSettings,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            logging: LoggingSettings::default(),
        }
    }
}

impl SiftConfig {
    /// Apply command-line path selections; `None` keeps the loaded value.
    pub fn with_overrides(mut self, input_dir: Option<PathBuf>, output_path: Option<PathBuf>) -> Self {
        if let Some(dir) = input_dir {
            self.input_dir = dir;
        }
        if let Some(path) = output_path {
            self.output_path = path;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log directory; `None` defers to `SIFT_LOG_DIR` and then `~/.local/share/sift`.
    pub dir: Option<PathBuf>,
    pub format: LogFormatSetting,
    /// Mirror events to stderr.
    pub stderr: bool,
    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormatSetting::Text,
            stderr: true,
            filter: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Text,
    Json,
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') || s.starts_with('~') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::full(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate; the environment layer is added last in [`load`](Self::load).
pub struct SiftConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiftConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiftConfigLoader {
    /// ```
    /// use sift_config::{SiftConfigLoader, DEFAULT_OUTPUT_PATH};
    ///
    /// let cfg = SiftConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.output_path.to_str(), Some(DEFAULT_OUTPUT_PATH));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent (the default `sift.yaml`).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use sift_config::{LogFormatSetting, SiftConfigLoader};
    ///
    /// let cfg = SiftConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// input_dir: "/data/captures"
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.input_dir.to_str(), Some("/data/captures"));
    /// assert_eq!(cfg.logging.format, LogFormatSetting::Json);
    /// assert!(cfg.logging.stderr);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand placeholders, and deserialize into [`SiftConfig`].
    pub fn load(self) -> Result<SiftConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
