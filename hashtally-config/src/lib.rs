//! Loader for hashtally configuration: YAML files + environment overlay.
//!
//! Sources are merged in the order they are added, and `HASHTALLY_`-prefixed
//! environment variables are applied last so they always win. Nested keys use
//! `__`, e.g. `HASHTALLY_TWITTER__BEARER_TOKEN` sets `twitter.bearer_token`.
//! String values may reference other variables as `${VAR}`; expansion recurses
//! up to a fixed depth.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "HASHTALLY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HashtallyConfig {
    pub version: Option<String>,
    pub twitter: TwitterConfig,
    pub aggregate: AggregateConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub bearer_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// HTTP-level retries for 429/5xx; the aggregation itself never retries.
    pub retries: usize,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            base_url: "https://api.twitter.com".into(),
            timeout_secs: 15,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub max_posts: u64,
    pub page_size: u32,
    pub filter_tags: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            max_posts: 500,
            page_size: 200,
            filter_tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` overrides it.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
    pub dir: Option<String>,
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            dir: None,
            stderr: false,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
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

/// Builder over the `config` crate wiring.
pub struct HashtallyConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for HashtallyConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HashtallyConfigLoader {
    /// Start with no files; the environment overlay is added by [`Self::load`].
    ///
    /// ```
    /// use hashtally_config::HashtallyConfigLoader;
    ///
    /// let config = HashtallyConfigLoader::new()
    ///     .with_yaml_str("version: '1'\naggregate:\n  max_posts: 50")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.aggregate.max_posts, 50);
    /// assert_eq!(config.aggregate.page_size, 200);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Apply the environment overlay, expand `${VAR}` and deserialize.
    ///
    /// ```
    /// use hashtally_config::HashtallyConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_BEARER", "injected-from-env"); }
    ///
    /// let config = HashtallyConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  bearer_token: \"${DOC_BEARER}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.twitter.bearer_token.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.twitter.base_url, "https://api.twitter.com");
    ///
    /// unsafe { std::env::remove_var("DOC_BEARER"); }
    /// ```
    pub fn load(self) -> Result<HashtallyConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Re-read through `config` so env strings like "50" still fill numeric fields.
        Config::builder()
            .add_source(File::from_str(&v.to_string(), FileFormat::Json))
            .build()?
            .try_deserialize()
    }
}
