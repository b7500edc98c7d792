use crate::cli::{Cli, DEFAULT_CONFIG_FILE};
use anyhow::{Context, Result};
use hashtally_common::observability::{LogConfig, LogFormat};
use hashtally_config::{HashtallyConfig, HashtallyConfigLoader, LoggingConfig, TwitterConfig};
use hashtally_core::TimelineClient;
use hashtally_social::twitter::TwitterApi;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Load `--config` strictly, or `./hashtally.yaml` when present.
pub fn load_config(cli: &Cli) -> Result<HashtallyConfig> {
    let loader = match &cli.config {
        Some(path) => HashtallyConfigLoader::new().with_file(path),
        None => HashtallyConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("failed to load configuration")
}

pub fn log_config(cfg: &LoggingConfig, verbose: bool) -> Result<LogConfig> {
    let format: LogFormat = cfg.format.parse()?;
    Ok(LogConfig {
        app_name: "hashtally",
        log_dir: cfg.dir.as_deref().map(PathBuf::from),
        emit_stderr: cfg.stderr || verbose,
        format,
        default_filter: if verbose {
            "debug".to_string()
        } else {
            cfg.level.clone()
        },
    })
}

pub fn build_timeline_client(cfg: &TwitterConfig) -> Result<Arc<dyn TimelineClient>> {
    let token = cfg
        .bearer_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .context("no Twitter bearer token configured (set twitter.bearer_token or HASHTALLY_TWITTER__BEARER_TOKEN)")?;

    let api = TwitterApi::with_base_url(&cfg.base_url, token)
        .with_context(|| format!("invalid Twitter base URL {:?}", cfg.base_url))?
        .with_timeout(Duration::from_secs(cfg.timeout_secs))
        .with_retries(cfg.retries);
    Ok(Arc::new(api))
}
