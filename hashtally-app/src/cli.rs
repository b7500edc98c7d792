use clap::{Parser, ValueEnum};
use hashtally_config::AggregateConfig;
use hashtally_core::AggregateOptions;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "hashtally.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Count the hashtags an account used on its recent timeline.
#[derive(Debug, Parser)]
#[command(name = "hashtally", version)]
pub struct Cli {
    /// Account handle, with or without the leading '@'.
    pub handle: String,

    /// Configuration file. Defaults to ./hashtally.yaml when present.
    #[arg(short, long, env = "HASHTALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only count this tag (repeatable, '#' optional). Overrides the config list.
    #[arg(short = 't', long = "filter", value_name = "TAG")]
    pub filter: Vec<String>,

    /// Maximum number of posts to read.
    #[arg(long)]
    pub max_posts: Option<u64>,

    /// Posts requested per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log at debug level and mirror logs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Handle as the platform expects it: trimmed, no '@'.
    pub fn handle(&self) -> &str {
        let h = self.handle.trim();
        h.strip_prefix('@').unwrap_or(h)
    }

    /// Command-line values win over the configured defaults.
    pub fn aggregate_options(&self, cfg: &AggregateConfig) -> AggregateOptions {
        let tags = if self.filter.is_empty() {
            &cfg.filter_tags
        } else {
            &self.filter
        };
        AggregateOptions::default()
            .with_filter_tags(
                tags.iter()
                    .map(|t| t.trim().trim_start_matches('#').to_string())
                    .filter(|t| !t.is_empty()),
            )
            .with_max_posts(self.max_posts.unwrap_or(cfg.max_posts))
            .with_page_size(self.page_size.unwrap_or(cfg.page_size))
    }
}
