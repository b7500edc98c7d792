use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, OutputFormat};
use hashtally_common::observability::init_logging;
use hashtally_core::HashtagAggregator;

mod cli;
mod report;
mod wiring;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config (env wins over file)
    let cfg = wiring::load_config(&cli)?;

    // 2) Logging
    let log_path = init_logging(wiring::log_config(&cfg.logging, cli.verbose)?)?;
    tracing::debug!(log_path = %log_path.display(), "logging initialised");

    // 3) Run
    let client = wiring::build_timeline_client(&cfg.twitter)?;
    let aggregator = HashtagAggregator::new(client);
    let handle = cli.handle();
    let opts = cli.aggregate_options(&cfg.aggregate);

    let result = aggregator
        .aggregate_with(handle, &opts)
        .await
        .with_context(|| format!("failed to count hashtags for @{handle}"))?;

    let rendered = match cli.format {
        OutputFormat::Text => report::render_text(&result),
        OutputFormat::Json => report::render_json(&result)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
