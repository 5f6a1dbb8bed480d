mod builder;
mod config;
mod error;
mod generator;
mod model;
mod seed;
mod store;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feud_common::suggest::SuggestClient;

use config::Config;
use generator::Generator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting feud data generation");

    // 1. Load config; a missing seed file ends the run here
    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "cannot start");
    })?;
    info!(
        data_dir = %config.data_dir.display(),
        scope = ?config.scope,
        target_count = config.target_count,
        base_url = %config.suggest.base_url,
        max_retries = config.suggest.max_retries,
        "configuration loaded"
    );

    // 2. Load seed queries
    let seeds = seed::load_seed_data(&config.seed_path())?;
    info!(
        categories = seeds.len(),
        queries = seeds.query_count(),
        "loaded seed data"
    );
    if seeds.is_empty() {
        warn!("seed file has no categories, nothing to do");
    }

    // 3. Build the suggestion client and run the batch
    let client = SuggestClient::from_config(config.suggest.clone())?;
    let mut generator = Generator::new(config, client);
    let summary = generator.run(&seeds).await;

    for report in &summary.categories {
        info!(
            category = %report.name,
            successful = report.successful,
            queries = report.queries,
            written = report.output.is_some(),
            "category summary"
        );
    }
    if !summary.skipped.is_empty() {
        warn!(
            skipped = ?summary.skipped,
            "categories not processed; set FEUD_CATEGORY_SCOPE=all to include them"
        );
    }
    info!(
        total_requests = generator.client().request_count(),
        files = summary.files_written(),
        "done"
    );
    Ok(())
}
