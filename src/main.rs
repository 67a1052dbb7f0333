mod cli;
mod extract;
mod filter;
mod models;
mod pipeline;
mod plot;
mod scrapers;
mod store;

use std::io;

use anyhow::Context;
use clap::Parser;
use cli::Opts;
use extract::Extractor;
use pipeline::Driver;
use scrapers::{BrowserGroupScraper, GroupSource, HttpGroupScraper};
use store::PostStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();
    let modes = opts.modes();
    let window = opts.filter_window();
    let params = opts.group_params();
    let extractor = Extractor::new(&opts.extract_rules())?;

    info!("🏠 Rental Scout");
    info!(
        scrape = modes.scrape,
        display = modes.display,
        plot = modes.plot,
        min_price = window.min_price,
        max_price = window.max_price,
        min_rooms = window.min_rooms,
        max_rooms = window.max_rooms,
        "Run configuration"
    );

    let store = PostStore::open(&opts.database)?;
    let driver = Driver::new(&store, &extractor, window);

    let make_source = || -> anyhow::Result<Box<dyn GroupSource>> {
        let credentials = params.credentials.as_ref();
        if opts.browser {
            Ok(Box::new(BrowserGroupScraper::new(
                credentials,
                opts.debug_dir.clone(),
            )?))
        } else {
            Ok(Box::new(HttpGroupScraper::new(credentials)?))
        }
    };

    let mut stdout = io::stdout().lock();
    let shown = driver
        .run(modes, &params, &opts.plot_output, make_source, &mut stdout)
        .await?;

    if let Some(path) = &opts.export {
        let json = serde_json::to_string_pretty(&shown)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} posts to {}", shown.len(), path.display());
    }

    store.close()?;
    Ok(())
}
