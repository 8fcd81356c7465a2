use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use log::info;

use playstore_review_tracker::config::Config;
use playstore_review_tracker::notify::Notifier;
use playstore_review_tracker::pipeline::Harvester;
use playstore_review_tracker::scraper::Fetcher;
use playstore_review_tracker::storage::SledStore;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().wrap_err("failed to load config")?;
    let store = SledStore::open(&config.storage_path)
        .wrap_err_with(|| format!("failed to open {}", config.storage_path.display()))?;
    let fetcher = Fetcher::new(&config)?;
    fetcher
        .ensure_app_exists(&config.app_id)
        .wrap_err("failed to validate APP_ID")?;

    let notifier = Notifier::new(fetcher.client().clone(), &config);
    let harvester = Harvester::new(config.app_id, fetcher, notifier, store);
    let summary = harvester.run()?;

    info!(
        "done: {} extracted, {} new, {} posted",
        summary.extracted, summary.new, summary.notified
    );
    Ok(())
}
