use log::info;

use crate::dedup::persist_new_reviews;
use crate::error::Error;
use crate::notify::Notifier;
use crate::review::Reviews;
use crate::scraper::{Fetcher, extract_from_html};
use crate::storage::ReviewStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub extracted: usize,
    pub new: usize,
    pub notified: usize,
}

/// One app's review harvest: fetch, extract, deduplicate, notify.
pub struct Harvester<S> {
    app_id: String,
    fetcher: Fetcher,
    notifier: Notifier,
    store: S,
}

impl<S: ReviewStore> Harvester<S> {
    pub fn new(app_id: impl Into<String>, fetcher: Fetcher, notifier: Notifier, store: S) -> Self {
        Self {
            app_id: app_id.into(),
            fetcher,
            notifier,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Extracts reviews from `html` and persists the unseen ones, which are
    /// returned newest first. Returns the extracted count alongside.
    pub fn collect_new(&self, html: &str) -> Result<(usize, Reviews), Error> {
        let reviews = extract_from_html(html)?;
        let extracted = reviews.len();
        info!("extracted {extracted} reviews");

        let persisted = persist_new_reviews(reviews, &self.store);
        // flush even when the batch failed halfway so earlier inserts stay durable
        let flushed = self.store.flush();
        let new_reviews = persisted?;
        flushed?;
        info!("{} of {extracted} reviews are new", new_reviews.len());
        Ok((extracted, new_reviews))
    }

    pub fn run(&self) -> Result<RunSummary, Error> {
        info!("start getting reviews for {}", self.app_id);
        let html = self.fetcher.fetch_listing(&self.app_id)?;
        let (extracted, new_reviews) = self.collect_new(&html)?;
        let notified = self.notifier.send(&new_reviews)?;
        Ok(RunSummary {
            extracted,
            new: new_reviews.len(),
            notified,
        })
    }
}
