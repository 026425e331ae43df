//! Per-show driver: index the library, fetch the feed, classify the items.

use crate::clients::{FeedClient, FeedError, FeedSource, parse_feed};
use crate::config::Config;
use crate::constants::metrics::{SHOW_FAILURES_TOTAL, SHOWS_PROCESSED_TOTAL};
use crate::library::{LibraryError, LibraryIndex, LocalFs, MediaFs};
use crate::services::reconcile::{ReconcileStats, ShowReport, reconcile_items};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Anything that stops one show from being checked. Never stops the run.
#[derive(Debug, Error)]
pub enum ShowError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl ShowError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Library(_) => "filesystem",
            Self::Feed(e) => e.kind(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowFailure {
    pub show: String,
    pub kind: &'static str,
    pub error: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub reports: Vec<ShowReport>,
    pub failures: Vec<ShowFailure>,
}

impl RunSummary {
    /// Item counts summed over every successfully checked show.
    #[must_use]
    pub fn totals(&self) -> ReconcileStats {
        let mut totals = ReconcileStats::default();
        for report in &self.reports {
            totals.items += report.stats.items;
            totals.already_held += report.stats.already_held;
            totals.needed += report.stats.needed;
            totals.unparsable += report.stats.unparsable;
            totals.foreign_show += report.stats.foreign_show;
        }
        totals
    }

    #[must_use]
    pub fn report_for(&self, show: &str) -> Option<&ShowReport> {
        self.reports.iter().find(|r| r.show == show)
    }
}

pub struct ShowScout<S, F = LocalFs> {
    config: Config,
    source: S,
    fs: F,
}

impl ShowScout<FeedClient, LocalFs> {
    /// Builds a scout using the HTTP feed client and the local disk.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let source = FeedClient::new(&config.feed)?;
        let fs = LocalFs::from_config(&config.library);
        Ok(Self::new(config, source, fs))
    }
}

impl<S, F> ShowScout<S, F>
where
    S: FeedSource,
    F: MediaFs + Clone,
{
    pub const fn new(config: Config, source: S, fs: F) -> Self {
        Self { config, source, fs }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Checks every configured show in order. A failing show is logged,
    /// counted and recorded; the remaining shows are still checked.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for show in &self.config.library.shows {
            match self.process_show(show).await {
                Ok(report) => {
                    metrics::counter!(SHOWS_PROCESSED_TOTAL).increment(1);
                    summary.reports.push(report);
                }
                Err(e) => {
                    warn!(show = %show, kind = e.kind(), error = %e, "ERROR PROCESSING SHOW");
                    metrics::counter!(SHOW_FAILURES_TOTAL, "kind" => e.kind()).increment(1);
                    summary.failures.push(ShowFailure {
                        show: show.clone(),
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    /// Checks a single show against a freshly built index of its folder.
    ///
    /// # Errors
    /// Returns an error if the show folder cannot be created or read, or the
    /// feed cannot be fetched or parsed.
    pub async fn process_show(&self, show: &str) -> Result<ShowReport, ShowError> {
        info!(show, "Processing {show}");

        let mut index = LibraryIndex::new(self.config.library.clone(), self.fs.clone());
        index.ensure_show_directory(show)?;
        let scan = index.build_index(show)?;

        let url = self.config.feed.url_for_show(show);
        debug!(show, url = %url, "Fetching feed");
        let document = self.source.fetch(&url).await?;
        let items = parse_feed(&document)?;
        debug!(show, items = items.len(), "Feed parsed");

        let mut report = reconcile_items(&index, show, items);
        report.scan = scan;
        Ok(report)
    }
}
