//! Classification of feed items against the library index.

use crate::constants::metrics::FEED_ITEMS_TOTAL;
use crate::library::{LibraryIndex, MediaFs, ShowScanStats};
use crate::models::{EpisodeIdentity, FeedItem};
use crate::parser::{TitleRule, parse_title_with_rule};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a single feed item means for the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "identity", rename_all = "snake_case")]
pub enum Outcome {
    Unparsable,
    AlreadyHeld(EpisodeIdentity),
    Needed(EpisodeIdentity),
}

impl Outcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unparsable => "unparsable",
            Self::AlreadyHeld(_) => "already_held",
            Self::Needed(_) => "needed",
        }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&EpisodeIdentity> {
        match self {
            Self::Unparsable => None,
            Self::AlreadyHeld(id) | Self::Needed(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub item: FeedItem,
    pub outcome: Outcome,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub items: usize,
    pub already_held: usize,
    pub needed: usize,
    pub unparsable: usize,
    /// Parsed items whose show name differs from the show being checked.
    pub foreign_show: usize,
}

impl ReconcileStats {
    fn record(&mut self, outcome: &Outcome) {
        self.items += 1;
        match outcome {
            Outcome::Unparsable => self.unparsable += 1,
            Outcome::AlreadyHeld(_) => self.already_held += 1,
            Outcome::Needed(_) => self.needed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowReport {
    pub show: String,
    pub scan: ShowScanStats,
    pub results: Vec<ItemResult>,
    pub stats: ReconcileStats,
}

impl ShowReport {
    pub fn needed(&self) -> impl Iterator<Item = &ItemResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Needed(_)))
    }
}

/// Classifies one feed title.
pub fn classify<F: MediaFs>(index: &LibraryIndex<F>, title: &str) -> Outcome {
    classify_with_rule(index, title).0
}

fn classify_with_rule<F: MediaFs>(
    index: &LibraryIndex<F>,
    title: &str,
) -> (Outcome, Option<TitleRule>) {
    let Some((identity, rule)) = parse_title_with_rule(title) else {
        return (Outcome::Unparsable, None);
    };

    let outcome = if index.contains(&identity.key()) {
        Outcome::AlreadyHeld(identity)
    } else {
        Outcome::Needed(identity)
    };
    (outcome, Some(rule))
}

/// Classifies every item of a show's feed, in feed order.
///
/// Items are never deduplicated and an unparsable title never stops the
/// remaining items from being checked.
pub fn reconcile_items<F, I>(index: &LibraryIndex<F>, show_name: &str, items: I) -> ShowReport
where
    F: MediaFs,
    I: IntoIterator<Item = FeedItem>,
{
    let mut stats = ReconcileStats::default();
    let mut results = Vec::new();

    for item in items {
        let (outcome, rule) = classify_with_rule(index, &item.title);
        let rule = rule.map_or("none", TitleRule::name);

        match &outcome {
            Outcome::Unparsable => {
                warn!(
                    show = show_name,
                    title = %item.title,
                    "Failure to parse title: {}",
                    item.title
                );
            }
            Outcome::AlreadyHeld(id) => {
                info!(show = show_name, title = %item.title, rule, "Has {id}");
            }
            Outcome::Needed(id) => {
                info!(
                    show = show_name,
                    title = %item.title,
                    link = %item.link,
                    rule,
                    "Needs {id}"
                );
            }
        }

        if let Some(id) = outcome.identity()
            && id.show_name != show_name
        {
            debug!(
                show = show_name,
                parsed_show = %id.show_name,
                "Feed title names a different show; matched without normalisation"
            );
            stats.foreign_show += 1;
        }

        metrics::counter!(FEED_ITEMS_TOTAL, "outcome" => outcome.label()).increment(1);
        stats.record(&outcome);
        results.push(ItemResult { item, outcome });
    }

    ShowReport {
        show: show_name.to_string(),
        scan: ShowScanStats::default(),
        results,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LibraryConfig;
    use std::path::Path;

    fn indexed_foo(root: &Path) -> LibraryIndex {
        let season = root.join("Foo/Season 1");
        std::fs::create_dir_all(&season).unwrap();
        std::fs::write(season.join("Foo - Season 1 - Episode 01 - X.mkv"), "").unwrap();

        let mut index = LibraryIndex::with_local_fs(LibraryConfig {
            root_path: root.to_path_buf(),
            shows: vec!["Foo".to_string()],
            folder_mode: 0o755,
            folder_uid: None,
            folder_gid: None,
        });
        index.build_index("Foo").unwrap();
        index
    }

    #[test]
    fn test_classify() {
        let dir = tempfile::tempdir().unwrap();
        let index = indexed_foo(dir.path());

        assert!(matches!(classify(&index, "Foo 1x01 X"), Outcome::AlreadyHeld(_)));
        assert!(matches!(classify(&index, "Foo 1x02 Y"), Outcome::Needed(_)));
        assert_eq!(classify(&index, "###not a title###"), Outcome::Unparsable);
    }

    #[test]
    fn test_reconcile_keeps_going_after_unparsable() {
        let dir = tempfile::tempdir().unwrap();
        let index = indexed_foo(dir.path());

        let items = vec![
            FeedItem::new("###not a title###", ""),
            FeedItem::new("Foo 1x01 X", "a"),
            FeedItem::new("Foo 1x02 Y", "b"),
        ];
        let report = reconcile_items(&index, "Foo", items);

        let labels: Vec<_> = report.results.iter().map(|r| r.outcome.label()).collect();
        assert_eq!(labels, vec!["unparsable", "already_held", "needed"]);
        assert_eq!(report.stats.items, 3);
        assert_eq!(report.stats.unparsable, 1);
        assert_eq!(report.stats.already_held, 1);
        assert_eq!(report.stats.needed, 1);
        assert_eq!(report.needed().count(), 1);
    }

    #[test]
    fn test_no_deduplication() {
        let dir = tempfile::tempdir().unwrap();
        let index = indexed_foo(dir.path());

        let items = vec![
            FeedItem::new("Foo 1x02 720p", "a"),
            FeedItem::new("Foo 1x02 1080p", "b"),
        ];
        let report = reconcile_items(&index, "Foo", items);
        assert_eq!(report.stats.needed, 2);
    }

    #[test]
    fn test_show_name_is_not_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let index = indexed_foo(dir.path());

        let report = reconcile_items(&index, "Foo", vec![FeedItem::new("foo 1x01 X", "")]);
        assert_eq!(report.stats.needed, 1);
        assert_eq!(report.stats.foreign_show, 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::Needed(EpisodeIdentity {
            show_name: "Foo".to_string(),
            season: 1,
            episode: 2,
            description: None,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "needed");
        assert_eq!(json["identity"]["episode"], 2);
    }
}
