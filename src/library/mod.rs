mod fs;

use crate::config::LibraryConfig;
use crate::models::{EpisodeKey, IndexNumber, LocalEpisodeRecord, SeasonKey};
use crate::parser::{ShowFilePattern, parse_season_folder};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub use fs::{LocalFs, MediaFs};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to create show directory {path}: {source}")]
    CreateShowDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot build filename pattern for show '{show}': {source}")]
    Pattern {
        show: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ShowScanStats {
    pub seasons: usize,
    pub files_seen: usize,
    pub episodes: usize,
}

/// In-memory view of the episodes already present in the library.
///
/// Rebuilt from the filesystem every run. Each show's entries are only ever
/// written by [`LibraryIndex::build_index`] for that show.
pub struct LibraryIndex<F = LocalFs> {
    config: LibraryConfig,
    fs: F,
    shows: HashSet<String>,
    seasons: BTreeSet<SeasonKey>,
    episodes: HashMap<EpisodeKey, LocalEpisodeRecord>,
}

impl LibraryIndex<LocalFs> {
    #[must_use]
    pub fn with_local_fs(config: LibraryConfig) -> Self {
        let fs = LocalFs::from_config(&config);
        Self::new(config, fs)
    }
}

impl<F: MediaFs> LibraryIndex<F> {
    pub fn new(config: LibraryConfig, fs: F) -> Self {
        Self {
            config,
            fs,
            shows: HashSet::new(),
            seasons: BTreeSet::new(),
            episodes: HashMap::new(),
        }
    }

    /// Creates the show folder when it is missing. Returns whether it was created.
    ///
    /// # Errors
    /// Returns an error if the folder does not exist and cannot be created.
    pub fn ensure_show_directory(&self, show_name: &str) -> Result<bool, LibraryError> {
        let path = self.config.show_path(show_name);
        if self.fs.directory_exists(&path) {
            return Ok(false);
        }

        info!(show = show_name, path = %path.display(), "Creating show directory");
        self.fs
            .create_directory(&path)
            .map_err(|source| LibraryError::CreateShowDirectory { path, source })?;
        Ok(true)
    }

    /// Indexes every `Season <n>` folder of a show, replacing anything
    /// previously indexed for it.
    ///
    /// # Errors
    /// Returns an error if the show folder or one of its season folders
    /// cannot be listed.
    pub fn build_index(&mut self, show_name: &str) -> Result<ShowScanStats, LibraryError> {
        info!(show = show_name, "Parsing {show_name}");

        let pattern = ShowFilePattern::new(show_name).map_err(|source| LibraryError::Pattern {
            show: show_name.to_string(),
            source,
        })?;

        let show_path = self.config.show_path(show_name);
        let entries = self.list(&show_path)?;

        self.forget_show(show_name);
        self.shows.insert(show_name.to_string());

        let mut stats = ShowScanStats::default();
        for entry in entries {
            let Some(season) = parse_season_folder(&entry) else {
                continue;
            };

            let season_path = show_path.join(&entry);
            let (files, episodes) = self.scan_season_dir(&pattern, season, &season_path)?;
            stats.seasons += 1;
            stats.files_seen += files;
            stats.episodes += episodes;
        }

        debug!(
            show = show_name,
            seasons = stats.seasons,
            files = stats.files_seen,
            episodes = stats.episodes,
            "Show indexed"
        );
        Ok(stats)
    }

    /// Indexes the `Season <season>` folder of a show on its own. Returns the
    /// number of episodes found.
    ///
    /// # Errors
    /// Returns an error if the season folder exists but cannot be listed.
    pub fn scan_season(&mut self, show_name: &str, season: u32) -> Result<usize, LibraryError> {
        let pattern = ShowFilePattern::new(show_name).map_err(|source| LibraryError::Pattern {
            show: show_name.to_string(),
            source,
        })?;

        let season_path = self
            .config
            .show_path(show_name)
            .join(format!("Season {season}"));

        self.shows.insert(show_name.to_string());
        let (_, episodes) = self.scan_season_dir(&pattern, season, &season_path)?;
        Ok(episodes)
    }

    fn scan_season_dir(
        &mut self,
        pattern: &ShowFilePattern,
        season: u32,
        season_path: &Path,
    ) -> Result<(usize, usize), LibraryError> {
        let show_name = pattern.show_name();
        info!(show = show_name, season, "Parsing {show_name} Season {season}");

        self.seasons.insert(SeasonKey::new(show_name, season));

        if !self.fs.directory_exists(season_path) {
            debug!(
                path = %season_path.display(),
                "Season entry is not a directory, treating as empty"
            );
            return Ok((0, 0));
        }

        let entries = self.list(season_path)?;
        let files = entries.len();
        let mut episodes = 0;

        for entry in entries {
            let Some(found) = pattern.parse(&entry) else {
                debug!(file = %entry, "Skipping unrecognised file");
                continue;
            };

            if found.season != season {
                debug!(
                    file = %entry,
                    folder_season = season,
                    file_season = found.season,
                    "File season differs from folder, indexing under folder season"
                );
            }

            let key = EpisodeKey::new(show_name, season, found.episode);
            let record = LocalEpisodeRecord {
                full_path: season_path.join(&entry),
                title: found.title,
            };

            if let Some(previous) = self.episodes.insert(key, record) {
                debug!(
                    file = %entry,
                    replaced = %previous.full_path.display(),
                    "Episode already indexed from another file, keeping the later one"
                );
            } else {
                episodes += 1;
            }
        }

        Ok((files, episodes))
    }

    fn list(&self, path: &Path) -> Result<Vec<String>, LibraryError> {
        self.fs
            .list_directory_entries(path)
            .map_err(|source| LibraryError::ReadDirectory {
                path: path.to_path_buf(),
                source,
            })
    }

    fn forget_show(&mut self, show_name: &str) {
        self.shows.remove(show_name);
        self.seasons.retain(|k| k.show != show_name);
        self.episodes.retain(|k, _| k.show != show_name);
    }

    /// Whether the episode is present. Season and episode may be given as
    /// integers or digit strings. Unknown shows and seasons are simply absent.
    #[must_use]
    pub fn has_episode<S, E>(&self, show_name: &str, season: S, episode: E) -> bool
    where
        S: IndexNumber,
        E: IndexNumber,
    {
        self.get(show_name, season, episode).is_some()
    }

    #[must_use]
    pub fn get<S, E>(
        &self,
        show_name: &str,
        season: S,
        episode: E,
    ) -> Option<&LocalEpisodeRecord>
    where
        S: IndexNumber,
        E: IndexNumber,
    {
        let season = season.index_number()?;
        let episode = episode.index_number()?;
        self.episodes.get(&EpisodeKey::new(show_name, season, episode))
    }

    #[must_use]
    pub fn contains(&self, key: &EpisodeKey) -> bool {
        self.episodes.contains_key(key)
    }

    #[must_use]
    pub fn is_show_indexed(&self, show_name: &str) -> bool {
        self.shows.contains(show_name)
    }

    #[must_use]
    pub fn is_season_indexed<S: IndexNumber>(&self, show_name: &str, season: S) -> bool {
        season
            .index_number()
            .is_some_and(|s| self.seasons.contains(&SeasonKey::new(show_name, s)))
    }

    /// Indexed season numbers of a show, ascending.
    #[must_use]
    pub fn seasons(&self, show_name: &str) -> Vec<u32> {
        self.seasons
            .iter()
            .filter(|k| k.show == show_name)
            .map(|k| k.season)
            .collect()
    }

    #[must_use]
    pub fn episode_count(&self, show_name: &str) -> usize {
        self.episodes.keys().filter(|k| k.show == show_name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> LibraryConfig {
        LibraryConfig {
            root_path: root.to_path_buf(),
            shows: vec!["Foo".to_string()],
            folder_mode: 0o755,
            folder_uid: None,
            folder_gid: None,
        }
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    fn sample_library() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Foo/Season 1/Foo - Season 1 - Episode 01 - X.mkv"));
        touch(&root.join("Foo/Season 1/Foo - Season 1 - Episode 02 - Y.mp4"));
        touch(&root.join("Foo/Season 1/cover.jpg"));
        touch(&root.join("Foo/Season 02/Foo - Season 2 - Episode 10 - Z.mkv"));
        std::fs::create_dir_all(root.join("Foo/Season 3")).unwrap();
        std::fs::create_dir_all(root.join("Foo/Extras")).unwrap();
        dir
    }

    #[test]
    fn test_build_index() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        let stats = index.build_index("Foo").unwrap();
        assert_eq!(stats.seasons, 3);
        assert_eq!(stats.episodes, 3);

        assert!(index.has_episode("Foo", 1, 1));
        assert!(index.has_episode("Foo", 1, 2));
        assert!(index.has_episode("Foo", 2, 10));
        assert!(!index.has_episode("Foo", 1, 3));
        assert_eq!(index.seasons("Foo"), vec![1, 2, 3]);

        let record = index.get("Foo", 1, 1).unwrap();
        assert_eq!(record.title, "X");
        assert!(record.full_path.ends_with("Foo - Season 1 - Episode 01 - X.mkv"));
    }

    #[test]
    fn test_has_episode_accepts_strings() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));
        index.build_index("Foo").unwrap();

        assert!(index.has_episode("Foo", "1", "01"));
        assert!(index.has_episode("Foo", "02", 10u32));
        assert!(index.has_episode("Foo", String::from("2"), "10"));
        assert!(!index.has_episode("Foo", "one", "1"));
    }

    #[test]
    fn test_unknown_show_or_season() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));
        assert!(!index.has_episode("Foo", 1, 1));

        index.build_index("Foo").unwrap();
        assert!(!index.has_episode("Bar", 1, 1));
        assert!(!index.has_episode("Foo", 9, 1));
        assert!(!index.has_episode("foo", 1, 1));
    }

    #[test]
    fn test_empty_season_is_recorded() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));
        index.build_index("Foo").unwrap();

        assert!(index.is_season_indexed("Foo", 3));
        assert!(!index.has_episode("Foo", 3, 1));
    }

    #[test]
    fn test_season_entry_that_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Foo/Season 4"));
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        let stats = index.build_index("Foo").unwrap();
        assert_eq!(stats.seasons, 1);
        assert_eq!(stats.episodes, 0);
        assert!(index.is_season_indexed("Foo", 4));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        index.build_index("Foo").unwrap();
        let first: Vec<bool> = (1..=3)
            .flat_map(|s| (0..=12).map(move |e| (s, e)))
            .map(|(s, e)| index.has_episode("Foo", s, e))
            .collect();

        index.build_index("Foo").unwrap();
        let second: Vec<bool> = (1..=3)
            .flat_map(|s| (0..=12).map(move |e| (s, e)))
            .map(|(s, e)| index.has_episode("Foo", s, e))
            .collect();

        assert_eq!(first, second);
        assert_eq!(index.episode_count("Foo"), 3);
    }

    #[test]
    fn test_rebuild_drops_removed_files() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));
        index.build_index("Foo").unwrap();
        assert!(index.has_episode("Foo", 1, 2));

        std::fs::remove_file(
            dir.path()
                .join("Foo/Season 1/Foo - Season 1 - Episode 02 - Y.mp4"),
        )
        .unwrap();
        index.build_index("Foo").unwrap();
        assert!(!index.has_episode("Foo", 1, 2));
    }

    #[test]
    fn test_season_folder_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            &dir.path()
                .join("Foo/Season 1 (2019)/Foo - Season 1 - Episode 04 - W.mkv"),
        );
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        let stats = index.build_index("Foo").unwrap();
        assert_eq!(stats.seasons, 1);
        assert!(index.has_episode("Foo", 1, 4));
        assert!(
            index
                .get("Foo", 1, 4)
                .unwrap()
                .full_path
                .ends_with("Season 1 (2019)/Foo - Season 1 - Episode 04 - W.mkv")
        );
    }

    #[test]
    fn test_duplicate_episode_keeps_later_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Foo/Season 1/Foo - Season 1 - Episode 01 - A.mkv"));
        touch(&dir.path().join("Foo/Season 1/Foo - Season 1 - Episode 1 - B.mkv"));
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        let stats = index.build_index("Foo").unwrap();
        assert_eq!(stats.files_seen, 2);
        assert_eq!(stats.episodes, 1);
        assert_eq!(index.episode_count("Foo"), 1);
        assert_eq!(index.get("Foo", 1, 1).unwrap().title, "B");
    }

    #[test]
    fn test_scan_single_season() {
        let dir = sample_library();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));

        let found = index.scan_season("Foo", 1).unwrap();
        assert_eq!(found, 2);
        assert!(index.is_show_indexed("Foo"));
        assert!(!index.is_season_indexed("Foo", 2));
    }

    #[test]
    fn test_ensure_show_directory() {
        let dir = tempfile::tempdir().unwrap();
        let index = LibraryIndex::with_local_fs(test_config(dir.path()));

        assert!(index.ensure_show_directory("New Show").unwrap());
        assert!(dir.path().join("New Show").is_dir());
        assert!(!index.ensure_show_directory("New Show").unwrap());
    }

    #[test]
    fn test_ensure_show_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("missing-root"));
        let index = LibraryIndex::with_local_fs(config);

        let err = index.ensure_show_directory("Foo").unwrap_err();
        assert!(matches!(err, LibraryError::CreateShowDirectory { .. }));
    }

    #[test]
    fn test_missing_show_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = LibraryIndex::with_local_fs(test_config(dir.path()));
        let err = index.build_index("Foo").unwrap_err();
        assert!(matches!(err, LibraryError::ReadDirectory { .. }));
    }
}
