use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Canonical identity of an episode as recovered from a filename or feed title.
///
/// Two identities refer to the same episode when [`EpisodeIdentity::key`]
/// matches; `description` is informational only.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EpisodeIdentity {
    pub show_name: String,

    pub season: u32,

    pub episode: u32,

    pub description: Option<String>,
}

impl EpisodeIdentity {
    #[must_use]
    pub fn key(&self) -> EpisodeKey {
        EpisodeKey::new(&self.show_name, self.season, self.episode)
    }
}

impl fmt::Display for EpisodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Season {} - Episode {}",
            self.show_name, self.season, self.episode
        )
    }
}

/// Composite key of the library index.
///
/// The show name is compared exactly as extracted: no case folding and no
/// whitespace normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    pub show: String,
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    #[must_use]
    pub fn new(show: &str, season: u32, episode: u32) -> Self {
        Self {
            show: show.to_string(),
            season,
            episode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonKey {
    pub show: String,
    pub season: u32,
}

impl SeasonKey {
    #[must_use]
    pub fn new(show: &str, season: u32) -> Self {
        Self {
            show: show.to_string(),
            season,
        }
    }
}

/// An episode file found on disk during a library scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEpisodeRecord {
    pub full_path: PathBuf,

    pub title: String,
}

/// Season and episode numbers may reach the index either as integers or as the
/// digit strings they were captured from. Both forms resolve to the same key.
pub trait IndexNumber {
    fn index_number(&self) -> Option<u32>;
}

impl IndexNumber for u32 {
    fn index_number(&self) -> Option<u32> {
        Some(*self)
    }
}

impl IndexNumber for i32 {
    fn index_number(&self) -> Option<u32> {
        u32::try_from(*self).ok()
    }
}

impl IndexNumber for u64 {
    fn index_number(&self) -> Option<u32> {
        u32::try_from(*self).ok()
    }
}

impl IndexNumber for usize {
    fn index_number(&self) -> Option<u32> {
        u32::try_from(*self).ok()
    }
}

impl IndexNumber for str {
    fn index_number(&self) -> Option<u32> {
        self.trim().parse().ok()
    }
}

impl IndexNumber for String {
    fn index_number(&self) -> Option<u32> {
        self.as_str().index_number()
    }
}

impl<T: IndexNumber + ?Sized> IndexNumber for &T {
    fn index_number(&self) -> Option<u32> {
        (**self).index_number()
    }
}
