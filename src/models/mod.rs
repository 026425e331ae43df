pub mod episode;
pub mod feed;

pub use episode::{EpisodeIdentity, EpisodeKey, IndexNumber, LocalEpisodeRecord, SeasonKey};
pub use feed::FeedItem;
