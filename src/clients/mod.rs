pub mod feed;

pub use feed::{FeedClient, FeedError, FeedSource, parse_feed};
