use serde::{Deserialize, Serialize};

/// One candidate release announced by a search feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,
}

impl FeedItem {
    #[must_use]
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
        }
    }
}
