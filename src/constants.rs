pub mod metrics {

    pub const FEED_ITEMS_TOTAL: &str = "showscout_feed_items_total";

    pub const SHOW_FAILURES_TOTAL: &str = "showscout_show_failures_total";

    pub const SHOWS_PROCESSED_TOTAL: &str = "showscout_shows_processed_total";
}
