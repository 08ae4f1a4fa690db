pub mod cache {

    pub const SEARCH_TTL_SECONDS: u64 = 300;

    pub const CRAWL_TTL_SECONDS: u64 = 3600;

    pub const MAX_ENTRIES: usize = 1024;
}

pub mod limits {
    use std::ops::RangeInclusive;

    /// Character budget for payloads handed to the summarization backend.
    pub const MAX_PAYLOAD_CHARS: usize = 24_000;

    pub const DEFAULT_CRAWL_TIMEOUT_SECONDS: u64 = 30;

    /// Accepted `timeout` values for crawl requests, matching the bounds the
    /// scrape backend itself enforces.
    pub const CRAWL_TIMEOUT_RANGE: RangeInclusive<u64> = 5..=120;
}
