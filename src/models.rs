use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Search categories understood by the meta-search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Images,
    News,
    Videos,
    Science,
    Files,
    It,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::News => "news",
            Self::Videos => "videos",
            Self::Science => "science",
            Self::Files => "files",
            Self::It => "it",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "images" => Some(Self::Images),
            "news" => Some(Self::News),
            "videos" => Some(Self::Videos),
            "science" => Some(Self::Science),
            "files" => Some(Self::Files),
            "it" => Some(Self::It),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// A validated search request. Built once per inbound request and discarded
/// with the response.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub page: u32,
    /// Sorted and deduplicated; empty means "backend default".
    pub categories: Vec<Category>,
    pub time_range: Option<TimeRange>,
}

/// One result row, in the relevance order the backend produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A validated page-fetch request.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: Url,
    pub css_selector: Option<String>,
    /// CSS selector the scrape backend should wait for before extracting.
    pub wait_for: Option<String>,
    /// Upper bound on the scrape call, in seconds.
    pub timeout: u64,
}

/// Rendered-page content as returned by the scrape backend.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub markdown: String,
    pub metadata: BTreeMap<String, String>,
    pub links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for name in ["images", "news", "videos", "science", "files", "it"] {
            let cat = Category::parse(name).unwrap();
            assert_eq!(cat.as_str(), name);
        }
        assert!(Category::parse("general").is_none());
        assert!(Category::parse("Images").is_none());
        assert!(Category::parse("").is_none());
    }

    #[test]
    fn test_time_range_round_trip() {
        for name in ["day", "week", "month", "year"] {
            let range = TimeRange::parse(name).unwrap();
            assert_eq!(range.as_str(), name);
        }
        assert!(TimeRange::parse("decade").is_none());
    }
}
