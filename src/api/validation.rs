use url::Url;

use super::ApiError;
use crate::constants::limits;
use crate::models::{Category, TimeRange};

pub fn validate_query_text(text: Option<&str>) -> Result<String, ApiError> {
    let trimmed = text.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid("Search query cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// The only supported response format is JSON; the parameter exists for
/// compatibility with meta-search query strings.
pub fn validate_format(format: Option<&str>) -> Result<(), ApiError> {
    match format {
        None | Some("json") => Ok(()),
        Some(other) => Err(ApiError::invalid(format!(
            "Unsupported format: '{}'. Only 'json' is available",
            other
        ))),
    }
}

pub fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(1);
    };

    let page: u32 = raw
        .parse()
        .map_err(|_| ApiError::invalid(format!("Invalid pageno: '{}'", raw)))?;

    if page < 1 {
        return Err(ApiError::invalid("pageno must be >= 1"));
    }
    Ok(page)
}

/// Parses a comma-separated category list into a sorted, deduplicated set.
pub fn parse_categories(raw: Option<&str>) -> Result<Vec<Category>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut categories = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let category = Category::parse(name)
            .ok_or_else(|| ApiError::invalid(format!("Unknown category: '{}'", name)))?;
        categories.push(category);
    }

    categories.sort_unstable();
    categories.dedup();
    Ok(categories)
}

pub fn parse_time_range(raw: Option<&str>) -> Result<Option<TimeRange>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => TimeRange::parse(raw)
            .map(Some)
            .ok_or_else(|| ApiError::invalid(format!("Unknown time_range: '{}'", raw))),
    }
}

pub fn parse_bool(raw: Option<&str>, name: &str) -> Result<bool, ApiError> {
    match raw {
        None => Ok(false),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(ApiError::invalid(format!(
            "Invalid {}: '{}'. Expected true or false",
            name, other
        ))),
    }
}

/// When compression is requested the instruction is mandatory and non-empty.
pub fn validate_instruction(
    compress: bool,
    instruction: Option<&str>,
) -> Result<Option<String>, ApiError> {
    if !compress {
        return Ok(None);
    }

    let trimmed = instruction.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid(
            "compress=true requires a non-empty instruction",
        ));
    }
    Ok(Some(trimmed.to_string()))
}

pub fn validate_url(raw: &str) -> Result<Url, ApiError> {
    let url =
        Url::parse(raw).map_err(|_| ApiError::invalid(format!("Malformed URL: '{}'", raw)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::invalid(format!(
            "Unsupported URL scheme: '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

pub fn validate_crawl_timeout(raw: Option<u64>, default: u64) -> Result<u64, ApiError> {
    let timeout = raw.unwrap_or(default);
    if !limits::CRAWL_TIMEOUT_RANGE.contains(&timeout) {
        return Err(ApiError::invalid(format!(
            "timeout must be between {} and {} seconds",
            limits::CRAWL_TIMEOUT_RANGE.start(),
            limits::CRAWL_TIMEOUT_RANGE.end()
        )));
    }
    Ok(timeout)
}
