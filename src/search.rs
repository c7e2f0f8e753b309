//! Search form validation

use std::fmt;

use thiserror::Error;

/// Search query rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The query is empty or whitespace.
    #[error("Please enter a search term")]
    Empty,
}

/// A non-empty, trimmed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Returns the query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates the search box contents before the form is submitted.
///
/// # Errors
///
/// Returns [`SearchError::Empty`] if nothing but whitespace was entered.
pub fn validate_query(raw: &str) -> Result<SearchQuery, SearchError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(SearchError::Empty);
    }

    Ok(SearchQuery(trimmed.to_string()))
}
