//! Search request models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while validating a search request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Keyword must not be empty")]
    EmptyKeyword,

    #[error("Duration must be at least 1 minute, got {0}")]
    InvalidDuration(u32),

    #[error("Unknown {kind} filter: {value}")]
    UnknownFilter { kind: &'static str, value: String },
}

/// Upload date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadDateFilter {
    #[default]
    Any,
    Hour,
    Today,
    Week,
    Month,
}

/// Video length filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LengthFilter {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

/// Result ordering requested from the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
}

impl UploadDateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadDateFilter::Any => "any",
            UploadDateFilter::Hour => "hour",
            UploadDateFilter::Today => "today",
            UploadDateFilter::Week => "week",
            UploadDateFilter::Month => "month",
        }
    }
}

impl LengthFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthFilter::Any => "any",
            LengthFilter::Short => "short",
            LengthFilter::Medium => "medium",
            LengthFilter::Long => "long",
        }
    }
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Date => "date",
            SortBy::ViewCount => "view_count",
            SortBy::Rating => "rating",
        }
    }
}

impl FromStr for UploadDateFilter {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "" => Ok(UploadDateFilter::Any),
            "hour" => Ok(UploadDateFilter::Hour),
            "today" => Ok(UploadDateFilter::Today),
            "week" => Ok(UploadDateFilter::Week),
            "month" => Ok(UploadDateFilter::Month),
            other => Err(RequestError::UnknownFilter {
                kind: "upload date",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for LengthFilter {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "" => Ok(LengthFilter::Any),
            "short" => Ok(LengthFilter::Short),
            "medium" => Ok(LengthFilter::Medium),
            "long" => Ok(LengthFilter::Long),
            other => Err(RequestError::UnknownFilter {
                kind: "length",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for SortBy {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" | "" => Ok(SortBy::Relevance),
            "date" => Ok(SortBy::Date),
            "view_count" | "views" => Ok(SortBy::ViewCount),
            "rating" => Ok(SortBy::Rating),
            other => Err(RequestError::UnknownFilter {
                kind: "sort",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for UploadDateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for LengthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline trigger: what to search for and how long the script should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search keyword
    pub keyword: String,

    /// Target script duration in minutes
    pub duration_minutes: u32,

    #[serde(default)]
    pub upload_date: UploadDateFilter,

    #[serde(default)]
    pub length: LengthFilter,

    #[serde(default)]
    pub sort_by: SortBy,
}

impl SearchRequest {
    /// Create a request with default filters.
    pub fn new(keyword: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            keyword: keyword.into(),
            duration_minutes,
            upload_date: UploadDateFilter::default(),
            length: LengthFilter::default(),
            sort_by: SortBy::default(),
        }
    }

    pub fn with_upload_date(mut self, filter: UploadDateFilter) -> Self {
        self.upload_date = filter;
        self
    }

    pub fn with_length(mut self, filter: LengthFilter) -> Self {
        self.length = filter;
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Check the request before any network work happens.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.keyword.trim().is_empty() {
            return Err(RequestError::EmptyKeyword);
        }
        if self.duration_minutes < 1 {
            return Err(RequestError::InvalidDuration(self.duration_minutes));
        }
        Ok(())
    }
}
