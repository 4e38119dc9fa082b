//! Clip catalog search
//!
//! The clip catalog is an external collaborator. This module defines the search
//! parameters the catalog accepts and the trait a catalog client implements.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use super::SourceClip;

/// Upper bound the catalog accepts for a single page of clips
pub const MAX_CLIPS_PER_SEARCH: u8 = 100;

/// What the search name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    /// Clips of a game, searched by game name
    #[default]
    Game,
    /// Clips of a broadcaster, searched by broadcaster name
    User,
}

/// Preset search windows ending now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl SearchPeriod {
    /// Start of the window that ends at `end`
    pub fn start_from(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            SearchPeriod::Day => end - Duration::days(1),
            SearchPeriod::Week => end - Duration::weeks(1),
            SearchPeriod::Month => end.checked_sub_months(Months::new(1)).unwrap_or(end),
            SearchPeriod::Year => end.checked_sub_months(Months::new(12)).unwrap_or(end),
        }
    }
}

/// Errors in clip search parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchParamsError {
    #[error("Search name cannot be empty")]
    EmptyName,
    #[error("Clip count must be between 1 and {MAX_CLIPS_PER_SEARCH}, got {0}")]
    CountOutOfRange(u8),
    #[error("Search window is empty: start {started_at} is not before end {ended_at}")]
    EmptyWindow {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
}

/// Parameters of a clip catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSearchParams {
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub name: String,
    pub first: u8,
    #[serde(rename = "start")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "end")]
    pub ended_at: DateTime<Utc>,
}

impl ClipSearchParams {
    /// Search the ten most popular clips of the last week
    pub fn new(kind: ClipKind, name: impl Into<String>) -> Self {
        Self::for_period(kind, name, SearchPeriod::Week, Utc::now())
    }

    /// Search a preset window ending at `now`
    pub fn for_period(
        kind: ClipKind,
        name: impl Into<String>,
        period: SearchPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            first: 10,
            started_at: period.start_from(now),
            ended_at: now,
        }
    }

    /// Limit the number of clips returned
    pub fn with_first(mut self, first: u8) -> Self {
        self.first = first;
        self
    }

    /// Check the parameters before they are sent to the catalog
    pub fn validate(&self) -> Result<(), SearchParamsError> {
        if self.name.trim().is_empty() {
            return Err(SearchParamsError::EmptyName);
        }
        if self.first == 0 || self.first > MAX_CLIPS_PER_SEARCH {
            return Err(SearchParamsError::CountOutOfRange(self.first));
        }
        if self.started_at >= self.ended_at {
            return Err(SearchParamsError::EmptyWindow {
                started_at: self.started_at,
                ended_at: self.ended_at,
            });
        }
        Ok(())
    }
}

/// Errors reported by a clip catalog
#[derive(Debug, thiserror::Error)]
pub enum ClipSourceError {
    #[error("Invalid search parameters: {0}")]
    InvalidParams(#[from] SearchParamsError),
    #[error("Clip catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Clip catalog rejected the search: {0}")]
    Rejected(String),
}

/// A clip catalog client
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Fetch the clips matching `params`, most viewed first
    async fn fetch_clips(&self, params: &ClipSearchParams) -> Result<Vec<SourceClip>, ClipSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     SP[Search Params] --> V[Validation]
    ///     SP --> P[Periods]
    ///     SP --> S[Serialization]
    /// ```

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_search_is_valid() {
        let params = ClipSearchParams::for_period(ClipKind::Game, "Just Chatting", SearchPeriod::Week, now());
        assert_eq!(params.first, 10);
        assert_eq!(params.ended_at - params.started_at, Duration::weeks(1));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_month_period_clamps_to_month_end() {
        let start = SearchPeriod::Month.start_from(now());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_validation_errors() {
        let base = ClipSearchParams::for_period(ClipKind::User, "streamer", SearchPeriod::Day, now());

        let empty = ClipSearchParams { name: " ".to_string(), ..base.clone() };
        assert_eq!(empty.validate(), Err(SearchParamsError::EmptyName));

        assert_eq!(
            base.clone().with_first(0).validate(),
            Err(SearchParamsError::CountOutOfRange(0))
        );
        assert_eq!(
            base.clone().with_first(101).validate(),
            Err(SearchParamsError::CountOutOfRange(101))
        );
        assert!(base.clone().with_first(100).validate().is_ok());

        let inverted = ClipSearchParams {
            started_at: base.ended_at,
            ended_at: base.started_at,
            ..base
        };
        assert!(matches!(inverted.validate(), Err(SearchParamsError::EmptyWindow { .. })));
    }

    #[test]
    fn test_serialization_uses_catalog_field_names() {
        let params = ClipSearchParams::for_period(ClipKind::User, "streamer", SearchPeriod::Day, now());
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["type"], "user");
        assert_eq!(value["first"], 10);
        assert!(value.get("start").is_some());
        assert!(value.get("end").is_some());
    }
}
