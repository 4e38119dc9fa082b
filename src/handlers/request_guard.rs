//! Supersession guard for asynchronous requests
//!
//! Each logical section of the session (clip search, submission) keeps a counter.
//! Issuing a request bumps the counter; a response is only applied when its ticket
//! still carries the latest value for its section.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Independent streams of asynchronous requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSection {
    ClipSearch,
    Submit,
}

impl RequestSection {
    pub const ALL: [RequestSection; 2] = [RequestSection::ClipSearch, RequestSection::Submit];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSection::ClipSearch => "clip search",
            RequestSection::Submit => "submit",
        }
    }
}

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTicket {
    pub section: RequestSection,
    pub sequence: u64,
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} request #{}", self.section.as_str(), self.sequence)
    }
}

/// Shared record of the latest ticket per section
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<Mutex<HashMap<RequestSection, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding every earlier ticket of the same section
    pub fn issue(&self, section: RequestSection) -> RequestTicket {
        let mut latest = self.latest.lock();
        let sequence = latest.entry(section).or_insert(0);
        *sequence += 1;
        RequestTicket {
            section,
            sequence: *sequence,
        }
    }

    /// Whether no newer ticket was issued for the ticket's section
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.lock().get(&ticket.section) == Some(&ticket.sequence)
    }

    /// Supersede whatever is in flight for `section`
    pub fn cancel(&self, section: RequestSection) {
        self.issue(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let tracker = RequestTracker::new();
        let first = tracker.issue(RequestSection::ClipSearch);
        assert!(tracker.is_current(&first));

        let second = tracker.issue(RequestSection::ClipSearch);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_sections_are_independent() {
        let tracker = RequestTracker::new();
        let search = tracker.issue(RequestSection::ClipSearch);
        let submit = tracker.issue(RequestSection::Submit);

        assert!(tracker.is_current(&search));
        assert!(tracker.is_current(&submit));

        tracker.cancel(RequestSection::Submit);
        assert!(tracker.is_current(&search));
        assert!(!tracker.is_current(&submit));
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = RequestTracker::new();
        let ticket = tracker.issue(RequestSection::Submit);
        tracker.clone().issue(RequestSection::Submit);

        assert!(!tracker.is_current(&ticket));
        assert_eq!(ticket.to_string(), "submit request #1");
    }
}
