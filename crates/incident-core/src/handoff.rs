//! What leaves the interview: either a finished answer mapping for the report renderer, or a
//! notice that the reporter backed out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Committed answers keyed by question id.
pub type Answers = BTreeMap<String, String>;

/// The finished interview, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedInterview {
    pub session_id: Uuid,
    pub language: String,
    pub reported_by: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub answers: Answers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffEvent {
    Completed(CompletedInterview),
    /// The reporter left before finishing. No answers are carried.
    Abandoned {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}
