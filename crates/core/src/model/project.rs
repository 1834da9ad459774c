use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{PartId, SubmissionId};

/// Maximum number of submissions a learner may make against one project part.
pub const MAX_PART_SUBMISSIONS: usize = 3;

//
// ─── ATTEMPT STATUS ────────────────────────────────────────────────────────────
//

/// Mentor verdict on a project submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Passed,
    Failed,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::Passed => write!(f, "passed"),
            AttemptStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown attempt status: {value}")]
pub struct ParseStatusError {
    pub value: String,
}

impl FromStr for AttemptStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(AttemptStatus::Passed),
            "failed" => Ok(AttemptStatus::Failed),
            other => Err(ParseStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

//
// ─── PROJECT PROGRESS ──────────────────────────────────────────────────────────
//

/// Entry on the part's `submissions` array pointing at the full submission
/// document. Review fields stay unset until a mentor responds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub submitted_at: DateTime<Utc>,
    pub submission: SubmissionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttemptStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl SubmissionSummary {
    #[must_use]
    pub fn new(submitted_at: DateTime<Utc>, submission: SubmissionId) -> Self {
        Self {
            submitted_at,
            submission,
            status: None,
            reviewed_at: None,
        }
    }
}

/// Progress on a single project part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submissions: Vec<SubmissionSummary>,
}

impl PartProgress {
    /// A freshly begun part: stamped with a start time, no submissions yet.
    #[must_use]
    pub fn begun_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(started_at),
            completed_at: None,
            submissions: Vec::new(),
        }
    }

    /// Whether the learner may still submit against this part.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.submissions.len() < MAX_PART_SUBMISSIONS
    }

    /// Ordinal of the next submission (1-based, matching the stored docs).
    #[must_use]
    pub fn next_attempt(&self) -> u32 {
        u32::try_from(self.submissions.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
}

/// Progress on the course's project as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parts: BTreeMap<PartId, PartProgress>,
}

impl ProjectProgress {
    /// A freshly begun project with an empty part map.
    #[must_use]
    pub fn begun_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(started_at),
            completed_at: None,
            parts: BTreeMap::new(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
