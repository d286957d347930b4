//! Walk and attendance models
//!
//! A walk is a scheduled group outing that moves through a guarded state
//! machine: Scheduled -> InProgress -> Completed, with Cancelled reachable
//! from any non-terminal state. Attendance rows join dogs to walks and
//! carry the stamped duration once a walk completes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::dog::OwnerInfo;

/// Walk status state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalkStatus {
    /// Created, not yet started
    #[default]
    Scheduled,
    /// Started, start_time stamped
    InProgress,
    /// Ended, durations stamped (terminal)
    Completed,
    /// Called off (terminal)
    Cancelled,
}

impl fmt::Display for WalkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkStatus::Scheduled => write!(f, "SCHEDULED"),
            WalkStatus::InProgress => write!(f, "IN_PROGRESS"),
            WalkStatus::Completed => write!(f, "COMPLETED"),
            WalkStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl WalkStatus {
    /// Parse from the database representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(WalkStatus::Scheduled),
            "IN_PROGRESS" => Some(WalkStatus::InProgress),
            "COMPLETED" => Some(WalkStatus::Completed),
            "CANCELLED" => Some(WalkStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and Cancelled admit no further transitions
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, WalkStatus::Completed | WalkStatus::Cancelled)
    }

    /// A walk can only be started from Scheduled
    #[inline]
    pub fn can_start(&self) -> bool {
        matches!(self, WalkStatus::Scheduled)
    }

    /// A walk can only be ended from InProgress
    #[inline]
    pub fn can_end(&self) -> bool {
        matches!(self, WalkStatus::InProgress)
    }

    /// A walk can be cancelled from any non-terminal state
    #[inline]
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

/// Walk entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walk {
    /// Unique identifier
    pub id: Uuid,

    /// Calendar date of the outing (distinct from start/end instants)
    pub date: NaiveDate,

    /// Lifecycle status
    pub status: WalkStatus,

    /// Administrator who scheduled the walk
    pub admin_id: Uuid,

    /// Free-text notes
    pub notes: Option<String>,

    /// Wall-clock instant the walk was started
    pub start_time: Option<DateTime<Utc>>,

    /// Wall-clock instant the walk was ended
    pub end_time: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Attendance roster (populated on joined queries)
    #[serde(default)]
    pub attendances: Vec<Attendance>,
}

impl Default for Walk {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            status: WalkStatus::Scheduled,
            admin_id: Uuid::new_v4(),
            notes: None,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
            attendances: Vec::new(),
        }
    }
}

/// Attendance record joining a dog to a walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier
    pub id: Uuid,

    /// Parent walk
    pub walk_id: Uuid,

    /// Participating dog
    pub dog_id: Uuid,

    /// Dog's name (populated on joined queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dog_name: Option<String>,

    /// Dog's owner (populated on joined queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerInfo>,

    /// Whether the dog actually attended
    pub attended: bool,

    /// Stamped duration in minutes; set only at completion for attended dogs
    pub duration: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    /// Whether this row qualifies for billing (attended with recorded duration)
    #[inline]
    pub fn is_billable(&self) -> bool {
        self.attended && self.duration.is_some()
    }
}

impl Default for Attendance {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            walk_id: Uuid::new_v4(),
            dog_id: Uuid::new_v4(),
            dog_name: None,
            owner: None,
            attended: false,
            duration: None,
            created_at: Utc::now(),
        }
    }
}

/// Compute a walk's duration in whole minutes.
///
/// Rounds half-up to the nearest minute. A missing start time yields 0,
/// as does an end time before the start time.
pub fn compute_duration_minutes(
    start_time: Option<DateTime<Utc>>,
    end_time: DateTime<Utc>,
) -> i32 {
    let Some(start) = start_time else {
        return 0;
    };
    let elapsed_secs = (end_time - start).num_seconds();
    if elapsed_secs <= 0 {
        return 0;
    }
    ((elapsed_secs + 30) / 60) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_display_roundtrip() {
        for status in [
            WalkStatus::Scheduled,
            WalkStatus::InProgress,
            WalkStatus::Completed,
            WalkStatus::Cancelled,
        ] {
            assert_eq!(WalkStatus::parse(&status.to_string()), Some(status));
        }
        assert_eq!(WalkStatus::parse("PENDING"), None);
    }

    #[test]
    fn test_transition_guards() {
        assert!(WalkStatus::Scheduled.can_start());
        assert!(!WalkStatus::InProgress.can_start());
        assert!(!WalkStatus::Completed.can_start());

        assert!(WalkStatus::InProgress.can_end());
        assert!(!WalkStatus::Scheduled.can_end());
        assert!(!WalkStatus::Cancelled.can_end());

        assert!(WalkStatus::Scheduled.can_cancel());
        assert!(WalkStatus::InProgress.can_cancel());
        assert!(!WalkStatus::Completed.can_cancel());
        assert!(!WalkStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_attendance_billable() {
        let mut attendance = Attendance::default();
        assert!(!attendance.is_billable());

        attendance.attended = true;
        assert!(!attendance.is_billable());

        attendance.duration = Some(45);
        assert!(attendance.is_billable());
    }

    #[test]
    fn test_duration_rounds_to_nearest_minute() {
        let start = Utc::now();

        let end = start + Duration::seconds(90 * 60);
        assert_eq!(compute_duration_minutes(Some(start), end), 90);

        // 29 seconds past the minute rounds down, 30 rounds up
        let end = start + Duration::seconds(45 * 60 + 29);
        assert_eq!(compute_duration_minutes(Some(start), end), 45);
        let end = start + Duration::seconds(45 * 60 + 30);
        assert_eq!(compute_duration_minutes(Some(start), end), 46);
    }

    #[test]
    fn test_duration_degenerate_inputs() {
        let now = Utc::now();
        assert_eq!(compute_duration_minutes(None, now), 0);
        assert_eq!(
            compute_duration_minutes(Some(now + Duration::seconds(10)), now),
            0
        );
    }
}
