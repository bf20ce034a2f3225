use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::TimekeepingError;

/// An open check-in. Lives only in memory, from check-in to check-out or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSession {
    pub id: Uuid,
    pub employee_id: u64,
    pub started_at: DateTime<Utc>,
}

/// Elapsed working time split for display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WorkingDuration {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl WorkingDuration {
    /// Negative spans (clock skew between scan and now) clamp to zero.
    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.num_seconds().max(0);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for WorkingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Idle/Active state machine for one employee device session.
///
/// Not meant to be shared: one tracker per employee, driven from a single
/// logical thread of control.
#[derive(Debug)]
pub struct SessionTracker {
    employee_id: u64,
    active: Option<WorkSession>,
}

impl SessionTracker {
    pub fn new(employee_id: u64) -> Self {
        Self {
            employee_id,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&WorkSession> {
        self.active.as_ref()
    }

    /// Idle -> Active on a successful check-in scan.
    pub fn begin_session(
        &mut self,
        started_at: DateTime<Utc>,
    ) -> Result<&WorkSession, TimekeepingError> {
        if let Some(session) = &self.active {
            return Err(TimekeepingError::AlreadyActive {
                employee_id: self.employee_id,
                since: session.started_at,
            });
        }

        let session = self.active.insert(WorkSession {
            id: Uuid::new_v4(),
            employee_id: self.employee_id,
            started_at,
        });
        Ok(&*session)
    }

    /// Time worked since check-in. Fails while Idle.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Result<WorkingDuration, TimekeepingError> {
        let session = self.active.as_ref().ok_or(TimekeepingError::NotActive)?;
        Ok(WorkingDuration::from_duration(now - session.started_at))
    }

    /// Active -> Idle. A no-op while already Idle so duplicate cancels are harmless.
    pub fn end_session(&mut self) -> Option<WorkSession> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, h, m, s).unwrap()
    }

    #[test]
    fn second_begin_fails_while_active() {
        let mut tracker = SessionTracker::new(42);
        tracker.begin_session(at(8, 0, 0)).unwrap();

        let err = tracker.begin_session(at(8, 1, 0)).unwrap_err();
        assert_eq!(
            err,
            TimekeepingError::AlreadyActive {
                employee_id: 42,
                since: at(8, 0, 0)
            }
        );
        // the original session is untouched
        assert_eq!(tracker.current().unwrap().started_at, at(8, 0, 0));
    }

    #[test]
    fn end_then_begin_succeeds() {
        let mut tracker = SessionTracker::new(1);
        let first = tracker.begin_session(at(8, 0, 0)).unwrap().id;

        let ended = tracker.end_session().unwrap();
        assert_eq!(ended.id, first);
        assert!(!tracker.is_active());

        let second = tracker.begin_session(at(13, 0, 0)).unwrap();
        assert_ne!(second.id, first);
        assert_eq!(second.started_at, at(13, 0, 0));
    }

    #[test]
    fn end_while_idle_is_a_no_op() {
        let mut tracker = SessionTracker::new(1);
        assert!(tracker.end_session().is_none());
        assert!(tracker.end_session().is_none());
        assert!(tracker.begin_session(at(9, 0, 0)).is_ok());
    }

    #[test]
    fn elapsed_splits_hours_minutes_seconds() {
        let mut tracker = SessionTracker::new(1);
        tracker.begin_session(at(8, 0, 0)).unwrap();

        let elapsed = tracker.elapsed(at(10, 5, 9)).unwrap();
        assert_eq!(
            elapsed,
            WorkingDuration {
                hours: 2,
                minutes: 5,
                seconds: 9
            }
        );
        assert_eq!(elapsed.to_string(), "2:05:09");
    }

    #[test]
    fn elapsed_while_idle_is_an_error() {
        let tracker = SessionTracker::new(1);
        assert_eq!(tracker.elapsed(at(9, 0, 0)), Err(TimekeepingError::NotActive));
    }

    #[test]
    fn elapsed_before_start_clamps_to_zero() {
        let mut tracker = SessionTracker::new(1);
        tracker.begin_session(at(9, 0, 0)).unwrap();
        let elapsed = tracker.elapsed(at(8, 59, 0)).unwrap();
        assert_eq!(elapsed.to_string(), "0:00:00");
    }
}
