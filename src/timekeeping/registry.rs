use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::TimekeepingError;
use crate::timekeeping::session::{SessionTracker, WorkSession, WorkingDuration};
use crate::timekeeping::ticker::PeriodicTask;

struct LiveSession {
    tracker: SessionTracker,
    latest: Arc<Mutex<Option<WorkingDuration>>>,
    // dropped together with the entry, which cancels the refresh
    _refresh: PeriodicTask,
}

/// Owns the active work session of every employee.
///
/// Shared through `web::Data`; each employee gets its own tracker, so two
/// devices of different employees never touch the same state. While a session
/// is active a [`PeriodicTask`] refreshes its elapsed snapshot every `tick`.
pub struct SessionRegistry {
    tick: Duration,
    sessions: Mutex<HashMap<u64, LiveSession>>,
}

impl SessionRegistry {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<u64, LiveSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a session for `employee_id`. Must run inside the actix runtime.
    pub fn begin(
        &self,
        employee_id: u64,
        started_at: DateTime<Utc>,
    ) -> Result<WorkSession, TimekeepingError> {
        let mut sessions = self.sessions();

        if let Some(live) = sessions.get(&employee_id) {
            if let Some(current) = live.tracker.current() {
                return Err(TimekeepingError::AlreadyActive {
                    employee_id,
                    since: current.started_at,
                });
            }
        }

        let mut tracker = SessionTracker::new(employee_id);
        let session = tracker.begin_session(started_at)?.clone();

        let latest = Arc::new(Mutex::new(Some(WorkingDuration::from_duration(
            Utc::now() - started_at,
        ))));
        let snapshot = Arc::clone(&latest);
        let refresh = PeriodicTask::spawn(self.tick, move || {
            let elapsed = WorkingDuration::from_duration(Utc::now() - started_at);
            *snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(elapsed);
        });

        sessions.insert(
            employee_id,
            LiveSession {
                tracker,
                latest,
                _refresh: refresh,
            },
        );

        info!(employee_id = session.employee_id, session_id = %session.id, started_at = %session.started_at, "Work session started");
        Ok(session)
    }

    pub fn current(&self, employee_id: u64) -> Option<WorkSession> {
        self.sessions()
            .get(&employee_id)
            .and_then(|live| live.tracker.current().cloned())
    }

    /// Elapsed time computed against `now`.
    pub fn elapsed(
        &self,
        employee_id: u64,
        now: DateTime<Utc>,
    ) -> Result<WorkingDuration, TimekeepingError> {
        match self.sessions().get(&employee_id) {
            Some(live) => live.tracker.elapsed(now),
            None => Err(TimekeepingError::NotActive),
        }
    }

    /// Last value published by the periodic refresh.
    pub fn snapshot(&self, employee_id: u64) -> Option<WorkingDuration> {
        let sessions = self.sessions();
        let live = sessions.get(&employee_id)?;
        *live.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closes the session and cancels its refresh before returning.
    /// Ending an idle employee is a no-op.
    pub fn end(&self, employee_id: u64) -> Option<WorkSession> {
        let Some(mut live) = self.sessions().remove(&employee_id) else {
            debug!(employee_id, "End requested with no active session");
            return None;
        };

        let session = live.tracker.end_session();
        drop(live);

        if let Some(session) = &session {
            info!(employee_id, session_id = %session.id, "Work session ended");
        }
        session
    }

    pub fn active_count(&self) -> usize {
        self.sessions()
            .values()
            .filter(|live| live.tracker.is_active())
            .count()
    }
}
