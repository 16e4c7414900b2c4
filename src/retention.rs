//! Retention sweep for expired schedule data.
//!
//! Appointments, leave and meetings are kept for a fixed number of days and
//! then purged, one date bucket at a time. A date that fails to purge is
//! logged and skipped; the sweep always visits every expired date.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::{PurgeCounts, ScheduleStore};

// ============================================================================
// Policy
// ============================================================================

/// Retention policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Days of history to keep. Dates strictly older than the cutoff
    /// (`today - horizon_days`) are purged.
    pub horizon_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { horizon_days: 60 }
    }
}

impl RetentionPolicy {
    /// The cutoff for a sweep run on `today`. Everything strictly before
    /// this date goes; the cutoff date itself is kept.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.horizon_days))
    }
}

// ============================================================================
// Sweeper
// ============================================================================

/// Tally of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Date buckets removed.
    pub dates_purged: usize,
    /// Appointment copies removed.
    pub appointments_removed: usize,
    /// Leave entries removed.
    pub leave_removed: usize,
    /// Meetings removed.
    pub meetings_removed: usize,
    /// Dates that failed to purge and were skipped.
    pub dates_failed: usize,
}

impl SweepStats {
    fn absorb(&mut self, counts: PurgeCounts) {
        self.appointments_removed += counts.appointments;
        self.leave_removed += counts.leave;
        self.meetings_removed += counts.meetings;
    }
}

/// Sweeps expired date buckets out of a schedule store.
pub struct RetentionSweeper<S: ScheduleStore> {
    store: Arc<S>,
    policy: RetentionPolicy,
}

impl<S: ScheduleStore> RetentionSweeper<S> {
    /// Create a sweeper with the given policy.
    pub fn new(store: Arc<S>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Sweep with the cutoff computed from today's date.
    pub async fn sweep(&self) -> Result<SweepStats> {
        let cutoff = self.policy.cutoff(Utc::now().date_naive());
        self.sweep_before(cutoff).await
    }

    /// Purge every date bucket strictly before `cutoff`.
    ///
    /// Running the same sweep twice is harmless; the second pass finds
    /// nothing left to purge.
    pub async fn sweep_before(&self, cutoff: NaiveDate) -> Result<SweepStats> {
        let mut stats = SweepStats::default();

        for date in self.store.dates_before(cutoff).await? {
            match self.store.purge_date(date).await {
                Ok(counts) => {
                    stats.dates_purged += 1;
                    stats.absorb(counts);
                }
                Err(err) => {
                    warn!("Retention sweep skipped {}: {}", date, err);
                    stats.dates_failed += 1;
                }
            }
        }

        if stats.dates_purged > 0 {
            info!(
                "Retention sweep before {}: {} dates purged ({} appointments, {} leave, {} meetings)",
                cutoff,
                stats.dates_purged,
                stats.appointments_removed,
                stats.leave_removed,
                stats.meetings_removed
            );
        }
        Ok(stats)
    }
}

// ============================================================================
// Tests
// ============================================================================
