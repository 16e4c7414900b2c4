//! Storage abstraction for the booking engine.
//!
//! This module defines the repository seam between the scheduling logic and
//! whatever holds the records. The trait deliberately exposes *conditional*
//! write operations ([`ScheduleStore::reserve`], [`ScheduleStore::amend`],
//! [`ScheduleStore::withdraw`]) instead of raw inserts and deletes: each one
//! checks and mutates inside one critical section, so callers cannot compose
//! an unsafe check-then-write across await points.
//!
//! Multi-slot writes are all-or-nothing. A backend without multi-record
//! transactions must compensate a half-landed write itself and may only
//! surface [`StorageError::PartialWrite`](crate::error::StorageError) when
//! that compensation fails.

mod memory;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::error::Result;
use crate::roster::{DentistRecord, Meeting};
use crate::schedule::grid::TimeSlot;
use crate::schedule::types::{Appointment, AppointmentUpdate};

pub use memory::EmbeddedScheduleStore;

// ============================================================================
// Operation Results
// ============================================================================

/// Outcome of an atomic multi-slot reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Every requested slot was free; one copy was written per slot.
    Reserved,
    /// At least one slot already held an appointment; nothing was written.
    /// Carries the slots that were busy.
    Occupied(Vec<TimeSlot>),
}

/// What a single-date purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    /// Appointment copies removed.
    pub appointments: usize,
    /// Leave entries removed.
    pub leave: usize,
    /// Meetings removed.
    pub meetings: usize,
}

// ============================================================================
// ScheduleStore Trait
// ============================================================================

/// Trait for schedule storage backends.
///
/// Keys are calendar dates; appointment records are additionally keyed by
/// slot. One logical booking is stored as one copy per occupied slot, and
/// every copy carries the same id.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    // ========================================================================
    // Appointments
    // ========================================================================

    /// All appointments on a date, keyed by slot. Slots with no records are
    /// absent from the map.
    async fn appointments_on(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<TimeSlot, Vec<Appointment>>>;

    /// Appointments in one slot.
    async fn appointments_in(&self, date: NaiveDate, slot: TimeSlot) -> Result<Vec<Appointment>>;

    /// Atomically reserve a set of slots for one booking.
    ///
    /// If every slot holds zero appointments (for any dentist), a copy of
    /// `appointment` is written into each and the call returns
    /// [`ReserveOutcome::Reserved`]. Otherwise nothing is written and the
    /// busy slots are reported. The check and the writes happen in one
    /// critical section.
    async fn reserve(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        appointment: &Appointment,
    ) -> Result<ReserveOutcome>;

    /// Apply `update` to every copy in `slots` that is the same booking as
    /// `original`. Copies keep their ids. Returns how many copies matched.
    async fn amend(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        original: &Appointment,
        update: &AppointmentUpdate,
    ) -> Result<usize>;

    /// Remove every copy in `slots` that is the same booking as `original`,
    /// pruning slot lists and dates left empty. Returns how many copies
    /// were removed.
    async fn withdraw(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        original: &Appointment,
    ) -> Result<usize>;

    // ========================================================================
    // Leave
    // ========================================================================

    /// Dentist keys on full-day leave for a date.
    async fn leave_on(&self, date: NaiveDate) -> Result<Vec<String>>;

    /// Record a leave entry. Recording the same entry twice keeps one.
    async fn record_leave(&self, date: NaiveDate, dentist: &str) -> Result<()>;

    /// Remove a leave entry. Returns false if none existed.
    async fn remove_leave(&self, date: NaiveDate, dentist: &str) -> Result<bool>;

    // ========================================================================
    // Meetings
    // ========================================================================

    /// Meetings on a date, in insertion order.
    async fn meetings_on(&self, date: NaiveDate) -> Result<Vec<Meeting>>;

    /// Record a meeting.
    async fn record_meeting(&self, meeting: Meeting) -> Result<()>;

    /// Remove the meeting at `index` within the date's list. Returns false
    /// if the index is out of range.
    async fn remove_meeting(&self, date: NaiveDate, index: usize) -> Result<bool>;

    // ========================================================================
    // Dentist Registry
    // ========================================================================

    /// All registry entries, sorted by key.
    async fn dentists(&self) -> Result<Vec<DentistRecord>>;

    /// Insert or replace a registry entry.
    async fn upsert_dentist(&self, name: &str, color: &str) -> Result<()>;

    /// Remove a registry entry. Returns false if the key was not registered.
    async fn remove_dentist(&self, name: &str) -> Result<bool>;

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Dates strictly older than `cutoff` that still hold any appointment,
    /// leave or meeting records.
    async fn dates_before(&self, cutoff: NaiveDate) -> Result<Vec<NaiveDate>>;

    /// Remove every record for one date.
    async fn purge_date(&self, date: NaiveDate) -> Result<PurgeCounts>;

    /// Clear all data from the store.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// Factory
// ============================================================================

/// Create a store from configuration.
pub async fn create_store(config: &Config) -> Result<Arc<EmbeddedScheduleStore>> {
    if config.storage.persist {
        let data_dir = config.data_dir()?;
        Ok(Arc::new(
            EmbeddedScheduleStore::with_persistence(&data_dir).await?,
        ))
    } else {
        Ok(Arc::new(EmbeddedScheduleStore::new()))
    }
}
