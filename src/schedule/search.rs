//! Day-by-day search for the next bookable opening.
//!
//! `OpeningSearch` walks the calendar one day at a time and yields
//! `(date, slot)` pairs in chronological order, stopping at a configurable
//! horizon so the scan always terminates. The search is lazy: days are only
//! inspected when the caller asks for the next opening, so stopping early
//! costs nothing. `rebook_after_cancel` composes the search with the
//! booking engine to move an appointment to the next free opening.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::Result;
use crate::schedule::availability::Availability;
use crate::schedule::booking::BookingEngine;
use crate::schedule::grid::{Period, SlotDuration, TimeSlot};
use crate::schedule::types::{Appointment, AppointmentDraft};
use crate::storage::ScheduleStore;

/// How many days a search scans before giving up.
pub const DEFAULT_SEARCH_HORIZON_DAYS: u32 = 60;

// ============================================================================
// Opening Search
// ============================================================================

/// A lazy, bounded scan over calendar days for bookable openings.
///
/// Openings come back in chronological order, all of one day's slots before
/// the next day is inspected. The cursor only moves forward; `reset` rewinds
/// it to the start date.
pub struct OpeningSearch<S: ScheduleStore> {
    availability: Availability<S>,
    dentist: String,
    duration: SlotDuration,
    period: Option<Period>,
    start: NaiveDate,
    horizon_days: u32,
    /// Days already inspected, counted from `start`.
    cursor: u32,
    /// Openings found on the current day but not yet handed out.
    pending: VecDeque<(NaiveDate, TimeSlot)>,
}

impl<S: ScheduleStore> OpeningSearch<S> {
    /// Start a search for `dentist` at `duration`, beginning on `start`.
    pub fn new(
        store: Arc<S>,
        dentist: impl Into<String>,
        duration: SlotDuration,
        start: NaiveDate,
    ) -> Self {
        Self {
            availability: Availability::new(store),
            dentist: dentist.into(),
            duration,
            period: None,
            start,
            horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
            cursor: 0,
            pending: VecDeque::new(),
        }
    }

    /// Restrict the search to one period of the day.
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Override the search horizon.
    pub fn with_horizon(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// The next opening at or after the cursor, or `None` once the horizon
    /// is exhausted. Each call advances past the opening it returns.
    pub async fn next_opening(&mut self) -> Result<Option<(NaiveDate, TimeSlot)>> {
        if let Some(found) = self.pending.pop_front() {
            return Ok(Some(found));
        }

        while self.cursor < self.horizon_days {
            let date = self.start + Duration::days(i64::from(self.cursor));
            self.cursor += 1;

            let open = self
                .availability
                .find_available_slots(date, self.duration, &self.dentist, None, self.period)
                .await?;
            if !open.is_empty() {
                self.pending.extend(open.into_iter().map(|slot| (date, slot)));
                return Ok(self.pending.pop_front());
            }
        }

        debug!(
            "No opening for {} within {} days of {}",
            self.dentist, self.horizon_days, self.start
        );
        Ok(None)
    }

    /// Move the cursor forward so the next day inspected is `date`.
    ///
    /// Openings already buffered for earlier days are discarded. The cursor
    /// never moves backwards; use `reset` to rewind.
    pub fn skip_to(&mut self, date: NaiveDate) {
        self.pending.clear();
        let days = (date - self.start).num_days();
        if days > i64::from(self.cursor) {
            self.cursor = days.min(i64::from(self.horizon_days)) as u32;
        }
    }

    /// Rewind the search to its start date.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.pending.clear();
    }
}

// ============================================================================
// Rebooking
// ============================================================================

/// Knobs for [`rebook_after_cancel`].
#[derive(Debug, Clone)]
pub struct RebookParams {
    /// Extra days to wait past the cancelled date before searching.
    pub wait_days: u32,
    /// Restrict the new booking to one period of the day.
    pub period: Option<Period>,
    /// How many days to scan before giving up.
    pub horizon_days: u32,
}

impl Default for RebookParams {
    fn default() -> Self {
        Self {
            wait_days: 0,
            period: None,
            horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
        }
    }
}

/// Cancel a booking and move it to the next opening.
///
/// The search starts the day after the cancelled appointment, pushed further
/// out by `wait_days`. The new booking keeps the dentist, patient, phone,
/// treatment and duration of the old one and awaits confirmation again.
///
/// `Ok(None)` means no opening exists within the horizon; the cancellation
/// stands and nothing new is booked.
pub async fn rebook_after_cancel<S: ScheduleStore>(
    engine: &BookingEngine<S>,
    date: NaiveDate,
    start_slot: TimeSlot,
    original: &Appointment,
    params: RebookParams,
) -> Result<Option<Appointment>> {
    engine.cancel(date, start_slot, original).await?;

    let search_start = date + Duration::days(1 + i64::from(params.wait_days));
    let mut search = OpeningSearch::new(
        engine.store.clone(),
        original.dentist.clone(),
        original.duration,
        search_start,
    )
    .with_horizon(params.horizon_days);
    if let Some(period) = params.period {
        search = search.with_period(period);
    }

    let Some((day, slot)) = search.next_opening().await? else {
        return Ok(None);
    };

    let draft = AppointmentDraft::new(original.dentist.clone(), original.patient.clone())
        .with_phone(original.phone.clone())
        .with_treatment(original.treatment.clone())
        .with_duration(original.duration);
    let rebooked = engine.create(day, slot, draft).await?;
    debug!(
        "Rebooked {} as {} at {} on {}",
        original.id, rebooked.id, slot, day
    );
    Ok(Some(rebooked))
}

// ============================================================================
// Tests
// ============================================================================
