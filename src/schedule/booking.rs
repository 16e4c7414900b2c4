//! Booking mutations: create, edit and cancel appointments.
//!
//! Every mutation re-checks availability and then goes through the store's
//! conditional operations, so a stale availability answer can never produce
//! a double booking. Edits and cancellations locate the stored copies by
//! expanding the *original* appointment's duration; a booking therefore
//! never moves or resizes in place.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::schedule::availability::Availability;
use crate::schedule::grid::{self, TimeSlot};
use crate::schedule::types::{Appointment, AppointmentDraft, AppointmentUpdate};
use crate::storage::{ReserveOutcome, ScheduleStore};

// ============================================================================
// Booking Engine
// ============================================================================

/// Mutating operations over a schedule store.
pub struct BookingEngine<S: ScheduleStore> {
    pub(crate) store: Arc<S>,
    availability: Availability<S>,
}

impl<S: ScheduleStore> BookingEngine<S> {
    /// Create a booking engine over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            availability: Availability::new(store.clone()),
            store,
        }
    }

    /// Book an appointment starting at `start_slot` on `date`.
    ///
    /// Availability is checked again here, then the write itself re-verifies
    /// occupancy inside the store's critical section. A booking that loses
    /// that final race fails with `Unavailable` and leaves nothing behind.
    pub async fn create(
        &self,
        date: NaiveDate,
        start_slot: TimeSlot,
        draft: AppointmentDraft,
    ) -> Result<Appointment> {
        let open = self
            .availability
            .find_available_slots(date, draft.duration, &draft.dentist, Some(start_slot), None)
            .await?;
        if open.is_empty() {
            return Err(ScheduleError::Unavailable(format!(
                "{} on {} cannot be booked for {}",
                start_slot, date, draft.dentist
            ))
            .into());
        }

        let related = grid::related_slots(start_slot, draft.duration)?;
        let appointment = draft.into_appointment(Uuid::new_v4().to_string());

        match self.store.reserve(date, &related, &appointment).await? {
            ReserveOutcome::Reserved => {
                debug!(
                    "Booked {} for {} on {} ({} slots from {})",
                    appointment.id,
                    appointment.dentist,
                    date,
                    related.len(),
                    start_slot
                );
                Ok(appointment)
            }
            ReserveOutcome::Occupied(busy) => {
                let labels: Vec<&str> = busy.iter().map(|s| s.label()).collect();
                Err(ScheduleError::Unavailable(format!(
                    "slots [{}] on {} were taken before the reservation could land",
                    labels.join(", "),
                    date
                ))
                .into())
            }
        }
    }

    /// Edit the fields of an existing booking in place.
    ///
    /// The copies are located by expanding `original.duration` from
    /// `start_slot` and matched by booking identity (dentist, patient,
    /// phone, treatment). Returns how many copies were rewritten.
    pub async fn update(
        &self,
        date: NaiveDate,
        start_slot: TimeSlot,
        original: &Appointment,
        changes: &AppointmentUpdate,
    ) -> Result<usize> {
        let related = grid::related_slots(start_slot, original.duration)?;
        let matched = self.store.amend(date, &related, original, changes).await?;
        if matched == 0 {
            return Err(ScheduleError::NotFound(format!(
                "{} / {} at {} on {}",
                original.dentist, original.patient, start_slot, date
            ))
            .into());
        }
        debug!(
            "Updated {} copies of {} at {} on {}",
            matched, original.id, start_slot, date
        );
        Ok(matched)
    }

    /// Cancel a booking, removing every slot copy.
    ///
    /// Cancelling something already gone is `NotFound` and changes nothing;
    /// a repeated cancel is therefore safe.
    pub async fn cancel(
        &self,
        date: NaiveDate,
        start_slot: TimeSlot,
        original: &Appointment,
    ) -> Result<usize> {
        let related = grid::related_slots(start_slot, original.duration)?;
        let removed = self.store.withdraw(date, &related, original).await?;
        if removed == 0 {
            return Err(ScheduleError::NotFound(format!(
                "{} / {} at {} on {}",
                original.dentist, original.patient, start_slot, date
            ))
            .into());
        }
        debug!(
            "Cancelled {} ({} copies) at {} on {}",
            original.id, removed, start_slot, date
        );
        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================
