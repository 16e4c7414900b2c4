//! The availability predicate: which slots can legally start a booking.
//!
//! Read-only. The checks run in a fixed order: weekend, leave (including
//! the whole-clinic closure marker), meetings, the early-morning
//! reservation, then slot occupancy over the expansion of the requested
//! duration.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::roster;
use crate::schedule::grid::{self, Period, SlotDuration, TimeSlot};
use crate::storage::ScheduleStore;

// ============================================================================
// Availability Engine
// ============================================================================

/// Read-only availability queries over a schedule store.
pub struct Availability<S: ScheduleStore> {
    store: Arc<S>,
}

impl<S: ScheduleStore> Availability<S> {
    /// Create an availability engine over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Find the slots where a booking of `duration` for `dentist` could
    /// start on `date`.
    ///
    /// With `explicit_slot` the answer is that slot or nothing; without it,
    /// every legal starting slot is returned in chronological order. An
    /// empty result means "nothing bookable"; an error means the request
    /// itself was ill-formed (an explicit slot whose expansion would cross
    /// the lunch gap).
    ///
    /// Occupancy is clinic-wide: one appointment record in a slot blocks
    /// that slot for every dentist, not just the record's own. That is the
    /// documented contract here, kept from the predecessor system.
    pub async fn find_available_slots(
        &self,
        date: NaiveDate,
        duration: SlotDuration,
        dentist: &str,
        explicit_slot: Option<TimeSlot>,
        period: Option<Period>,
    ) -> Result<Vec<TimeSlot>> {
        // Weekends have no bookable slots at all.
        if !grid::is_clinic_day(date) {
            debug!("No availability on {}: weekend", date);
            return Ok(Vec::new());
        }

        // The closure marker is a leave entry, never a bookable role.
        if dentist == roster::SCHOOL_DAY {
            return Ok(Vec::new());
        }

        let leave = self.store.leave_on(date).await?;
        if leave.iter().any(|d| d == dentist) {
            debug!("No availability on {}: {} is on leave", date, dentist);
            return Ok(Vec::new());
        }
        if leave.iter().any(|d| d == roster::SCHOOL_DAY) {
            debug!("No availability on {}: clinic closed for the day", date);
            return Ok(Vec::new());
        }

        // Candidate starting slots for the requested period (or the whole
        // day), already in chronological order.
        let mut candidates: Vec<TimeSlot> = match period {
            Some(p) => p.slots().to_vec(),
            None => TimeSlot::ALL.to_vec(),
        };

        // A meeting takes its half day away from that clinical dentist.
        if roster::is_clinical(dentist) {
            for meeting in self
                .store
                .meetings_on(date)
                .await?
                .iter()
                .filter(|m| m.dentist == dentist)
            {
                candidates.retain(|slot| slot.period() != meeting.period);
            }
        } else {
            // Monday through Thursday the first two morning slots are held
            // for the clinical dentists.
            candidates.retain(|slot| !grid::reserved_for_clinical(date, *slot));
        }

        let by_slot = self.store.appointments_on(date).await?;
        let occupied =
            |slot: &TimeSlot| by_slot.get(slot).is_some_and(|list| !list.is_empty());

        match explicit_slot {
            Some(slot) => {
                if !candidates.contains(&slot) {
                    return Ok(Vec::new());
                }
                let related = grid::related_slots(slot, duration)?;
                if related.iter().any(occupied) {
                    debug!("Slot {} on {} is occupied", slot, date);
                    return Ok(Vec::new());
                }
                Ok(vec![slot])
            }
            None => {
                let mut available = Vec::new();
                for slot in candidates {
                    let Ok(related) = grid::related_slots(slot, duration) else {
                        continue;
                    };
                    if related.iter().all(|s| !occupied(s)) {
                        available.push(slot);
                    }
                }
                Ok(available)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
