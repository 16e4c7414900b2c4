//! Dentist roster: who works at the clinic, who is away, and when the
//! team meets.
//!
//! Three reserved keys share the dentist namespace and are not clinical
//! dentists: `general` (the general booking queue), `staff` (staff
//! bookings) and `school-day` (a whole-clinic closure marker recorded as
//! leave). Everything else in the registry is a clinical dentist.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChairsideError, Result};
use crate::schedule::grid::Period;
use crate::storage::ScheduleStore;

// ============================================================================
// Roles
// ============================================================================

/// Key of the general booking queue.
pub const GENERAL_QUEUE: &str = "general";

/// Key of the staff booking queue.
pub const STAFF_QUEUE: &str = "staff";

/// Key of the whole-clinic closure marker. Never bookable; recording it as
/// leave blocks the date for every role.
pub const SCHOOL_DAY: &str = "school-day";

/// Registry entries seeded on first use, matching the predecessor system's
/// palette.
pub const DEFAULT_DENTISTS: [(&str, &str); 8] = [
    ("DC", "#FF5733"),
    ("DD", "#33FF57"),
    ("DPa", "#3357FF"),
    ("DPu", "#F033FF"),
    ("DT", "#FF33A8"),
    (GENERAL_QUEUE, "#808080"),
    (STAFF_QUEUE, "#FFC300"),
    (SCHOOL_DAY, "#FFC0CB"),
];

/// Whether a dentist key is one of the reserved pseudo-roles.
pub fn is_pseudo_role(name: &str) -> bool {
    matches!(name, GENERAL_QUEUE | STAFF_QUEUE | SCHOOL_DAY)
}

/// Whether a dentist key names a clinical dentist.
pub fn is_clinical(name: &str) -> bool {
    !is_pseudo_role(name)
}

// ============================================================================
// Records
// ============================================================================

/// A registry entry: a dentist key and its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DentistRecord {
    /// Dentist key, as referenced by appointments, leave and meetings.
    pub name: String,
    /// Display color in `#RRGGBB` form.
    pub color: String,
}

/// A half-day internal meeting for one dentist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Date of the meeting.
    pub date: NaiveDate,
    /// Dentist attending.
    pub dentist: String,
    /// Which half of the day the meeting takes.
    pub period: Period,
}

/// Whether a string is a well-formed `#RRGGBB` color.
pub fn valid_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// Roster Manager
// ============================================================================

/// Manager for leave, meetings and the dentist registry.
pub struct Roster<S: ScheduleStore> {
    store: Arc<S>,
}

impl<S: ScheduleStore> Roster<S> {
    /// Create a roster over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Leave
    // ========================================================================

    /// Dentists fully unavailable on a date.
    pub async fn leave_on(&self, date: NaiveDate) -> Result<Vec<String>> {
        self.store.leave_on(date).await
    }

    /// Record a full day of leave. Duplicate entries collapse into one.
    pub async fn record_leave(&self, date: NaiveDate, dentist: &str) -> Result<()> {
        require_key(dentist)?;
        self.store.record_leave(date, dentist).await?;
        debug!("Recorded leave: {} on {}", dentist, date);
        Ok(())
    }

    /// Remove a leave entry. Returns false if none existed.
    pub async fn remove_leave(&self, date: NaiveDate, dentist: &str) -> Result<bool> {
        let removed = self.store.remove_leave(date, dentist).await?;
        if removed {
            debug!("Removed leave: {} on {}", dentist, date);
        }
        Ok(removed)
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    /// Meetings scheduled on a date.
    pub async fn meetings_on(&self, date: NaiveDate) -> Result<Vec<Meeting>> {
        self.store.meetings_on(date).await
    }

    /// Record a half-day meeting for a dentist.
    pub async fn record_meeting(
        &self,
        date: NaiveDate,
        dentist: &str,
        period: Period,
    ) -> Result<()> {
        require_key(dentist)?;
        let meeting = Meeting {
            date,
            dentist: dentist.to_string(),
            period,
        };
        self.store.record_meeting(meeting).await?;
        debug!("Recorded meeting: {} on {} ({})", dentist, date, period);
        Ok(())
    }

    /// Remove the meeting at `index` within the date's list, in the order
    /// `meetings_on` returns them. Returns false if the index is out of
    /// range.
    pub async fn remove_meeting(&self, date: NaiveDate, index: usize) -> Result<bool> {
        let removed = self.store.remove_meeting(date, index).await?;
        if removed {
            debug!("Removed meeting {} on {}", index, date);
        }
        Ok(removed)
    }

    // ========================================================================
    // Dentist Registry
    // ========================================================================

    /// All registry entries, sorted by key.
    pub async fn dentists(&self) -> Result<Vec<DentistRecord>> {
        self.store.dentists().await
    }

    /// Add a dentist or change an existing one's color.
    pub async fn upsert_dentist(&self, name: &str, color: &str) -> Result<()> {
        require_key(name)?;
        if !valid_color(color) {
            return Err(ChairsideError::Registry(format!(
                "color must be #RRGGBB, got {color:?}"
            )));
        }
        self.store.upsert_dentist(name, color).await?;
        debug!("Upserted dentist: {} ({})", name, color);
        Ok(())
    }

    /// Remove a dentist from the registry. The reserved pseudo-role keys
    /// cannot be removed. Returns false if the key was not registered.
    pub async fn remove_dentist(&self, name: &str) -> Result<bool> {
        if is_pseudo_role(name) {
            return Err(ChairsideError::Registry(format!(
                "{name} is a reserved key and cannot be removed"
            )));
        }
        let removed = self.store.remove_dentist(name).await?;
        if removed {
            debug!("Removed dentist: {}", name);
        }
        Ok(removed)
    }

    /// Seed the default registry if it is empty.
    pub async fn ensure_seeded(&self) -> Result<()> {
        if !self.store.dentists().await?.is_empty() {
            return Ok(());
        }
        for (name, color) in DEFAULT_DENTISTS {
            self.store.upsert_dentist(name, color).await?;
        }
        info!("Seeded dentist registry with {} entries", DEFAULT_DENTISTS.len());
        Ok(())
    }
}

fn require_key(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ChairsideError::Registry(
            "dentist key must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
