//! Appointment types.
//!
//! An appointment is stored once per occupied slot; every copy carries the
//! same id and fields, and all copies are updated or removed together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::grid::SlotDuration;

// ============================================================================
// Appointments
// ============================================================================

/// A booked appointment, as stored in each of its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier, shared by every slot copy of the same booking.
    pub id: String,
    /// Dentist key (a name in the dentist registry).
    pub dentist: String,
    /// Patient name.
    pub patient: String,
    /// Patient phone number.
    pub phone: String,
    /// Treatment description.
    pub treatment: String,
    /// Booked length. Decides how many slot copies exist.
    #[serde(default)]
    pub duration: SlotDuration,
    /// Confirmation state.
    #[serde(default)]
    pub status: AppointmentStatus,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether two records describe the same logical booking.
    ///
    /// Identity is the field tuple (dentist, patient, phone, treatment),
    /// not the id. This is the lookup contract updates and cancellations
    /// run on; note that editing a phone number re-identifies the booking.
    pub fn same_booking(&self, other: &Appointment) -> bool {
        self.dentist == other.dentist
            && self.patient == other.patient
            && self.phone == other.phone
            && self.treatment == other.treatment
    }
}

/// Confirmation state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, awaiting confirmation.
    #[default]
    Pending,
    /// Confirmed by the patient.
    Confirmed,
    /// Cancelled but still on record.
    Cancelled,
}

// ============================================================================
// Drafts
// ============================================================================

/// The caller-supplied fields of a booking. The engine assigns the id and
/// timestamps when the draft is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentDraft {
    /// Dentist key.
    pub dentist: String,
    /// Patient name.
    pub patient: String,
    /// Patient phone number.
    #[serde(default)]
    pub phone: String,
    /// Treatment description.
    #[serde(default)]
    pub treatment: String,
    /// Booked length.
    #[serde(default)]
    pub duration: SlotDuration,
    /// Initial confirmation state.
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl AppointmentDraft {
    /// Create a draft for a dentist and patient.
    pub fn new(dentist: impl Into<String>, patient: impl Into<String>) -> Self {
        Self {
            dentist: dentist.into(),
            patient: patient.into(),
            ..Default::default()
        }
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Set the treatment description.
    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = treatment.into();
        self
    }

    /// Set the booked length.
    pub fn with_duration(mut self, duration: SlotDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the initial confirmation state.
    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Materialize the draft into an appointment with the given id.
    pub fn into_appointment(self, id: impl Into<String>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: id.into(),
            dentist: self.dentist,
            patient: self.patient,
            phone: self.phone,
            treatment: self.treatment,
            duration: self.duration,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Updates
// ============================================================================

/// Field edits for an existing booking.
///
/// Applied in place to every slot copy; the copies keep their ids and their
/// slots. Changing `duration` here records the new length but never moves
/// or resizes the footprint; resizing is a cancel plus a fresh booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    /// New dentist key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dentist: Option<String>,
    /// New patient name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New treatment description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    /// New recorded length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<SlotDuration>,
    /// New confirmation state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentUpdate {
    /// Apply this update to a stored copy.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(ref dentist) = self.dentist {
            appointment.dentist = dentist.clone();
        }
        if let Some(ref patient) = self.patient {
            appointment.patient = patient.clone();
        }
        if let Some(ref phone) = self.phone {
            appointment.phone = phone.clone();
        }
        if let Some(ref treatment) = self.treatment {
            appointment.treatment = treatment.clone();
        }
        if let Some(duration) = self.duration {
            appointment.duration = duration;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        appointment.updated_at = Utc::now();
    }
}

// ============================================================================
// Tests
// ============================================================================
