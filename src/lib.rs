//! Chairside: Clinic Appointment Scheduling
//!
//! A Rust library for a dental clinic's appointment calendar: slot
//! availability, multi-slot booking, dentist leave and meetings, and
//! retention of old schedule data.

pub mod config;
pub mod error;
pub mod retention;
pub mod roster;
pub mod schedule;
pub mod storage;

pub use config::Config;
pub use error::{ChairsideError, ConfigError, Result, ScheduleError, StorageError};
pub use retention::{RetentionPolicy, RetentionSweeper, SweepStats};
pub use roster::{
    DentistRecord, Meeting, Roster, DEFAULT_DENTISTS, GENERAL_QUEUE, SCHOOL_DAY, STAFF_QUEUE,
};
pub use schedule::{
    is_clinic_day, next_bookable_day, rebook_after_cancel, related_slots, reserved_for_clinical,
    Appointment, AppointmentDraft, AppointmentStatus, AppointmentUpdate, Availability,
    BookingEngine, OpeningSearch, Period, RebookParams, SlotDuration, TimeSlot,
    DEFAULT_SEARCH_HORIZON_DAYS,
};
pub use storage::{
    create_store, EmbeddedScheduleStore, PurgeCounts, ReserveOutcome, ScheduleStore,
};
