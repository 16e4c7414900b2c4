//! Scheduling module for the clinic's daily slot grid.
//!
//! This module carries the whole booking workflow:
//!
//! - **Slot Grid**: the fixed eight half-hour slots of a clinic day
//! - **Availability**: which slots a dentist can still be booked into
//! - **Booking**: create, edit and cancel multi-slot appointments
//! - **Opening Search**: lazy day-by-day scan for the next free opening
//! - **Rebooking**: move a cancelled appointment to the next opening
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Schedule Layer                              │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              OpeningSearch                                 │  │
//! │  │  - Day-by-day scan, bounded horizon                        │  │
//! │  │  - Lazy (date, slot) generator                             │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                           │                                      │
//! │                           ▼                                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              BookingEngine                                 │  │
//! │  │  - Create / update / cancel                                │  │
//! │  │  - One appointment copy per occupied slot                  │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                           │                                      │
//! │                           ▼                                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              Availability                                  │  │
//! │  │  - Leave, meetings, reserved mornings                      │  │
//! │  │  - Clinic-wide slot occupancy                              │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                           │                                      │
//! │                           ▼                                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              Schedule Store                                │  │
//! │  │  (appointments, leave, meetings, dentists)                 │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use chairside::schedule::{
//!     AppointmentDraft, BookingEngine, OpeningSearch, SlotDuration, TimeSlot,
//! };
//! use chairside::storage::EmbeddedScheduleStore;
//! use std::sync::Arc;
//!
//! // Create a booking engine over a shared store
//! let store = Arc::new(EmbeddedScheduleStore::new());
//! let engine = BookingEngine::new(store.clone());
//!
//! // Book a one-hour appointment
//! let draft = AppointmentDraft::new("DC", "Ana Costa")
//!     .with_phone("912345678")
//!     .with_treatment("Destartarização")
//!     .with_duration(SlotDuration::OneHour);
//! let appointment = engine.create(date, TimeSlot::T0900, draft).await?;
//!
//! // Find the next opening within the horizon
//! let mut search = OpeningSearch::new(store, "DC", SlotDuration::OneHour, date);
//! let opening = search.next_opening().await?;
//!
//! // Cancel the booking
//! engine.cancel(date, TimeSlot::T0900, &appointment).await?;
//! ```

mod availability;
mod booking;
pub mod grid;
pub mod search;
pub mod types;

pub use availability::Availability;
pub use booking::BookingEngine;
pub use grid::{
    is_clinic_day, next_bookable_day, related_slots, reserved_for_clinical, Period, SlotDuration,
    TimeSlot,
};
pub use search::{rebook_after_cancel, OpeningSearch, RebookParams, DEFAULT_SEARCH_HORIZON_DAYS};
pub use types::{
    Appointment, AppointmentDraft, AppointmentStatus, AppointmentUpdate,
};
