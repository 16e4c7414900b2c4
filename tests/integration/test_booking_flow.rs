//! End-to-end booking lifecycle: create, edit, cancel, rebook, reload.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use chairside::config::Config;
use chairside::roster::Roster;
use chairside::schedule::{
    next_bookable_day, rebook_after_cancel, BookingEngine, RebookParams, SlotDuration, TimeSlot,
};
use chairside::storage::{create_store, EmbeddedScheduleStore, ScheduleStore};
use chairside::{AppointmentDraft, AppointmentStatus, AppointmentUpdate, ChairsideError, ScheduleError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a test configuration persisting into a temp directory.
fn create_test_config(data_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = data_dir.to_string_lossy().to_string();
    config
}

fn draft(dentist: &str, patient: &str, duration: SlotDuration) -> AppointmentDraft {
    AppointmentDraft::new(dentist, patient)
        .with_phone("917654321")
        .with_treatment("Destartarização")
        .with_duration(duration)
}

#[tokio::test]
async fn test_full_booking_lifecycle() {
    let store = Arc::new(EmbeddedScheduleStore::new());
    let engine = BookingEngine::new(store.clone());
    let monday = date(2025, 3, 10);

    // Book an hour.
    let appt = engine
        .create(monday, TimeSlot::T1000, draft("DC", "Ana", SlotDuration::OneHour))
        .await
        .unwrap();
    assert_eq!(appt.status, AppointmentStatus::Pending);

    let day = store.appointments_on(monday).await.unwrap();
    assert_eq!(day.len(), 2, "one copy per occupied slot");

    // Confirm it.
    let changes = AppointmentUpdate {
        status: Some(AppointmentStatus::Confirmed),
        ..Default::default()
    };
    let matched = engine
        .update(monday, TimeSlot::T1000, &appt, &changes)
        .await
        .unwrap();
    assert_eq!(matched, 2);

    let copies = store.appointments_in(monday, TimeSlot::T1030).await.unwrap();
    assert_eq!(copies[0].status, AppointmentStatus::Confirmed);

    // Cancel it.
    let removed = engine.cancel(monday, TimeSlot::T1000, &appt).await.unwrap();
    assert_eq!(removed, 2);
    assert!(store.appointments_on(monday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_double_booking_is_refused() {
    let store = Arc::new(EmbeddedScheduleStore::new());
    let engine = BookingEngine::new(store);
    let monday = date(2025, 3, 10);

    engine
        .create(monday, TimeSlot::T1300, draft("DC", "Ana", SlotDuration::OneHour))
        .await
        .unwrap();

    // The second half-hour of the first booking is taken, for any dentist.
    let err = engine
        .create(monday, TimeSlot::T1330, draft("DD", "Rui", SlotDuration::HalfHour))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChairsideError::Schedule(ScheduleError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_rebooking_a_friday_lands_on_monday() {
    let store = Arc::new(EmbeddedScheduleStore::new());
    let engine = BookingEngine::new(store.clone());
    let friday = date(2025, 3, 14);
    assert_eq!(next_bookable_day(friday + chrono::Duration::days(1)), date(2025, 3, 17));

    let appt = engine
        .create(friday, TimeSlot::T0900, draft("DC", "Ana", SlotDuration::HalfHour))
        .await
        .unwrap();

    let config = Config::default();
    let params = RebookParams {
        horizon_days: config.scheduling.search_horizon_days,
        ..Default::default()
    };
    let rebooked = rebook_after_cancel(&engine, friday, TimeSlot::T0900, &appt, params)
        .await
        .unwrap()
        .expect("Monday has openings");

    assert!(store.appointments_on(friday).await.unwrap().is_empty());
    let monday = date(2025, 3, 17);
    let copies = store.appointments_in(monday, TimeSlot::T0900).await.unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].id, rebooked.id);
}

#[tokio::test]
async fn test_editing_the_phone_reidentifies_the_booking() {
    let store = Arc::new(EmbeddedScheduleStore::new());
    let engine = BookingEngine::new(store.clone());
    let monday = date(2025, 3, 10);

    let appt = engine
        .create(monday, TimeSlot::T0900, draft("DC", "Ana", SlotDuration::HalfHour))
        .await
        .unwrap();

    let changes = AppointmentUpdate {
        phone: Some("960000000".to_string()),
        ..Default::default()
    };
    engine
        .update(monday, TimeSlot::T0900, &appt, &changes)
        .await
        .unwrap();

    // The pre-edit record no longer names the stored booking.
    let err = engine
        .cancel(monday, TimeSlot::T0900, &appt)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChairsideError::Schedule(ScheduleError::NotFound(_))
    ));

    // The current copy does.
    let current = store.appointments_in(monday, TimeSlot::T0900).await.unwrap()[0].clone();
    engine.cancel(monday, TimeSlot::T0900, &current).await.unwrap();
    assert!(store.appointments_on(monday).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_survives_a_restart() {
    let data_dir = TempDir::new().unwrap();
    let config = create_test_config(data_dir.path());
    let monday = date(2025, 3, 10);

    let appt = {
        let store = create_store(&config).await.unwrap();
        let engine = BookingEngine::new(store.clone());
        let roster = Roster::new(store);
        roster.ensure_seeded().await.unwrap();
        roster.record_leave(monday, "DT").await.unwrap();

        engine
            .create(monday, TimeSlot::T1300, draft("DC", "Ana", SlotDuration::TwoHours))
            .await
            .unwrap()
    };

    // A fresh store over the same directory sees everything.
    let store = create_store(&config).await.unwrap();
    let engine = BookingEngine::new(store.clone());
    let roster = Roster::new(store.clone());

    assert_eq!(store.appointments_on(monday).await.unwrap().len(), 4);
    assert_eq!(roster.leave_on(monday).await.unwrap(), vec!["DT".to_string()]);
    assert_eq!(roster.dentists().await.unwrap().len(), 8);

    // The loaded state still guards the slots.
    let err = engine
        .create(monday, TimeSlot::T1400, draft("DD", "Rui", SlotDuration::HalfHour))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChairsideError::Schedule(ScheduleError::Unavailable(_))
    ));

    // And the booking from the first run can still be cancelled.
    let removed = engine.cancel(monday, TimeSlot::T1300, &appt).await.unwrap();
    assert_eq!(removed, 4);
}
