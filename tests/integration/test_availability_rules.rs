//! End-to-end checks of the clinic's availability rules.

use std::sync::Arc;

use chrono::NaiveDate;

use chairside::roster::{Meeting, Roster, GENERAL_QUEUE, SCHOOL_DAY, STAFF_QUEUE};
use chairside::schedule::{
    Availability, BookingEngine, Period, SlotDuration, TimeSlot,
};
use chairside::storage::EmbeddedScheduleStore;
use chairside::AppointmentDraft;

type Store = EmbeddedScheduleStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Arc<Store>, Availability<Store>, BookingEngine<Store>, Roster<Store>) {
    let store = Arc::new(EmbeddedScheduleStore::new());
    (
        store.clone(),
        Availability::new(store.clone()),
        BookingEngine::new(store.clone()),
        Roster::new(store),
    )
}

fn draft(dentist: &str, patient: &str, duration: SlotDuration) -> AppointmentDraft {
    AppointmentDraft::new(dentist, patient)
        .with_phone("913214321")
        .with_treatment("Consulta")
        .with_duration(duration)
}

#[tokio::test]
async fn test_weekday_first_slots_are_reserved_for_clinical_dentists() {
    let (_, availability, _, _) = setup();
    let monday = date(2025, 3, 10);

    let dc = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DC", None, None)
        .await
        .unwrap();
    assert!(dc.contains(&TimeSlot::T0900), "clinical dentists keep 09:00");
    assert!(dc.contains(&TimeSlot::T0930));

    for queue in [GENERAL_QUEUE, STAFF_QUEUE] {
        let open = availability
            .find_available_slots(monday, SlotDuration::HalfHour, queue, None, None)
            .await
            .unwrap();
        assert!(!open.contains(&TimeSlot::T0900), "{} is kept out of 09:00", queue);
        assert!(!open.contains(&TimeSlot::T0930), "{} is kept out of 09:30", queue);
        assert!(
            open.contains(&TimeSlot::T1000),
            "the rest of the morning stays open for {}",
            queue
        );
    }
}

#[tokio::test]
async fn test_friday_lifts_the_morning_reservation() {
    let (_, availability, _, _) = setup();
    let friday = date(2025, 3, 14);

    let open = availability
        .find_available_slots(friday, SlotDuration::HalfHour, GENERAL_QUEUE, None, None)
        .await
        .unwrap();
    assert!(open.contains(&TimeSlot::T0900));
    assert!(open.contains(&TimeSlot::T0930));
}

#[tokio::test]
async fn test_two_hour_booking_fills_the_afternoon_for_every_dentist() {
    let (_, availability, engine, _) = setup();
    let friday = date(2025, 3, 14);

    engine
        .create(friday, TimeSlot::T1300, draft("DC", "Ana", SlotDuration::TwoHours))
        .await
        .unwrap();

    // One record in a slot blocks the whole clinic; this is the kept
    // contract, not a bug.
    let other = availability
        .find_available_slots(
            friday,
            SlotDuration::HalfHour,
            "DD",
            None,
            Some(Period::Afternoon),
        )
        .await
        .unwrap();
    assert!(other.is_empty(), "the booked afternoon blocks other dentists too");

    let morning = availability
        .find_available_slots(
            friday,
            SlotDuration::HalfHour,
            "DD",
            None,
            Some(Period::Morning),
        )
        .await
        .unwrap();
    assert_eq!(morning, TimeSlot::MORNING.to_vec(), "the morning is untouched");
}

#[tokio::test]
async fn test_meeting_blanks_one_period_for_one_dentist() {
    let (_, availability, _, roster) = setup();
    let monday = date(2025, 3, 10);

    roster
        .record_meeting(monday, "DD", Period::Morning)
        .await
        .unwrap();

    let dd_morning = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DD", None, Some(Period::Morning))
        .await
        .unwrap();
    assert!(dd_morning.is_empty(), "the meeting takes DD's whole morning");

    let dd_afternoon = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DD", None, Some(Period::Afternoon))
        .await
        .unwrap();
    assert_eq!(dd_afternoon, TimeSlot::AFTERNOON.to_vec());

    let dc = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DC", None, Some(Period::Morning))
        .await
        .unwrap();
    assert_eq!(dc, TimeSlot::MORNING.to_vec(), "other dentists are unaffected");
}

#[tokio::test]
async fn test_leave_blanks_the_whole_day() {
    let (_, availability, _, roster) = setup();
    let monday = date(2025, 3, 10);

    roster.record_leave(monday, "DC").await.unwrap();

    let dc = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DC", None, None)
        .await
        .unwrap();
    assert!(dc.is_empty());

    let dd = availability
        .find_available_slots(monday, SlotDuration::HalfHour, "DD", None, None)
        .await
        .unwrap();
    assert!(!dd.is_empty(), "leave binds only the dentist who took it");
}

#[tokio::test]
async fn test_school_day_closes_the_clinic_for_everyone() {
    let (_, availability, _, roster) = setup();
    let monday = date(2025, 3, 10);

    roster.record_leave(monday, SCHOOL_DAY).await.unwrap();

    for dentist in ["DC", "DD", GENERAL_QUEUE, STAFF_QUEUE] {
        let open = availability
            .find_available_slots(monday, SlotDuration::HalfHour, dentist, None, None)
            .await
            .unwrap();
        assert!(open.is_empty(), "school day blocks {}", dentist);
    }
}

#[tokio::test]
async fn test_weekends_have_no_slots() {
    let (_, availability, _, _) = setup();

    for day in [date(2025, 3, 15), date(2025, 3, 16)] {
        let open = availability
            .find_available_slots(day, SlotDuration::HalfHour, "DC", None, None)
            .await
            .unwrap();
        assert!(open.is_empty());
    }
}

#[tokio::test]
async fn test_one_hour_booking_never_straddles_lunch() {
    let (_, availability, _, _) = setup();
    let monday = date(2025, 3, 10);

    let starts = availability
        .find_available_slots(monday, SlotDuration::OneHour, "DC", None, Some(Period::Morning))
        .await
        .unwrap();
    assert_eq!(
        starts,
        vec![TimeSlot::T0900, TimeSlot::T0930, TimeSlot::T1000],
        "10:30 cannot start an hour without crossing lunch"
    );
}

#[tokio::test]
async fn test_two_hour_booking_needs_a_whole_free_block() {
    let (_, availability, engine, _) = setup();
    let monday = date(2025, 3, 10);

    let starts = availability
        .find_available_slots(monday, SlotDuration::TwoHours, "DC", None, None)
        .await
        .unwrap();
    assert_eq!(starts, vec![TimeSlot::T0900, TimeSlot::T1300]);

    engine
        .create(monday, TimeSlot::T1400, draft("DD", "Rui", SlotDuration::HalfHour))
        .await
        .unwrap();

    let starts = availability
        .find_available_slots(monday, SlotDuration::TwoHours, "DC", None, None)
        .await
        .unwrap();
    assert_eq!(
        starts,
        vec![TimeSlot::T0900],
        "one taken slot disqualifies the whole afternoon block"
    );
}

#[tokio::test]
async fn test_meetings_stack_with_occupancy() {
    let (_, availability, engine, roster) = setup();
    let tuesday = date(2025, 3, 11);

    roster
        .record_meeting(tuesday, "DC", Period::Morning)
        .await
        .unwrap();
    engine
        .create(tuesday, TimeSlot::T1300, draft("DD", "Rui", SlotDuration::OneHour))
        .await
        .unwrap();

    let dc = availability
        .find_available_slots(tuesday, SlotDuration::HalfHour, "DC", None, None)
        .await
        .unwrap();
    assert_eq!(dc, vec![TimeSlot::T1400, TimeSlot::T1430]);
}
