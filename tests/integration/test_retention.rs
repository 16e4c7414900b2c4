//! Retention sweeps over stores seeded through the public API.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use chairside::config::Config;
use chairside::retention::{RetentionPolicy, RetentionSweeper};
use chairside::roster::Roster;
use chairside::schedule::{BookingEngine, Period, SlotDuration, TimeSlot};
use chairside::storage::{create_store, EmbeddedScheduleStore, ScheduleStore};
use chairside::AppointmentDraft;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_day(store: &Arc<EmbeddedScheduleStore>, day: NaiveDate) {
    let engine = BookingEngine::new(store.clone());
    let roster = Roster::new(store.clone());

    engine
        .create(
            day,
            TimeSlot::T0900,
            AppointmentDraft::new("DC", "Ana")
                .with_phone("912345678")
                .with_treatment("Consulta")
                .with_duration(SlotDuration::OneHour),
        )
        .await
        .unwrap();
    roster.record_leave(day, "DD").await.unwrap();
    roster.record_meeting(day, "DT", Period::Afternoon).await.unwrap();
}

#[tokio::test]
async fn test_sweep_clears_expired_days_and_keeps_recent_ones() {
    let store = Arc::new(EmbeddedScheduleStore::new());
    let expired = date(2025, 1, 6);
    let recent = date(2025, 3, 10);
    seed_day(&store, expired).await;
    seed_day(&store, recent).await;

    let sweeper = RetentionSweeper::new(store.clone(), RetentionPolicy::default());
    let stats = sweeper.sweep_before(date(2025, 2, 1)).await.unwrap();

    assert_eq!(stats.dates_purged, 1);
    assert_eq!(stats.appointments_removed, 2);
    assert_eq!(stats.leave_removed, 1);
    assert_eq!(stats.meetings_removed, 1);

    assert!(store.appointments_on(expired).await.unwrap().is_empty());
    assert!(store.leave_on(expired).await.unwrap().is_empty());
    assert!(store.meetings_on(expired).await.unwrap().is_empty());

    assert_eq!(store.appointments_on(recent).await.unwrap().len(), 2);
    assert_eq!(store.leave_on(recent).await.unwrap().len(), 1);
    assert_eq!(store.meetings_on(recent).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_policy_from_config_sets_the_cutoff() {
    let config = Config::from_str(
        r#"
        [retention]
        horizon_days = 30
        "#,
    )
    .unwrap();

    assert_eq!(config.retention.horizon_days, 30);
    assert_eq!(config.retention.cutoff(date(2025, 3, 10)), date(2025, 2, 8));
}

#[tokio::test]
async fn test_purged_data_stays_gone_after_a_restart() {
    let data_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.data_dir = data_dir.path().to_string_lossy().to_string();

    let expired = date(2025, 1, 6);
    {
        let store = create_store(&config).await.unwrap();
        seed_day(&store, expired).await;

        let sweeper = RetentionSweeper::new(store, config.retention.clone());
        let stats = sweeper.sweep_before(date(2025, 2, 1)).await.unwrap();
        assert_eq!(stats.dates_purged, 1);
    }

    let store = create_store(&config).await.unwrap();
    assert!(store.appointments_on(expired).await.unwrap().is_empty());
    assert!(store.leave_on(expired).await.unwrap().is_empty());
    assert!(store.meetings_on(expired).await.unwrap().is_empty());
}
