//! In-memory schedule store with optional JSON file persistence.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::info;

use crate::error::{ChairsideError, Result, StorageError};
use crate::roster::{DentistRecord, Meeting};
use crate::schedule::grid::TimeSlot;
use crate::schedule::types::{Appointment, AppointmentUpdate};
use crate::storage::{PurgeCounts, ReserveOutcome, ScheduleStore};

// ============================================================================
// Internal Data Structure
// ============================================================================

/// Internal data storage structure.
#[derive(Debug, Default)]
struct ScheduleData {
    /// Appointment copies: date -> slot -> records in that slot.
    appointments: BTreeMap<NaiveDate, BTreeMap<TimeSlot, Vec<Appointment>>>,
    /// Full-day leave: date -> dentist keys.
    leave: BTreeMap<NaiveDate, Vec<String>>,
    /// Half-day meetings: date -> meetings in insertion order.
    meetings: BTreeMap<NaiveDate, Vec<Meeting>>,
    /// Dentist registry: key -> display color.
    dentists: BTreeMap<String, String>,
}

impl ScheduleData {
    /// Drop empty slot lists for a date, and the date bucket itself once
    /// nothing is left in it.
    fn prune_appointments(&mut self, date: NaiveDate) {
        let empty = match self.appointments.get_mut(&date) {
            Some(day) => {
                day.retain(|_, list| !list.is_empty());
                day.is_empty()
            }
            None => false,
        };
        if empty {
            self.appointments.remove(&date);
        }
    }

    /// Drop a date's leave bucket once it is empty.
    fn prune_leave(&mut self, date: NaiveDate) {
        if self.leave.get(&date).is_some_and(|l| l.is_empty()) {
            self.leave.remove(&date);
        }
    }

    /// Drop a date's meeting bucket once it is empty.
    fn prune_meetings(&mut self, date: NaiveDate) {
        if self.meetings.get(&date).is_some_and(|l| l.is_empty()) {
            self.meetings.remove(&date);
        }
    }
}

// ============================================================================
// Embedded Implementation
// ============================================================================

/// In-memory schedule store with optional persistence.
///
/// All data sits behind a single `RwLock`, which is what makes the
/// conditional operations of [`ScheduleStore`] atomic here: the occupancy
/// check and the writes of a reservation happen under one write guard.
pub struct EmbeddedScheduleStore {
    /// All data protected by a single RwLock for consistent access.
    data: RwLock<ScheduleData>,
    /// Optional persistence file path.
    persistence_path: Option<PathBuf>,
    /// Mutex for persistence operations.
    persist_lock: AsyncMutex<()>,
}

impl EmbeddedScheduleStore {
    /// Create a new in-memory store without persistence.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(ScheduleData::default()),
            persistence_path: None,
            persist_lock: AsyncMutex::new(()),
        }
    }

    /// Create a store with file persistence under `data_dir`.
    pub async fn with_persistence(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(StorageError::Io)?;

        let persistence_path = data_dir.join("schedule.json");
        let store = Self {
            data: RwLock::new(ScheduleData::default()),
            persistence_path: Some(persistence_path.clone()),
            persist_lock: AsyncMutex::new(()),
        };

        // Load existing data if present
        if persistence_path.exists() {
            store.load_from_file(&persistence_path).await?;
        }

        Ok(store)
    }

    /// Load data from a JSON file.
    async fn load_from_file(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ChairsideError::Io)?;

        let persisted: PersistenceData =
            serde_json::from_str(&content).map_err(ChairsideError::Serialization)?;

        let mut data = self.data.write().await;

        for row in persisted.appointments {
            data.appointments
                .entry(row.date)
                .or_default()
                .entry(row.slot)
                .or_default()
                .push(row.appointment);
        }

        for row in persisted.leave {
            let list = data.leave.entry(row.date).or_default();
            if !list.contains(&row.dentist) {
                list.push(row.dentist);
            }
        }

        for meeting in persisted.meetings {
            data.meetings.entry(meeting.date).or_default().push(meeting);
        }

        for record in persisted.dentists {
            data.dentists.insert(record.name, record.color);
        }

        info!(
            "Loaded {} appointment days, {} leave days and {} dentists from {}",
            data.appointments.len(),
            data.leave.len(),
            data.dentists.len(),
            path.display()
        );

        Ok(())
    }

    /// Persist data to file if persistence is enabled.
    async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.persistence_path else {
            return Ok(());
        };

        let _lock = self.persist_lock.lock().await;

        let data = self.data.read().await;
        let mut appointments = Vec::new();
        for (date, day) in &data.appointments {
            for (slot, list) in day {
                for appointment in list {
                    appointments.push(AppointmentRow {
                        date: *date,
                        slot: *slot,
                        appointment: appointment.clone(),
                    });
                }
            }
        }
        let mut leave = Vec::new();
        for (date, dentists) in &data.leave {
            for dentist in dentists {
                leave.push(LeaveRow {
                    date: *date,
                    dentist: dentist.clone(),
                });
            }
        }
        let meetings: Vec<Meeting> = data.meetings.values().flatten().cloned().collect();
        let dentists: Vec<DentistRecord> = data
            .dentists
            .iter()
            .map(|(name, color)| DentistRecord {
                name: name.clone(),
                color: color.clone(),
            })
            .collect();
        drop(data);

        let persisted = PersistenceData {
            version: 1,
            appointments,
            leave,
            meetings,
            dentists,
        };

        let content =
            serde_json::to_string_pretty(&persisted).map_err(ChairsideError::Serialization)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(ChairsideError::Io)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(ChairsideError::Io)?;

        Ok(())
    }
}

impl Default for EmbeddedScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for EmbeddedScheduleStore {
    // ========================================================================
    // Appointments
    // ========================================================================

    async fn appointments_on(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<TimeSlot, Vec<Appointment>>> {
        let data = self.data.read().await;
        Ok(data.appointments.get(&date).cloned().unwrap_or_default())
    }

    async fn appointments_in(&self, date: NaiveDate, slot: TimeSlot) -> Result<Vec<Appointment>> {
        let data = self.data.read().await;
        Ok(data
            .appointments
            .get(&date)
            .and_then(|day| day.get(&slot))
            .cloned()
            .unwrap_or_default())
    }

    async fn reserve(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        appointment: &Appointment,
    ) -> Result<ReserveOutcome> {
        let mut data = self.data.write().await;

        let busy: Vec<TimeSlot> = match data.appointments.get(&date) {
            Some(day) => slots
                .iter()
                .copied()
                .filter(|slot| day.get(slot).is_some_and(|list| !list.is_empty()))
                .collect(),
            None => Vec::new(),
        };
        if !busy.is_empty() {
            return Ok(ReserveOutcome::Occupied(busy));
        }

        let day = data.appointments.entry(date).or_default();
        for slot in slots {
            day.entry(*slot).or_default().push(appointment.clone());
        }
        drop(data);

        if let Err(err) = self.persist().await {
            // The caller is told the reservation failed, so the copies must
            // not stay behind in memory.
            let mut data = self.data.write().await;
            if let Some(day) = data.appointments.get_mut(&date) {
                for slot in slots {
                    if let Some(list) = day.get_mut(slot) {
                        list.retain(|a| a.id != appointment.id);
                    }
                }
            }
            data.prune_appointments(date);
            return Err(err);
        }

        Ok(ReserveOutcome::Reserved)
    }

    async fn amend(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        original: &Appointment,
        update: &AppointmentUpdate,
    ) -> Result<usize> {
        let mut data = self.data.write().await;

        let mut matched = 0;
        if let Some(day) = data.appointments.get_mut(&date) {
            for slot in slots {
                if let Some(list) = day.get_mut(slot) {
                    for appointment in list.iter_mut().filter(|a| a.same_booking(original)) {
                        update.apply_to(appointment);
                        matched += 1;
                    }
                }
            }
        }
        drop(data);

        if matched > 0 {
            self.persist().await?;
        }
        Ok(matched)
    }

    async fn withdraw(
        &self,
        date: NaiveDate,
        slots: &[TimeSlot],
        original: &Appointment,
    ) -> Result<usize> {
        let mut data = self.data.write().await;

        let mut removed = 0;
        if let Some(day) = data.appointments.get_mut(&date) {
            for slot in slots {
                if let Some(list) = day.get_mut(slot) {
                    let before = list.len();
                    list.retain(|a| !a.same_booking(original));
                    removed += before - list.len();
                }
            }
        }
        if removed > 0 {
            data.prune_appointments(date);
        }
        drop(data);

        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Leave
    // ========================================================================

    async fn leave_on(&self, date: NaiveDate) -> Result<Vec<String>> {
        let data = self.data.read().await;
        Ok(data.leave.get(&date).cloned().unwrap_or_default())
    }

    async fn record_leave(&self, date: NaiveDate, dentist: &str) -> Result<()> {
        let mut data = self.data.write().await;
        let list = data.leave.entry(date).or_default();
        if !list.iter().any(|d| d == dentist) {
            list.push(dentist.to_string());
        }
        drop(data);

        self.persist().await?;
        Ok(())
    }

    async fn remove_leave(&self, date: NaiveDate, dentist: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let removed = match data.leave.get_mut(&date) {
            Some(list) => {
                let before = list.len();
                list.retain(|d| d != dentist);
                before != list.len()
            }
            None => false,
        };
        data.prune_leave(date);
        drop(data);

        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    async fn meetings_on(&self, date: NaiveDate) -> Result<Vec<Meeting>> {
        let data = self.data.read().await;
        Ok(data.meetings.get(&date).cloned().unwrap_or_default())
    }

    async fn record_meeting(&self, meeting: Meeting) -> Result<()> {
        let mut data = self.data.write().await;
        data.meetings.entry(meeting.date).or_default().push(meeting);
        drop(data);

        self.persist().await?;
        Ok(())
    }

    async fn remove_meeting(&self, date: NaiveDate, index: usize) -> Result<bool> {
        let mut data = self.data.write().await;
        let removed = match data.meetings.get_mut(&date) {
            Some(list) if index < list.len() => {
                list.remove(index);
                true
            }
            _ => false,
        };
        data.prune_meetings(date);
        drop(data);

        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Dentist Registry
    // ========================================================================

    async fn dentists(&self) -> Result<Vec<DentistRecord>> {
        let data = self.data.read().await;
        Ok(data
            .dentists
            .iter()
            .map(|(name, color)| DentistRecord {
                name: name.clone(),
                color: color.clone(),
            })
            .collect())
    }

    async fn upsert_dentist(&self, name: &str, color: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.dentists.insert(name.to_string(), color.to_string());
        drop(data);

        self.persist().await?;
        Ok(())
    }

    async fn remove_dentist(&self, name: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let removed = data.dentists.remove(name).is_some();
        drop(data);

        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    async fn dates_before(&self, cutoff: NaiveDate) -> Result<Vec<NaiveDate>> {
        let data = self.data.read().await;
        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
        dates.extend(data.appointments.keys().filter(|d| **d < cutoff));
        dates.extend(data.leave.keys().filter(|d| **d < cutoff));
        dates.extend(data.meetings.keys().filter(|d| **d < cutoff));
        Ok(dates.into_iter().collect())
    }

    async fn purge_date(&self, date: NaiveDate) -> Result<PurgeCounts> {
        let mut data = self.data.write().await;
        let mut counts = PurgeCounts::default();
        if let Some(day) = data.appointments.remove(&date) {
            counts.appointments = day.values().map(|list| list.len()).sum();
        }
        if let Some(list) = data.leave.remove(&date) {
            counts.leave = list.len();
        }
        if let Some(list) = data.meetings.remove(&date) {
            counts.meetings = list.len();
        }
        drop(data);

        if counts != PurgeCounts::default() {
            self.persist().await?;
        }
        Ok(counts)
    }

    async fn clear(&self) -> Result<()> {
        let mut data = self.data.write().await;
        *data = ScheduleData::default();
        drop(data);

        self.persist().await?;
        Ok(())
    }
}

// ============================================================================
// Persistence Data Structure
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct AppointmentRow {
    date: NaiveDate,
    slot: TimeSlot,
    appointment: Appointment,
}

#[derive(Debug, Serialize, Deserialize)]
struct LeaveRow {
    date: NaiveDate,
    dentist: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistenceData {
    version: u32,
    appointments: Vec<AppointmentRow>,
    leave: Vec<LeaveRow>,
    meetings: Vec<Meeting>,
    dentists: Vec<DentistRecord>,
}

// ============================================================================
// Tests
// ============================================================================
