//! The fixed daily slot grid: eight half-hour slots split by the lunch gap,
//! plus the pure rules that derive from it (slot expansion, weekday
//! bookability, reserved morning slots).
//!
//! Everything in this module is constant data and pure functions. Nothing
//! here touches the store.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

// ============================================================================
// Time Slots
// ============================================================================

/// One of the eight atomic half-hour slots of a clinic day.
///
/// The variants are declared in chronological order, so the derived `Ord`
/// sorts slots the way they appear in the day. Serialized as the label
/// string (`"09:00-09:30"`); parsing also accepts the unpadded labels
/// (`"9:00-9:30"`) found in exports of the predecessor system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    /// 09:00-09:30
    T0900,
    /// 09:30-10:00
    T0930,
    /// 10:00-10:30
    T1000,
    /// 10:30-11:00
    T1030,
    /// 13:00-13:30
    T1300,
    /// 13:30-14:00
    T1330,
    /// 14:00-14:30
    T1400,
    /// 14:30-15:00
    T1430,
}

impl TimeSlot {
    /// All eight slots, morning first, in chronological order.
    pub const ALL: [TimeSlot; 8] = [
        TimeSlot::T0900,
        TimeSlot::T0930,
        TimeSlot::T1000,
        TimeSlot::T1030,
        TimeSlot::T1300,
        TimeSlot::T1330,
        TimeSlot::T1400,
        TimeSlot::T1430,
    ];

    /// The four morning slots.
    pub const MORNING: [TimeSlot; 4] = [
        TimeSlot::T0900,
        TimeSlot::T0930,
        TimeSlot::T1000,
        TimeSlot::T1030,
    ];

    /// The four afternoon slots.
    pub const AFTERNOON: [TimeSlot; 4] = [
        TimeSlot::T1300,
        TimeSlot::T1330,
        TimeSlot::T1400,
        TimeSlot::T1430,
    ];

    /// The canonical label, as stored and displayed.
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::T0900 => "09:00-09:30",
            TimeSlot::T0930 => "09:30-10:00",
            TimeSlot::T1000 => "10:00-10:30",
            TimeSlot::T1030 => "10:30-11:00",
            TimeSlot::T1300 => "13:00-13:30",
            TimeSlot::T1330 => "13:30-14:00",
            TimeSlot::T1400 => "14:00-14:30",
            TimeSlot::T1430 => "14:30-15:00",
        }
    }

    /// Which half-day block this slot belongs to.
    pub fn period(&self) -> Period {
        match self {
            TimeSlot::T0900 | TimeSlot::T0930 | TimeSlot::T1000 | TimeSlot::T1030 => {
                Period::Morning
            }
            _ => Period::Afternoon,
        }
    }

    /// The full block (morning or afternoon) containing this slot.
    pub fn block(&self) -> &'static [TimeSlot; 4] {
        match self.period() {
            Period::Morning => &Self::MORNING,
            Period::Afternoon => &Self::AFTERNOON,
        }
    }

    /// Position of this slot within its block (0-3).
    pub fn index_in_block(&self) -> usize {
        match self {
            TimeSlot::T0900 | TimeSlot::T1300 => 0,
            TimeSlot::T0930 | TimeSlot::T1330 => 1,
            TimeSlot::T1000 | TimeSlot::T1400 => 2,
            TimeSlot::T1030 | TimeSlot::T1430 => 3,
        }
    }

    /// Whether this slot falls under the early-morning reservation rule
    /// (the first two morning slots).
    pub fn is_early_morning(&self) -> bool {
        matches!(self, TimeSlot::T0900 | TimeSlot::T0930)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "09:00-09:30" | "9:00-9:30" => Ok(TimeSlot::T0900),
            "09:30-10:00" | "9:30-10:00" => Ok(TimeSlot::T0930),
            "10:00-10:30" => Ok(TimeSlot::T1000),
            "10:30-11:00" => Ok(TimeSlot::T1030),
            "13:00-13:30" => Ok(TimeSlot::T1300),
            "13:30-14:00" => Ok(TimeSlot::T1330),
            "14:00-14:30" => Ok(TimeSlot::T1400),
            "14:30-15:00" => Ok(TimeSlot::T1430),
            other => Err(ScheduleError::ParseLabel(other.to_string())),
        }
    }
}

impl Serialize for TimeSlot {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Periods
// ============================================================================

/// A half-day block. The lunch gap between 11:00 and 13:00 separates the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Morning,
    Afternoon,
}

impl Period {
    /// The four slots making up this block.
    pub fn slots(&self) -> &'static [TimeSlot; 4] {
        match self {
            Period::Morning => &TimeSlot::MORNING,
            Period::Afternoon => &TimeSlot::AFTERNOON,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Morning => f.write_str("morning"),
            Period::Afternoon => f.write_str("afternoon"),
        }
    }
}

// ============================================================================
// Durations
// ============================================================================

/// Appointment length, in whole slots.
///
/// Wire names (`"30min"`, `"1hour"`, `"2hours"`) match the records stored
/// by the predecessor system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotDuration {
    #[default]
    #[serde(rename = "30min")]
    HalfHour,
    #[serde(rename = "1hour")]
    OneHour,
    #[serde(rename = "2hours")]
    TwoHours,
}

impl SlotDuration {
    /// Number of consecutive slots this duration occupies.
    pub fn slots_needed(&self) -> usize {
        match self {
            SlotDuration::HalfHour => 1,
            SlotDuration::OneHour => 2,
            SlotDuration::TwoHours => 4,
        }
    }
}

impl fmt::Display for SlotDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotDuration::HalfHour => f.write_str("30min"),
            SlotDuration::OneHour => f.write_str("1hour"),
            SlotDuration::TwoHours => f.write_str("2hours"),
        }
    }
}

impl FromStr for SlotDuration {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "30min" => Ok(SlotDuration::HalfHour),
            "1hour" => Ok(SlotDuration::OneHour),
            "2hours" => Ok(SlotDuration::TwoHours),
            other => Err(ScheduleError::ParseLabel(other.to_string())),
        }
    }
}

// ============================================================================
// Slot Expansion
// ============================================================================

/// Expand a booking into the exact set of slots it occupies.
///
/// A one-hour booking takes its start slot plus the next slot in the same
/// block; a two-hour booking takes a whole block and must start at the
/// block's first slot. An expansion that would cross the lunch gap is an
/// error, never a shorter list: callers need to tell "no such expansion"
/// apart from "expansion is busy".
pub fn related_slots(
    start: TimeSlot,
    duration: SlotDuration,
) -> std::result::Result<Vec<TimeSlot>, ScheduleError> {
    let block = start.block();
    let index = start.index_in_block();
    match duration {
        SlotDuration::HalfHour => Ok(vec![start]),
        SlotDuration::OneHour => {
            if index + 1 < block.len() {
                Ok(vec![start, block[index + 1]])
            } else {
                Err(ScheduleError::InvalidSlot(format!(
                    "a 1hour booking cannot start at {start}: the next half hour falls outside the {} block",
                    start.period()
                )))
            }
        }
        SlotDuration::TwoHours => {
            if index == 0 {
                Ok(block.to_vec())
            } else {
                Err(ScheduleError::InvalidSlot(format!(
                    "a 2hours booking must start at the first slot of a block, not {start}"
                )))
            }
        }
    }
}

// ============================================================================
// Weekday Rules
// ============================================================================

/// Whether the clinic sees patients on this date (Monday through Friday).
pub fn is_clinic_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Redirect weekend dates to the following Monday; weekdays pass through.
pub fn next_bookable_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Whether the early-morning reservation applies to this slot on this date.
///
/// Monday through Thursday the first two morning slots are held for the
/// clinical dentists; the general and staff queues may not take them.
/// Friday lifts the restriction.
pub fn reserved_for_clinical(date: NaiveDate, slot: TimeSlot) -> bool {
    let weekday_restricted = matches!(
        date.weekday(),
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
    );
    weekday_restricted && slot.is_early_morning()
}

// ============================================================================
// Tests
// ============================================================================
