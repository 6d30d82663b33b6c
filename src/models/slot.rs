use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MatchError;
use crate::services::time_slots::{
    format_clock_time, parse_clock_time, slot_label, slots_overlap, MINUTES_PER_DAY,
};

/// Day of week, Sunday first (0=Sunday, 1=Monday, ... as stored by the profile tables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Map a stored `day_of_week` number to a day. Out-of-range values yield `None`.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in requests and JSON keys
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "sunday",
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
        }
    }

    /// Capitalised name used in slot reports
    pub fn title(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|day| day.name() == wanted)
            .copied()
            .ok_or_else(|| MatchError::InvalidDayName(s.trim().to_string()))
    }
}

/// A wall-clock interval within one day, stored as minutes since midnight.
///
/// An end at or before the start means the slot runs past midnight
/// (`22:00-00:00` is the last two-hour slot). Ordering and equality are
/// structural on `(start, end)` so slot sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SlotBounds", into = "SlotBounds")]
pub struct TimeSlot {
    start: u16,
    end: u16,
}

// Wire form of a slot: {"start": "08:00", "end": "10:00"}
#[derive(Serialize, Deserialize)]
struct SlotBounds {
    start: String,
    end: String,
}

impl From<TimeSlot> for SlotBounds {
    fn from(slot: TimeSlot) -> Self {
        SlotBounds {
            start: slot.start_label(),
            end: slot.end_label(),
        }
    }
}

impl TryFrom<SlotBounds> for TimeSlot {
    type Error = String;

    fn try_from(bounds: SlotBounds) -> Result<Self, Self::Error> {
        TimeSlot::parse(&bounds.start, &bounds.end)
    }
}

impl TimeSlot {
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, String> {
        if start_minute >= MINUTES_PER_DAY || end_minute >= MINUTES_PER_DAY {
            return Err(format!(
                "Slot bounds {}-{} are outside 0-{} minutes",
                start_minute,
                end_minute,
                MINUTES_PER_DAY - 1
            ));
        }
        Ok(Self {
            start: start_minute,
            end: end_minute,
        })
    }

    // Only used for the built-in grids, whose literals are known to be in range
    const fn hm(start_hour: u16, start_min: u16, end_hour: u16, end_min: u16) -> Self {
        Self {
            start: start_hour * 60 + start_min,
            end: end_hour * 60 + end_min,
        }
    }

    /// Build a slot from two clock strings such as `"08:00"` and `"10:00:00"`
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        Self::new(parse_clock_time(start)?, parse_clock_time(end)?)
    }

    pub fn start_minute(&self) -> u16 {
        self.start
    }

    pub fn end_minute(&self) -> u16 {
        self.end
    }

    pub fn start_label(&self) -> String {
        format_clock_time(self.start)
    }

    pub fn end_label(&self) -> String {
        format_clock_time(self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        slots_overlap(self, other)
    }

    /// Readable form, e.g. `"08:00 - 10:00"`
    pub fn label(&self) -> String {
        slot_label(self)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Which canonical grid partitions the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// 12 two-hour slots from 00:00 to midnight
    TwoHour,
    /// The 4 blocks offered by the availability form
    FourBlock,
}

impl GridKind {
    pub fn name(self) -> &'static str {
        match self {
            GridKind::TwoHour => "two_hour",
            GridKind::FourBlock => "four_block",
        }
    }
}

impl FromStr for GridKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "two_hour" => Ok(GridKind::TwoHour),
            "four_block" => Ok(GridKind::FourBlock),
            other => Err(format!("Unknown slot grid: {}", other)),
        }
    }
}

const TWO_HOUR_SLOTS: [TimeSlot; 12] = [
    TimeSlot::hm(0, 0, 2, 0),
    TimeSlot::hm(2, 0, 4, 0),
    TimeSlot::hm(4, 0, 6, 0),
    TimeSlot::hm(6, 0, 8, 0),
    TimeSlot::hm(8, 0, 10, 0),
    TimeSlot::hm(10, 0, 12, 0),
    TimeSlot::hm(12, 0, 14, 0),
    TimeSlot::hm(14, 0, 16, 0),
    TimeSlot::hm(16, 0, 18, 0),
    TimeSlot::hm(18, 0, 20, 0),
    TimeSlot::hm(20, 0, 22, 0),
    TimeSlot::hm(22, 0, 0, 0),
];

const FOUR_BLOCK_SLOTS: [TimeSlot; 4] = [
    TimeSlot::hm(9, 0, 12, 0),
    TimeSlot::hm(13, 0, 16, 0),
    TimeSlot::hm(17, 0, 20, 0),
    TimeSlot::hm(21, 0, 23, 59),
];

/// The canonical slot grid used for exact-match scoring and team slot scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotGrid {
    kind: GridKind,
    slots: Vec<TimeSlot>,
}

impl SlotGrid {
    pub fn new(kind: GridKind) -> Self {
        let slots = match kind {
            GridKind::TwoHour => TWO_HOUR_SLOTS.to_vec(),
            GridKind::FourBlock => FOUR_BLOCK_SLOTS.to_vec(),
        };
        Self { kind, slots }
    }

    pub fn two_hour() -> Self {
        Self::new(GridKind::TwoHour)
    }

    pub fn four_block() -> Self {
        Self::new(GridKind::FourBlock)
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.slots.contains(slot)
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::two_hour()
    }
}
