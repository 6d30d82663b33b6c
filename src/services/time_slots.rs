use chrono::{NaiveTime, Timelike};
use tracing::trace;

use crate::models::slot::TimeSlot;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

// Parse a wall-clock time ("09:00" or "09:00:00") into minutes since midnight
pub fn parse_clock_time(value: &str) -> Result<u16, String> {
    let trimmed = value.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| format!("Failed to parse time '{}': {}", value, e))?;

    // hour <= 23 and minute <= 59, so this always fits below MINUTES_PER_DAY
    Ok((parsed.hour() * 60 + parsed.minute()) as u16)
}

pub fn format_clock_time(minutes: u16) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

pub fn slot_label(slot: &TimeSlot) -> String {
    format!("{} - {}", slot.start_label(), slot.end_label())
}

// Start and end in minutes, with an end at or before the start pushed past midnight
fn day_bounds(slot: &TimeSlot) -> (u32, u32) {
    let start = u32::from(slot.start_minute());
    let mut end = u32::from(slot.end_minute());
    if end <= start {
        end += u32::from(MINUTES_PER_DAY);
    }
    (start, end)
}

/// Check whether two time slots overlap.
///
/// Intervals are half-open, so adjacent slots (`08:00-10:00`, `10:00-12:00`)
/// do not overlap. A slot whose end is at or before its start crosses
/// midnight. Zero-length slots are empty and never overlap anything,
/// including themselves.
pub fn slots_overlap(a: &TimeSlot, b: &TimeSlot) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let (start1, end1) = day_bounds(a);
    let (start2, end2) = day_bounds(b);

    let overlap = !(end1 <= start2 || end2 <= start1);
    if overlap {
        trace!("Slots {} and {} overlap", a, b);
    }
    overlap
}
