use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::slot::{TimeSlot, Weekday};

/// Normalize a student identifier (USN) the way every boundary expects it
pub fn normalize_id(id: &str) -> String {
    id.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub skill_id: Option<i64>,
    pub skill_name: String,
    /// 0-5
    pub proficiency_level: u8,
}

/// Availability for one day of the week.
///
/// `valid` always equals `available` minus `avoid`. The sets are only
/// reachable through the marking methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    available: BTreeSet<TimeSlot>,
    avoid: BTreeSet<TimeSlot>,
    valid: BTreeSet<TimeSlot>,
}

static EMPTY_DAY: DaySchedule = DaySchedule {
    available: BTreeSet::new(),
    avoid: BTreeSet::new(),
    valid: BTreeSet::new(),
};

impl DaySchedule {
    pub fn mark_available(&mut self, slot: TimeSlot) {
        self.available.insert(slot);
        if !self.avoid.contains(&slot) {
            self.valid.insert(slot);
        }
    }

    pub fn mark_avoid(&mut self, slot: TimeSlot) {
        self.avoid.insert(slot);
        self.valid.remove(&slot);
    }

    pub fn available(&self) -> &BTreeSet<TimeSlot> {
        &self.available
    }

    pub fn avoid(&self) -> &BTreeSet<TimeSlot> {
        &self.avoid
    }

    pub fn valid(&self) -> &BTreeSet<TimeSlot> {
        &self.valid
    }

    /// Whether `slot` is covered by an available entry, either exactly or by overlap
    pub fn covers(&self, slot: &TimeSlot) -> bool {
        self.available.contains(slot) || self.available.iter().any(|own| own.overlaps(slot))
    }
}

/// A student profile as supplied by a `ProfileStore`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub year: u8,
    pub skills: Vec<Skill>,
    schedule: BTreeMap<Weekday, DaySchedule>,
}

impl Profile {
    pub fn new(
        id: &str,
        first_name: &str,
        last_name: &str,
        department: &str,
        year: u8,
    ) -> Self {
        let schedule = Weekday::ALL
            .iter()
            .map(|day| (*day, DaySchedule::default()))
            .collect();

        Self {
            id: normalize_id(id),
            name: format!("{} {}", first_name, last_name).trim().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            department: department.to_string(),
            year,
            skills: Vec::new(),
            schedule,
        }
    }

    pub fn with_skill(mut self, skill_name: &str, proficiency_level: u8) -> Self {
        self.skills.push(Skill {
            skill_id: None,
            skill_name: skill_name.to_string(),
            proficiency_level,
        });
        self
    }

    pub fn with_available(mut self, day: Weekday, slot: TimeSlot) -> Self {
        self.mark_available(day, slot);
        self
    }

    pub fn with_avoid(mut self, day: Weekday, slot: TimeSlot) -> Self {
        self.mark_avoid(day, slot);
        self
    }

    pub fn mark_available(&mut self, day: Weekday, slot: TimeSlot) {
        self.schedule.entry(day).or_default().mark_available(slot);
    }

    pub fn mark_avoid(&mut self, day: Weekday, slot: TimeSlot) {
        self.schedule.entry(day).or_default().mark_avoid(slot);
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        self.schedule.get(&day).unwrap_or(&EMPTY_DAY)
    }

    pub fn schedule(&self) -> &BTreeMap<Weekday, DaySchedule> {
        &self.schedule
    }
}
