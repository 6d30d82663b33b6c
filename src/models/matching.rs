use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::profile::Skill;
use crate::models::slot::Weekday;

// Per-day scoring detail for a pair of students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBreakdown {
    /// Credited points; fractional when partial overlaps were counted
    pub common_slots: f64,
    pub total_possible: usize,
    /// Not capped at 100: partial-overlap credit can exceed the grid size
    pub day_percentage: f64,
    pub user1_available: usize,
    pub user2_available: usize,
}

// Response structure for a pairwise schedule comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub user1_id: String,
    pub user2_id: String,
    /// 0-100, one decimal
    pub match_percentage: f64,
    pub common_slots: f64,
    pub total_possible_slots: usize,
    pub day_breakdown: BTreeMap<Weekday, DayBreakdown>,
    pub meeting_potential: f64,
    pub recommendation_score: f64,
}

impl MatchResult {
    /// Zero-score result returned alongside a not-found error
    pub fn empty(user1_id: &str, user2_id: &str) -> Self {
        Self {
            user1_id: user1_id.to_string(),
            user2_id: user2_id.to_string(),
            match_percentage: 0.0,
            common_slots: 0.0,
            total_possible_slots: 0,
            day_breakdown: BTreeMap::new(),
            meeting_potential: 0.0,
            recommendation_score: 0.0,
        }
    }
}

// A teammate candidate that passed the match threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub user_id: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub year: u8,
    pub skills: Vec<Skill>,
    pub schedule_match: MatchResult,
    pub recommendation_priority: f64,
}

/// Attendance bucket of a team meeting slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotBucket {
    /// Everyone can attend
    Perfect,
    /// 80% or more
    Good,
    /// 50% or more
    Backup,
}

impl SlotBucket {
    /// Classify `attending` out of `team_size` members; below 50% is not a candidate.
    ///
    /// Integer comparisons keep boundaries like 4/5 = 80% exact.
    pub fn classify(attending: usize, team_size: usize) -> Option<Self> {
        if team_size == 0 {
            return None;
        }
        if attending >= team_size {
            Some(SlotBucket::Perfect)
        } else if attending * 5 >= team_size * 4 {
            Some(SlotBucket::Good)
        } else if attending * 2 >= team_size {
            Some(SlotBucket::Backup)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotCandidate {
    /// Capitalised day name, e.g. "Monday"
    pub day: String,
    /// "HH:MM - HH:MM"
    pub time_slot: String,
    pub start_time: String,
    pub end_time: String,
    pub availability_percentage: f64,
    pub available_members: usize,
    pub total_members: usize,
    pub available_member_names: Vec<String>,
    pub unavailable_member_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlotStats {
    pub perfect_slots: usize,
    pub good_slots: usize,
    pub backup_slots: usize,
    pub total_viable_slots: usize,
}

/// Overall outlook for a team's meeting options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingOutlook {
    Excellent,
    Good,
    Fair,
    Challenging,
    Difficult,
}

impl MeetingOutlook {
    pub fn from_counts(perfect: usize, good: usize, backup: usize) -> Self {
        if perfect >= 5 {
            MeetingOutlook::Excellent
        } else if perfect >= 2 {
            MeetingOutlook::Good
        } else if perfect >= 1 || good >= 3 {
            MeetingOutlook::Fair
        } else if good >= 1 || backup >= 3 {
            MeetingOutlook::Challenging
        } else {
            MeetingOutlook::Difficult
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MeetingOutlook::Excellent => "Excellent - Multiple perfect meeting times available",
            MeetingOutlook::Good => "Good - Several perfect meeting times available",
            MeetingOutlook::Fair => "Fair - Some good meeting opportunities",
            MeetingOutlook::Challenging => "Challenging - Limited meeting opportunities",
            MeetingOutlook::Difficult => "Difficult - Very few meeting opportunities",
        }
    }
}

// Counts here are taken before the display lists are truncated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotStatistics {
    pub total_perfect_slots: usize,
    pub total_good_slots: usize,
    pub total_backup_slots: usize,
    pub total_checked_slots: usize,
    pub success_rate: f64,
    pub day_breakdown: BTreeMap<Weekday, DaySlotStats>,
    pub outlook: MeetingOutlook,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub member_ids: Vec<String>,
    pub member_names: Vec<String>,
    pub team_size: usize,
}

// Response structure for the team meeting slot finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSlotReport {
    pub team_info: TeamInfo,
    pub perfect_slots: Vec<SlotCandidate>,
    pub good_slots: Vec<SlotCandidate>,
    pub backup_slots: Vec<SlotCandidate>,
    pub statistics: SlotStatistics,
    /// Advisory only; grid slots have a fixed length
    pub min_duration_hours: u32,
}
