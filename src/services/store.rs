//! Profile store abstraction.
//!
//! The matcher never talks to a database directly. Every backend (CSV files,
//! Supabase, the in-memory sample set) implements [`ProfileStore`] and turns
//! its raw rows into [`Profile`] values through [`assemble_profiles`].

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::profile::{normalize_id, Profile, Skill};
use crate::models::slot::{TimeSlot, Weekday};

pub type StoreResult<T> = Result<T, StoreError>;

/// Source of student profiles.
///
/// Unknown identifiers are simply absent from the returned map. An empty
/// identifier list loads every profile the backend knows about.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profiles(&self, ids: &[String]) -> StoreResult<HashMap<String, Profile>>;
}

// Row of the users table
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub usn: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub year: u8,
}

// Row of the user skills table, already joined with the skill name
#[derive(Debug, Clone, Deserialize)]
pub struct SkillRow {
    pub usn: String,
    #[serde(default)]
    pub skill_id: Option<i64>,
    pub skill_name: String,
    pub proficiency_level: u8,
}

// Row of the availability table; `is_available = false` marks a slot to avoid
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRow {
    pub usn: String,
    pub day_of_week: i64,
    pub time_slot_start: String,
    pub time_slot_end: String,
    pub is_available: bool,
}

/// Build profiles from the three row sets.
///
/// Skill and availability rows for unknown users are ignored, as are
/// availability rows with an out-of-range day or an unparseable time.
pub fn assemble_profiles(
    users: Vec<UserRow>,
    skills: Vec<SkillRow>,
    availability: Vec<AvailabilityRow>,
) -> HashMap<String, Profile> {
    let mut profiles: HashMap<String, Profile> = users
        .into_iter()
        .map(|user| {
            let profile = Profile::new(
                &user.usn,
                &user.first_name,
                &user.last_name,
                &user.department,
                user.year,
            );
            (profile.id.clone(), profile)
        })
        .collect();

    for row in skills {
        if let Some(profile) = profiles.get_mut(&normalize_id(&row.usn)) {
            profile.skills.push(Skill {
                skill_id: row.skill_id,
                skill_name: row.skill_name,
                proficiency_level: row.proficiency_level,
            });
        }
    }

    for row in availability {
        let Some(profile) = profiles.get_mut(&normalize_id(&row.usn)) else {
            continue;
        };

        let Some(day) = Weekday::from_index(row.day_of_week) else {
            warn!(
                "Skipping availability for {} with day_of_week {}",
                row.usn, row.day_of_week
            );
            continue;
        };

        let slot = match TimeSlot::parse(&row.time_slot_start, &row.time_slot_end) {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Skipping availability row for {}: {}", row.usn, e);
                continue;
            }
        };

        if row.is_available {
            profile.mark_available(day, slot);
        } else {
            profile.mark_avoid(day, slot);
        }
    }

    debug!("Assembled {} profiles", profiles.len());
    profiles
}

/// Keep only the requested identifiers; an empty request keeps everything
pub fn retain_requested(
    mut profiles: HashMap<String, Profile>,
    ids: &[String],
) -> HashMap<String, Profile> {
    if ids.is_empty() {
        return profiles;
    }
    let wanted: Vec<String> = ids.iter().map(|id| normalize_id(id)).collect();
    profiles.retain(|id, _| wanted.contains(id));
    profiles
}

/// In-memory store used for the sample dataset and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: HashMap<String, Profile>,
}

impl MemoryProfileStore {
    pub fn new(profiles: impl IntoIterator<Item = Profile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load_profiles(&self, ids: &[String]) -> StoreResult<HashMap<String, Profile>> {
        Ok(retain_requested(self.profiles.clone(), ids))
    }
}
