use async_trait::async_trait;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::profile::Profile;
use crate::services::store::{
    assemble_profiles, retain_requested, AvailabilityRow, ProfileStore, SkillRow, StoreResult,
    UserRow,
};

pub const USERS_FILE: &str = "users.csv";
pub const SKILLS_FILE: &str = "user_skills.csv";
pub const AVAILABILITY_FILE: &str = "availability.csv";

/// Profile store backed by three CSV exports in one directory.
///
/// - `users.csv`: usn, first_name, last_name, department, year
/// - `user_skills.csv` (optional): usn, skill_id, skill_name, proficiency_level
/// - `availability.csv`: usn, day_of_week, time_slot_start, time_slot_end, is_available
///
/// Files are re-read on every call, so edits are picked up without a restart.
pub struct CsvProfileStore {
    data_dir: PathBuf,
}

impl CsvProfileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if !data_dir.join(USERS_FILE).exists() {
            warn!(
                "No {} found in {}, profile lookups will fail until it exists",
                USERS_FILE,
                data_dir.display()
            );
        }
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_rows<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
        let csv_error = |source: csv::Error| StoreError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(csv_error)
    }

    /// Load every profile in the directory
    pub fn load_all(&self) -> StoreResult<HashMap<String, Profile>> {
        let users: Vec<UserRow> = Self::read_rows(&self.data_dir.join(USERS_FILE))?;

        let skills_path = self.data_dir.join(SKILLS_FILE);
        let skills: Vec<SkillRow> = if skills_path.exists() {
            Self::read_rows(&skills_path)?
        } else {
            Vec::new()
        };

        let availability: Vec<AvailabilityRow> =
            Self::read_rows(&self.data_dir.join(AVAILABILITY_FILE))?;

        info!(
            "Read {} users, {} skills and {} availability rows from {}",
            users.len(),
            skills.len(),
            availability.len(),
            self.data_dir.display()
        );

        Ok(assemble_profiles(users, skills, availability))
    }
}

#[async_trait]
impl ProfileStore for CsvProfileStore {
    async fn load_profiles(&self, ids: &[String]) -> StoreResult<HashMap<String, Profile>> {
        let profiles = self.load_all()?;
        Ok(retain_requested(profiles, ids))
    }
}

// Create the CSV store, defaulting to the container data directory
pub fn create_csv_profile_store(data_dir: Option<&Path>) -> Arc<CsvProfileStore> {
    let default_dir = Path::new("/app/data");
    let dir = data_dir.unwrap_or(default_dir);
    info!("Using CSV profile store at {}", dir.display());
    Arc::new(CsvProfileStore::new(dir))
}
