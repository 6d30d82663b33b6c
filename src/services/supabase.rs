use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::profile::{normalize_id, Profile};
use crate::services::store::{
    assemble_profiles, AvailabilityRow, ProfileStore, SkillRow, StoreResult, UserRow,
};

const USERS_TABLE: &str = "sample_users";
const AVAILABILITY_TABLE: &str = "sample_user_availability";
const USERS_SELECT: &str = "*,sample_user_skills(*,skills(*))";

// Users row with the skills join embedded by PostgREST
#[derive(Debug, Deserialize)]
struct SupabaseUser {
    usn: String,
    first_name: String,
    last_name: String,
    department: String,
    year: u8,
    #[serde(default)]
    sample_user_skills: Vec<SupabaseUserSkill>,
}

#[derive(Debug, Deserialize)]
struct SupabaseUserSkill {
    #[serde(default)]
    skill_id: Option<i64>,
    proficiency_level: u8,
    #[serde(default)]
    skills: Option<SupabaseSkill>,
}

#[derive(Debug, Deserialize)]
struct SupabaseSkill {
    name: String,
}

/// Profile store reading the Supabase (PostgREST) tables over HTTP
pub struct SupabaseProfileStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseProfileStore {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    // PostgREST filter for a set of USNs, e.g. "in.(USN001,USN002)"
    fn usn_filter(ids: &[String]) -> Option<String> {
        if ids.is_empty() {
            return None;
        }
        Some(format!("in.({})", ids.join(",")))
    }

    async fn fetch_table<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        ids: &[String],
    ) -> StoreResult<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        let mut query = vec![("select", select.to_string())];
        if let Some(filter) = Self::usn_filter(ids) {
            query.push(("usn", filter));
        }

        debug!("Fetching {} with query {:?}", url, query);

        let res = self
            .client
            .get(&url)
            .query(&query)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = res.status();
        info!("Response from {} received with status: {}", table, status);

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json::<Vec<T>>().await?)
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn load_profiles(&self, requested: &[String]) -> StoreResult<HashMap<String, Profile>> {
        let ids: Vec<String> = requested
            .iter()
            .map(|id| normalize_id(id))
            .filter(|id| !id.is_empty())
            .collect();
        let ids = ids.as_slice();

        // Only blank ids were asked for; an empty filter would load everyone
        if ids.is_empty() && !requested.is_empty() {
            debug!("No usable ids in request, skipping Supabase lookup");
            return Ok(HashMap::new());
        }

        let users: Vec<SupabaseUser> = self.fetch_table(USERS_TABLE, USERS_SELECT, ids).await?;
        let availability: Vec<AvailabilityRow> =
            self.fetch_table(AVAILABILITY_TABLE, "*", ids).await?;

        let mut user_rows = Vec::with_capacity(users.len());
        let mut skill_rows = Vec::new();

        for user in users {
            for user_skill in user.sample_user_skills {
                // Skill links without a resolvable skill name are dropped
                if let Some(skill) = user_skill.skills {
                    skill_rows.push(SkillRow {
                        usn: user.usn.clone(),
                        skill_id: user_skill.skill_id,
                        skill_name: skill.name,
                        proficiency_level: user_skill.proficiency_level,
                    });
                }
            }

            user_rows.push(UserRow {
                usn: user.usn,
                first_name: user.first_name,
                last_name: user.last_name,
                department: user.department,
                year: user.year,
            });
        }

        Ok(assemble_profiles(user_rows, skill_rows, availability))
    }
}
