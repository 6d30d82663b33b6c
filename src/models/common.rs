use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::models::matching::RankedCandidate;
use crate::models::slot::{GridKind, SlotGrid, TimeSlot, Weekday};

// Request body for the pairwise match endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct MatchPercentageRequest {
    pub user1_id: String,
    pub user2_id: String,
    #[serde(default)]
    pub preferred_days: Option<Vec<String>>,
}

// Request body for the recommendations endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub candidate_ids: Vec<String>,
    #[serde(default)]
    pub preferred_days: Option<Vec<String>>,
    #[serde(default)]
    pub min_match_threshold: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// Request body for the team meetings endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct TeamMeetingRequest {
    #[serde(default)]
    pub team_member_ids: Vec<String>,
    #[serde(default)]
    pub preferred_days: Option<Vec<String>>,
    #[serde(default)]
    pub min_duration_hours: Option<u32>,
}

pub fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl From<&MatchError> for ErrorDetail {
    fn from(err: &MatchError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Envelope for every matcher response; callers check `success` before reading `data`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &MatchError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.into()),
        }
    }

    /// Failure that still carries a placeholder payload
    pub fn failure_with(err: &MatchError, data: T) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(err.into()),
        }
    }
}

// Paged recommendation list returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationPage {
    pub total_candidates: usize,
    pub returned_recommendations: usize,
    pub recommendations: Vec<RankedCandidate>,
}

// Active slot grid as reported by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct GridInfo {
    pub kind: GridKind,
    pub slots: Vec<TimeSlot>,
    pub days: Vec<Weekday>,
}

impl From<&SlotGrid> for GridInfo {
    fn from(grid: &SlotGrid) -> Self {
        Self {
            kind: grid.kind(),
            slots: grid.slots().to_vec(),
            days: Weekday::ALL.to_vec(),
        }
    }
}
