use axum::{
    extract::{Json as ExtractJson, Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::MatchError;
use crate::models::common::{
    ApiResponse, GridInfo, MatchPercentageRequest, RecommendationPage, RecommendationRequest,
    TeamMeetingRequest,
};
use crate::models::matching::{MatchResult, MeetingSlotReport};
use crate::models::profile::{normalize_id, Profile};
use crate::services::matcher::Matcher;

// AppState struct containing shared resources
pub struct AppState {
    pub matcher: Matcher,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, StatusCode>;

// Store failures become a 500; everything else is reported in the body
fn failure<T>(context: &str, err: MatchError) -> ApiResult<T> {
    if err.is_store_failure() {
        error!("{}: {}", context, err);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    warn!("{}: {}", context, err);
    Ok(Json(ApiResponse::failure(&err)))
}

// Pairwise schedule match endpoint
pub async fn match_percentage(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<MatchPercentageRequest>,
) -> ApiResult<MatchResult> {
    info!(
        "Received match request for {} and {}",
        request.user1_id, request.user2_id
    );

    match state
        .matcher
        .match_percentage(
            &request.user1_id,
            &request.user2_id,
            request.preferred_days.as_deref(),
        )
        .await
    {
        Ok(result) => Ok(Json(ApiResponse::ok(result))),
        Err(err @ MatchError::NotFound(_)) => {
            warn!("Match request failed: {}", err);
            let empty = MatchResult::empty(
                &normalize_id(&request.user1_id),
                &normalize_id(&request.user2_id),
            );
            Ok(Json(ApiResponse::failure_with(&err, empty)))
        }
        Err(err) => failure("Match request failed", err),
    }
}

// Teammate recommendations endpoint
pub async fn profile_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ExtractJson(request): ExtractJson<RecommendationRequest>,
) -> ApiResult<RecommendationPage> {
    let total_candidates = request.candidate_ids.len();
    info!(
        "Received recommendation request for {} with {} candidates",
        user_id, total_candidates
    );

    match state
        .matcher
        .recommendations(
            &user_id,
            &request.candidate_ids,
            request.preferred_days.as_deref(),
            request.min_match_threshold,
        )
        .await
    {
        Ok(mut recommendations) => {
            let matched = recommendations.len();
            recommendations.truncate(request.limit);
            info!(
                "Returning {} of {} matching candidates for {}",
                recommendations.len(),
                matched,
                user_id
            );
            Ok(Json(ApiResponse::ok(RecommendationPage {
                total_candidates,
                returned_recommendations: recommendations.len(),
                recommendations,
            })))
        }
        Err(err) => failure("Recommendation request failed", err),
    }
}

// Team meeting slot suggestions endpoint
pub async fn team_meeting_slots(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<TeamMeetingRequest>,
) -> ApiResult<MeetingSlotReport> {
    info!(
        "Received team meeting request for {:?}",
        request.team_member_ids
    );

    match state
        .matcher
        .team_meeting_slots(
            &request.team_member_ids,
            request.preferred_days.as_deref(),
            request.min_duration_hours,
        )
        .await
    {
        Ok(report) => Ok(Json(ApiResponse::ok(report))),
        Err(err) => failure("Team meeting request failed", err),
    }
}

// Active grid endpoint
pub async fn grid_info(State(state): State<Arc<AppState>>) -> Json<GridInfo> {
    Json(GridInfo::from(state.matcher.grid()))
}

// Profile lookup endpoint, development only
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Profile> {
    info!("Received profile request for {}", user_id);

    match state.matcher.profile(&user_id).await {
        Ok(profile) => Ok(Json(ApiResponse::ok(profile))),
        Err(err) => failure("Profile request failed", err),
    }
}
