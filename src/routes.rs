use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    get_profile, grid_info, match_percentage, profile_recommendations, team_meeting_slots,
    AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Matching endpoints are always available
    let api_routes = Router::new()
        .route("/api/match-percentage", post(match_percentage))
        .route("/api/recommendations/:user_id", post(profile_recommendations))
        .route("/api/team-meetings", post(team_meeting_slots))
        .route("/api/grid", get(grid_info));
    router = router.merge(api_routes);

    // Raw profile inspection only outside production
    if !is_production {
        let debug_routes = Router::new().route("/api/profiles/:user_id", get(get_profile));
        router = router.merge(debug_routes);

        info!("Profile inspection route enabled - server running in development mode");
    } else {
        info!("Running in production mode - profile inspection route disabled");
    }

    router.with_state(app_state)
}
