use std::process;
use std::sync::Arc;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use team_match_service::{
    config::StoreBackend,
    create_router,
    services::{
        cache::CachedProfileStore, database::create_csv_profile_store,
        sample_data::sample_store, supabase::SupabaseProfileStore,
    },
    AppConfig, AppState, Matcher, ProfileStore,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded, try again later".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

fn build_store(config: &AppConfig) -> Arc<dyn ProfileStore> {
    let store: Arc<dyn ProfileStore> = match &config.store {
        StoreBackend::Csv { data_dir } => {
            info!("Loading profiles from CSV files in {}", data_dir.display());
            create_csv_profile_store(Some(data_dir.as_path()))
        }
        StoreBackend::Supabase { url, service_key } => {
            info!("Loading profiles from Supabase at {}", url);
            Arc::new(SupabaseProfileStore::new(url, service_key))
        }
        StoreBackend::Sample => {
            info!("Serving the built-in sample profiles");
            Arc::new(sample_store())
        }
    };

    if config.cache_ttl.is_zero() {
        info!("Profile cache disabled");
        store
    } else {
        info!("Caching profiles for {:?}", config.cache_ttl);
        Arc::new(CachedProfileStore::new(store, config.cache_ttl))
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("team_match_service=debug,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    if config.is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        info!("Running in DEVELOPMENT mode - all endpoints will be available");
    }
    info!(
        "Scoring against the {} grid ({} slots per day)",
        config.grid.kind().name(),
        config.grid.len()
    );

    // Create shared application state
    let store = build_store(&config);
    let app_state = Arc::new(AppState {
        matcher: Matcher::new(store, config.grid.clone()),
    });

    // Create router with appropriate routes based on environment
    let app = create_router(app_state, config.is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(config.request_timeout)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    info!("Server listening on {}", config.bind_addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Failed to start server");

    info!("Server has been gracefully shut down");
}
