use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, policies, profiles, releases, wanted};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/scheduler/status", get(handlers::scheduler_status))
        // Release parsing and interactive scored search
        .route("/parse", post(releases::parse_title))
        .route("/search/scored", post(releases::search_scored))
        // Monitored items
        .route("/wanted", get(wanted::list_items))
        .route("/wanted", post(wanted::create_item))
        .route("/wanted/{id}", delete(wanted::delete_item))
        .route("/wanted/{id}/search", post(wanted::search_item))
        // Quality profiles, custom formats, delay profiles, release filters
        .route("/profiles", get(profiles::list_profiles))
        .route("/profiles", post(profiles::save_profile))
        .route("/profiles/{id}", delete(profiles::delete_profile))
        .route("/formats", get(profiles::list_formats))
        .route("/formats", post(profiles::save_format))
        .route("/formats/{id}", delete(profiles::delete_format))
        .route("/delay-profiles", get(profiles::list_delay_profiles))
        .route("/delay-profiles", post(profiles::save_delay_profile))
        .route("/delay-profiles/{id}", delete(profiles::delete_delay_profile))
        .route("/filters", get(profiles::list_filters))
        .route("/filters", post(profiles::save_filter))
        .route("/filters/{id}", delete(profiles::delete_filter))
        // Gating policies
        .route("/blocklist", get(policies::list_blocklist))
        .route("/blocklist", post(policies::add_blocklist))
        .route("/blocklist/{id}", delete(policies::remove_blocklist))
        .route("/exclusions/indexer", get(policies::list_indexer_exclusions))
        .route("/exclusions/indexer", post(policies::add_indexer_exclusion))
        .route("/exclusions/indexer/{id}", delete(policies::remove_indexer_exclusion))
        .route("/exclusions/media", get(policies::list_media_exclusions))
        .route("/exclusions/media", post(policies::add_media_exclusion))
        .route("/exclusions/media/{id}", delete(policies::remove_media_exclusion))
        // Pending grabs
        .route("/pending", get(policies::list_pending))
        .route("/pending/{id}", delete(policies::cancel_pending))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
}
