//! HTTP API over the feature store.
//!
//! ## Routes
//!
//! - `GET /api/parcheggi`: list spots; query pairs are equality filters and a
//!   key may appear only once (`?fee=yes&fee=no` is a 400).
//! - `POST /api/parcheggi`: add a spot from a GeoJSON Point feature.
//! - `PUT /api/parcheggi/:id`: update `name`, `access`, `fee`, `surface`.
//! - `DELETE /api/parcheggi/:id`: remove a spot.
//! - `GET /api/parcheggi/keys`: property keys usable as filters.
//! - `GET /api/parcheggi/stats`: value frequencies per field.
//! - `GET /health`
//!
//! Ids containing `/` (OpenStreetMap ids such as `way/123`) must be sent
//! percent-encoded in the path.

pub mod errors;
pub mod handlers;
pub mod models;

use crate::store::FeatureStore;
use axum::Router;
use axum::routing::{get, put};
use handlers::AppState;
use std::sync::Arc;

pub const SPOTS_PATH: &str = "/api/parcheggi";

/// Build the axum `Router` serving the parking spot API.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(SPOTS_PATH, get(handlers::list_spots).post(handlers::create_spot))
        .route(&format!("{SPOTS_PATH}/keys"), get(handlers::known_keys))
        .route(&format!("{SPOTS_PATH}/stats"), get(handlers::field_stats))
        .route(
            &format!("{SPOTS_PATH}/:id"),
            put(handlers::update_spot).delete(handlers::delete_spot),
        )
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Serve the API at `addr` (e.g. `"127.0.0.1:3000"`) until the process stops.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn serve(store: Arc<FeatureStore>, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    log::info!("parking spot server listening on http://{local}");
    log::info!("data file: {}", store.describe_storage());
    log::info!("  GET    {SPOTS_PATH}       list spots, filter with ?fee=yes&access=yes");
    log::info!("  POST   {SPOTS_PATH}       add a spot");
    log::info!("  PUT    {SPOTS_PATH}/:id   update a spot");
    log::info!("  DELETE {SPOTS_PATH}/:id   delete a spot");
    axum::serve(listener, create_router(AppState::new(store))).await
}
