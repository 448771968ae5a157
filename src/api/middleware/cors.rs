//! CORS middleware configuration.

use tower_http::cors::CorsLayer;

/// Create a CORS layer with permissive settings.
///
/// The API serves a mobile app, so cross-origin restrictions carry
/// little weight here; tighten this if a web client is ever added.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
