//! Cross-cutting layers for the API router.
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Stamps every response with the pipeline version.
pub async fn version_header(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        "x-minic-version",
        axum::http::HeaderValue::from_static(minic_core::MINIC_VERSION),
    );
    response
}
