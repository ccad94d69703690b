//! chamber-board/crates/cb-api/src/middleware.rs Middleware
//!
//! Custom middleware for security, logging, and traffic control.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Condition, DefaultHeaders, Logger};
use actix_web::web;

use crate::error::ApiError;

/// Largest JSON body accepted by listing and participation endpoints.
pub const JSON_LIMIT_BYTES: usize = 256 * 1024;

// Access log: remote-ip "request-line" status-code response-size "referrer" "user-agent" time
pub fn standard_middleware() -> Logger {
    Logger::default()
}

// Cross-origin access is only enabled for an explicitly configured origin;
// the site itself is served from the same origin as the API.
pub fn cors_policy(allowed_origin: Option<&str>) -> Condition<Cors> {
    let cors = match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600),
        None => Cors::default(),
    };
    Condition::new(allowed_origin.is_some(), cors)
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
}

/// JSON extractor settings: size limit and errors in the API's own shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            log::debug!("rejecting JSON body: {err}");
            ApiError::BadRequest(format!("Invalid JSON body: {err}")).into()
        })
}
