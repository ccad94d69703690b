//! # cb-api
//!
//! The web routing and orchestration layer for chamber-board.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::AppState;

use actix_web::web;
use handlers::{events, jobs, probes};

/// Configures the API routes.
///
/// Static site files are mounted by the binary after these, so every
/// `/api/...` path resolves here first.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/jobs")
                    .route(web::get().to(jobs::list))
                    .route(web::post().to(jobs::create)),
            )
            .service(web::resource("/jobs/{id}").route(web::delete().to(jobs::delete)))
            .service(web::resource("/jobs/{id}/apply").route(web::post().to(jobs::apply)))
            .service(
                web::resource("/events")
                    .route(web::get().to(events::list))
                    .route(web::post().to(events::create)),
            )
            .service(
                web::resource("/events/{id}")
                    .route(web::get().to(events::get))
                    .route(web::put().to(events::update))
                    .route(web::delete().to(events::delete)),
            )
            .service(
                web::resource("/events/{id}/participate")
                    .route(web::post().to(events::participate)),
            ),
    )
    .route("/healthz", web::get().to(probes::healthz));
}
