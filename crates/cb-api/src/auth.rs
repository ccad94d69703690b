//! Admin gate for mutating endpoints.
//!
//! Handlers take [`RequireAdmin`] as their first argument, so the token is
//! checked before the request body is read.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::ApiError;
use crate::handlers::AppState;

/// Proof that the request carried the admin token.
#[derive(Debug)]
pub struct RequireAdmin;

impl FromRequest for RequireAdmin {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(check(req))
    }
}

fn check(req: &HttpRequest) -> Result<RequireAdmin, ApiError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        ApiError::internal("Server misconfigured", anyhow::anyhow!("AppState not registered"))
    })?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state.auth.authorize(header).map_err(|err| {
        log::warn!(
            "admin request {} {} rejected: {err}",
            req.method(),
            req.path()
        );
        ApiError::from(err)
    })?;
    Ok(RequireAdmin)
}
