//! # cb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

pub mod events;
pub mod jobs;
pub mod multipart;
pub mod probes;

use cb_core::mail::OutgoingMail;
use cb_core::models::ListingId;
use cb_core::traits::{AuthProvider, EventRepo, JobRepo, Mailer, MediaStore, SubmissionLog};

use crate::error::ApiError;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub jobs: Box<dyn JobRepo>,
    pub events: Box<dyn EventRepo>,
    pub submissions: Box<dyn SubmissionLog>,
    pub store: Box<dyn MediaStore>,
    pub auth: Box<dyn AuthProvider>,
    /// `None` when SMTP is not configured; submissions are then only logged.
    pub mailer: Option<Box<dyn Mailer>>,
    pub max_upload_bytes: usize,
}

pub(crate) fn parse_id(raw: &str) -> Result<ListingId, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::invalid_id())
}

/// Sends a poster notification. Failure is logged and reported as `false`;
/// the saved submission stands either way.
pub(crate) async fn notify(state: &AppState, mail: Option<OutgoingMail>) -> bool {
    let (Some(mailer), Some(mail)) = (state.mailer.as_deref(), mail) else {
        return false;
    };
    let recipient = mail.to.clone();
    match mailer.send(mail).await {
        Ok(()) => {
            log::info!("notified poster {recipient}");
            true
        }
        Err(err) => {
            log::error!("mail to {recipient} failed, submission kept locally: {err:#}");
            false
        }
    }
}
