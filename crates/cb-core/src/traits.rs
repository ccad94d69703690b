//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::Result;
use crate::mail::OutgoingMail;
use crate::models::{
    Application, Event, EventUpdate, Job, ListingId, NewEvent, NewJob, Participation,
    StoredUpload,
};

/// Persistence contract for job postings.
///
/// Reads prune expired postings as a side effect.
#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>>;
    async fn get_job(&self, id: ListingId) -> Result<Option<Job>>;
    /// Validates, assigns the next identifier and persists.
    async fn create_job(&self, job: NewJob) -> Result<Job>;
    /// Returns the removed posting, `None` if the id is unknown.
    async fn delete_job(&self, id: ListingId) -> Result<Option<Job>>;
}

/// Persistence contract for events. Reads prune past events.
#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>>;
    async fn get_event(&self, id: ListingId) -> Result<Option<Event>>;
    async fn create_event(&self, event: NewEvent) -> Result<Event>;
    async fn update_event(&self, id: ListingId, update: EventUpdate) -> Result<Option<Event>>;
    async fn delete_event(&self, id: ListingId) -> Result<Option<Event>>;
}

/// Append-only record of applications and participations.
#[async_trait]
pub trait SubmissionLog: Send + Sync {
    async fn record_application(&self, application: &Application) -> anyhow::Result<()>;
    async fn record_participation(&self, participation: &Participation) -> anyhow::Result<()>;
}

/// Storage contract for files uploaded with an application.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes under a name derived from `original_name`.
    async fn save_upload(&self, data: Vec<u8>, original_name: &str) -> anyhow::Result<StoredUpload>;

    /// Deletes a file stored by `save_upload`.
    async fn remove_upload(&self, upload: &StoredUpload) -> anyhow::Result<()>;
}

/// Admin access contract.
pub trait AuthProvider: Send + Sync {
    /// Checks the raw `Authorization` header of a mutating request.
    fn authorize(&self, authorization: Option<&str>) -> Result<()>;
}

/// Outbound notification contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()>;
}
