//! Common test infrastructure
//!
//! Every test gets its own temporary data directory, real JSON stores and
//! local upload storage. Mail is either absent or a `MockMailer`.
//!
//! ```ignore
//! #[macro_use]
//! mod common;
//!
//! let harness = Harness::new();
//! let app = test_app!(harness.state(Some(TOKEN), None));
//! ```

#![allow(dead_code, unused_macros)]

use actix_web::web;
use cb_api::AppState;
use cb_auth_token::TokenAuthProvider;
use cb_core::models::{Event, Job};
use cb_core::traits::Mailer;
use cb_storage_local::LocalMediaStore;
use cb_store_json::{JsonFileStore, JsonlSubmissionLog};
use secrecy::SecretString;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

pub const TOKEN: &str = "chamber-admin-token";
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Builds the service under test from a `web::Data<AppState>`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state)
                .app_data(cb_api::middleware::json_config())
                .configure(cb_api::configure_routes),
        )
        .await
    };
}

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TOKEN}"))
}

pub struct Harness {
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.dir.path().join("data").join("jobs.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.path().join("data").join("events.json")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.dir.path().join("applications")
    }

    pub fn seed_jobs(&self, jobs: Value) {
        write_json(&self.jobs_path(), &jobs);
    }

    pub fn seed_events(&self, events: Value) {
        write_json(&self.events_path(), &events);
    }

    pub fn jobs_on_disk(&self) -> Vec<Job> {
        read_json(&self.jobs_path())
    }

    pub fn events_on_disk(&self) -> Vec<Event> {
        read_json(&self.events_path())
    }

    pub fn raw_jobs(&self) -> Option<String> {
        std::fs::read_to_string(self.jobs_path()).ok()
    }

    pub fn raw_events(&self) -> Option<String> {
        std::fs::read_to_string(self.events_path()).ok()
    }

    /// Lines of a submission log, parsed.
    pub fn submissions(&self, file_name: &str) -> Vec<Value> {
        match std::fs::read_to_string(self.applications_dir().join(file_name)) {
            Ok(raw) => raw
                .lines()
                .map(|line| serde_json::from_str(line).expect("submission line"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn uploaded_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.uploads_dir()) {
            Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn state(&self, token: Option<&str>, mailer: Option<Box<dyn Mailer>>) -> web::Data<AppState> {
        web::Data::new(AppState {
            jobs: Box::new(JsonFileStore::<Job>::new(self.jobs_path())),
            events: Box::new(JsonFileStore::<Event>::new(self.events_path())),
            submissions: Box::new(JsonlSubmissionLog::new(self.applications_dir())),
            store: Box::new(LocalMediaStore::new(self.uploads_dir())),
            auth: Box::new(TokenAuthProvider::new(
                token.map(|t| SecretString::from(t.to_owned())),
            )),
            mailer,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        })
    }
}

fn write_json(path: &std::path::Path, value: &Value) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create data dir");
    std::fs::write(path, serde_json::to_string_pretty(value).expect("encode")).expect("seed file");
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Vec<T> {
    let raw = std::fs::read_to_string(path).expect("listing file");
    serde_json::from_str(&raw).expect("listing json")
}
