//! # cb-store-json
//!
//! JSON-file implementation of `JobRepo` and `EventRepo`.
//!
//! Each listing kind lives in one pretty-printed JSON array. Every operation
//! reads the whole file and every mutation rewrites it; nothing is cached and
//! nothing is locked, so concurrent writers race and the last one wins.

mod submissions;

pub use submissions::JsonlSubmissionLog;

use anyhow::Context;
use async_trait::async_trait;
use cb_core::coerce;
use cb_core::error::Result;
use cb_core::models::{
    next_id, Event, EventUpdate, Job, Listing, ListingId, NewEvent, NewJob,
};
use cb_core::retention::RetentionPolicy;
use cb_core::traits::{EventRepo, JobRepo};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct JsonFileStore<T> {
    path: PathBuf,
    policy: RetentionPolicy,
    _records: PhantomData<fn() -> T>,
}

impl<T: Listing> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: RetentionPolicy::default(),
            _records: PhantomData,
        }
    }

    pub fn with_retention(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record, expired or not. A missing or empty file is an
    /// empty list.
    async fn load(&self) -> anyhow::Result<Vec<T>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let values: Vec<Value> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        values
            .into_iter()
            .map(|mut value| {
                self.set_aside_unreadable_id(&mut value);
                serde_json::from_value(value)
            })
            .collect::<serde_json::Result<_>>()
            .with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Moves an `id` that is not a non-negative integer to `unreadableId`,
    /// where it survives rewrites; the record itself reads as id 0.
    fn set_aside_unreadable_id(&self, value: &mut Value) {
        let Value::Object(record) = value else {
            return;
        };
        match record.get("id") {
            Some(id) if !id.is_null() && coerce::as_id(id).is_none() => {}
            _ => return,
        }
        if let Some(raw) = record.remove("id") {
            log::warn!(
                "{} record in {} has unreadable id {raw}; kept as unreadableId",
                T::KIND,
                self.path.display()
            );
            record.insert("unreadableId".to_owned(), raw);
        }
    }

    async fn save(&self, records: &[T]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Loads the listing and drops whatever has expired at `now`, rewriting
    /// the file only when something was dropped.
    pub async fn list_at(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<T>> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| !r.is_expired(&self.policy, now));
        if records.len() != before {
            log::info!(
                "pruned {} expired {} listing(s) from {}",
                before - records.len(),
                T::KIND,
                self.path.display()
            );
            self.save(&records).await?;
        }
        Ok(records)
    }

    async fn find(&self, id: ListingId) -> anyhow::Result<Option<T>> {
        Ok(self
            .list_at(Utc::now())
            .await?
            .into_iter()
            .find(|r| r.id() == id))
    }

    /// Appends the record `build` makes from the next free identifier.
    async fn insert_with(&self, build: impl FnOnce(ListingId) -> T) -> anyhow::Result<T> {
        let mut records = self.load().await?;
        let id = next_id(&records)
            .with_context(|| format!("no identifier left after u64::MAX in {}", self.path.display()))?;
        let record = build(id);
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    /// Applies `change` to the record with `id`. The file is untouched when
    /// no record matches.
    async fn modify(
        &self,
        id: ListingId,
        change: impl FnOnce(&mut T),
    ) -> anyhow::Result<Option<T>> {
        let mut records = self.load().await?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.save(&records).await?;
        Ok(Some(updated))
    }

    async fn remove(&self, id: ListingId) -> anyhow::Result<Option<T>> {
        let mut records = self.load().await?;
        let Some(index) = records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let removed = records.remove(index);
        self.save(&records).await?;
        Ok(Some(removed))
    }
}

#[async_trait]
impl JobRepo for JsonFileStore<Job> {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.list_at(Utc::now()).await?)
    }

    async fn get_job(&self, id: ListingId) -> Result<Option<Job>> {
        Ok(self.find(id).await?)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job> {
        job.validate()?;
        let now = Utc::now();
        Ok(self.insert_with(|id| job.into_job(id, now)).await?)
    }

    async fn delete_job(&self, id: ListingId) -> Result<Option<Job>> {
        Ok(self.remove(id).await?)
    }
}

#[async_trait]
impl EventRepo for JsonFileStore<Event> {
    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.list_at(Utc::now()).await?)
    }

    async fn get_event(&self, id: ListingId) -> Result<Option<Event>> {
        Ok(self.find(id).await?)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        event.validate()?;
        let now = Utc::now();
        Ok(self.insert_with(|id| event.into_event(id, now)).await?)
    }

    async fn update_event(&self, id: ListingId, update: EventUpdate) -> Result<Option<Event>> {
        Ok(self.modify(id, |event| event.apply_update(update)).await?)
    }

    async fn delete_event(&self, id: ListingId) -> Result<Option<Event>> {
        Ok(self.remove(id).await?)
    }
}
