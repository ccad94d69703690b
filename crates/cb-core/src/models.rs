//! # Domain Models
//!
//! Listings (job postings and events), the payloads admins submit to create
//! or edit them, and the submissions visitors make against them.
//!
//! Field names are camelCase on disk and on the wire. Fields this crate does
//! not know about are carried in `extra` so that nothing a client posted is
//! lost when a file is rewritten.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::coerce;
use crate::error::{AppError, Result};
use crate::retention::{self, RetentionPolicy};

/// Sequential listing identifier, unique within one backing file.
pub type ListingId = u64;

/// Behaviour shared by every record kind kept in a listing file.
pub trait Listing: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human name used in log lines and not-found messages.
    const KIND: &'static str;

    fn id(&self) -> ListingId;

    fn is_expired(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> bool;
}

/// One plus the highest identifier in use; `None` once `u64::MAX` is taken.
pub fn next_id<T: Listing>(records: &[T]) -> Option<ListingId> {
    records.iter().map(Listing::id).max().unwrap_or(0).checked_add(1)
}

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, deserialize_with = "coerce::id")]
    pub id: ListingId,
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub company: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub location: String,
    /// Employment type, e.g. "full-time".
    #[serde(rename = "type", default, deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub link: String,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub poster_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub requirements: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub salary: String,
    #[serde(default, deserialize_with = "coerce::truthy")]
    pub cv_required: bool,
    #[serde(default, deserialize_with = "coerce::text")]
    pub posted_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing for Job {
    const KIND: &'static str = "Job";

    fn id(&self) -> ListingId {
        self.id
    }

    fn is_expired(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> bool {
        retention::job_is_expired(&self.posted_at, policy.job_max_age, now)
    }
}

/// An event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, deserialize_with = "coerce::id")]
    pub id: ListingId,
    #[serde(default, deserialize_with = "coerce::text")]
    pub title: String,
    /// Calendar day, usually `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub time: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub location: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub requirements: String,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub poster_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::truthy")]
    pub payment_required: bool,
    #[serde(default, deserialize_with = "coerce::number")]
    pub cost: Option<f64>,
    /// Registration fields a participant has to fill in.
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub mandatory_fields: Vec<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub posted_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing for Event {
    const KIND: &'static str = "Event";

    fn id(&self) -> ListingId {
        self.id
    }

    fn is_expired(&self, _policy: &RetentionPolicy, now: DateTime<Utc>) -> bool {
        retention::event_is_expired(&self.date, retention::local_day(now))
    }
}

/// Payload of `POST /api/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub location: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "coerce::optional_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub poster_email: Option<String>,
    /// Older admin forms name the poster address `contactEmail`.
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "coerce::truthy")]
    pub cv_required: bool,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub posted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewJob {
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.title) || is_blank(&self.company) {
            return Err(AppError::ValidationError("Missing required fields".into()));
        }
        Ok(())
    }

    /// Builds the stored record, filling the defaults a bare posting gets.
    pub fn into_job(self, id: ListingId, now: DateTime<Utc>) -> Job {
        let mut extra = self.extra;
        extra.remove("id");
        Job {
            id,
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: or_default(self.location, "remote"),
            kind: or_default(self.kind, "full-time"),
            description: or_default(self.description, ""),
            link: or_default(self.link, "#"),
            poster_email: non_blank(self.poster_email).or_else(|| non_blank(self.contact_email)),
            requirements: or_default(self.requirements, ""),
            salary: or_default(self.salary, ""),
            cv_required: self.cv_required,
            posted_at: non_blank(self.posted_at).unwrap_or_else(|| timestamp(now)),
            extra,
        }
    }
}

/// Payload of `POST /api/events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub poster_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::truthy")]
    pub payment_required: bool,
    #[serde(default, deserialize_with = "coerce::number")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub mandatory_fields: Vec<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub posted_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.title) || is_blank(&self.date) {
            return Err(AppError::ValidationError("Missing required fields".into()));
        }
        Ok(())
    }

    pub fn into_event(self, id: ListingId, now: DateTime<Utc>) -> Event {
        let mut extra = self.extra;
        extra.remove("id");
        let cost = if self.payment_required {
            Some(self.cost.unwrap_or(0.0))
        } else {
            None
        };
        Event {
            id,
            title: self.title.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            time: or_default(self.time, "10:00"),
            location: or_default(self.location, ""),
            description: or_default(self.description, ""),
            requirements: or_default(self.requirements, ""),
            poster_email: non_blank(self.poster_email),
            payment_required: self.payment_required,
            cost,
            mandatory_fields: self.mandatory_fields,
            posted_at: non_blank(self.posted_at).unwrap_or_else(|| timestamp(now)),
            extra,
        }
    }
}

/// Payload of `PUT /api/events/{id}`. Only supplied, non-empty fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub poster_email: Option<String>,
    #[serde(default, deserialize_with = "coerce::strict_bool")]
    pub payment_required: Option<bool>,
    #[serde(default, deserialize_with = "coerce::present")]
    pub cost: Option<Value>,
    #[serde(default, deserialize_with = "coerce::optional_string_list")]
    pub mandatory_fields: Option<Vec<String>>,
}

impl Event {
    pub fn apply_update(&mut self, update: EventUpdate) {
        fn replace(slot: &mut String, value: Option<String>) {
            if let Some(value) = non_blank(value) {
                *slot = value;
            }
        }

        replace(&mut self.title, update.title);
        replace(&mut self.date, update.date);
        replace(&mut self.time, update.time);
        replace(&mut self.location, update.location);
        replace(&mut self.description, update.description);
        replace(&mut self.requirements, update.requirements);
        if let Some(email) = non_blank(update.poster_email) {
            self.poster_email = Some(email);
        }
        if let Some(required) = update.payment_required {
            self.payment_required = required;
        }
        // Cost only moves together with an explicit switch to a paid event.
        if update.payment_required == Some(true) {
            if let Some(cost) = update.cost {
                self.cost = coerce::as_number(&cost);
            }
        }
        if let Some(fields) = update.mandatory_fields {
            self.mandatory_fields = fields;
        }
    }
}

/// A file stored on behalf of an applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    /// Client-side file name, sanitized.
    pub file_name: String,
}

/// Contact details of a job applicant, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantContact {
    pub email: String,
    pub contact_number: String,
    pub message: String,
}

impl ApplicantContact {
    pub fn new(
        email: Option<String>,
        contact_number: Option<String>,
        message: Option<String>,
    ) -> Result<Self> {
        match (non_blank(email), non_blank(contact_number)) {
            (Some(email), Some(contact_number)) => Ok(Self {
                email,
                contact_number,
                message: message.unwrap_or_default(),
            }),
            _ => Err(AppError::ValidationError(
                "Missing applicant contact info".into(),
            )),
        }
    }
}

/// A job application, appended to the job's submission log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub job_id: ListingId,
    pub job_title: String,
    pub applicant_email: String,
    pub contact_number: String,
    pub message: String,
    pub cv_path: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    pub fn new(
        job: &Job,
        contact: ApplicantContact,
        cv: Option<&StoredUpload>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id: job.id,
            job_title: job.title.clone(),
            applicant_email: contact.email,
            contact_number: contact.contact_number,
            message: contact.message,
            cv_path: cv.map(|upload| upload.path.display().to_string()),
            submitted_at: now,
        }
    }
}

/// An event registration, appended to the event's submission log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub event_id: ListingId,
    pub event_title: String,
    pub event_date: String,
    pub participant_name: String,
    pub participant_email: String,
    pub participant_contact: String,
    pub payment_ref: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub industry: Option<String>,
    pub experience: Option<String>,
    pub goals: Option<String>,
    pub additional_info: String,
    pub submitted_at: DateTime<Utc>,
}

impl Participation {
    /// Validates a registration form against the event's requirements.
    ///
    /// The form is kept as a raw JSON object because `mandatoryFields` may
    /// name any key.
    pub fn from_form(event: &Event, form: &Map<String, Value>, now: DateTime<Utc>) -> Result<Self> {
        let field = |name: &str| non_blank(form.get(name).and_then(coerce::as_text));

        let (Some(name), Some(email), Some(contact)) =
            (field("name"), field("email"), field("contact"))
        else {
            return Err(AppError::ValidationError(
                "Missing required contact info".into(),
            ));
        };

        if let Some(missing) = event
            .mandatory_fields
            .iter()
            .find(|key| !form.get(key.as_str()).is_some_and(is_filled))
        {
            return Err(AppError::ValidationError(format!("{missing} is required")));
        }

        let payment_ref = field("paymentRef");
        if event.payment_required && payment_ref.is_none() {
            return Err(AppError::ValidationError(
                "Payment reference required for this event".into(),
            ));
        }

        Ok(Self {
            event_id: event.id,
            event_title: event.title.clone(),
            event_date: event.date.clone(),
            participant_name: name,
            participant_email: email,
            participant_contact: contact,
            payment_ref,
            phone: field("phone"),
            company: field("company"),
            role: field("role"),
            industry: field("industry"),
            experience: field("experience"),
            goals: field("goals"),
            additional_info: field("additionalInfo").unwrap_or_default(),
            submitted_at: now,
        })
    }
}

/// RFC 3339 with millisecond precision, the shape browsers produce.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_owned())
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}
