//! # cb-config
//!
//! Runtime settings, resolved from (lowest to highest precedence) built-in
//! defaults, an optional `chamber.toml` next to the binary, and environment
//! variables. A `.env` file is loaded into the environment first.
//!
//! Environment keys are the upper-case field names: `PORT`, `ADMIN_TOKEN`,
//! `SMTP_HOST`, ...

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

/// Flat shape of the configuration sources; secrets are plain strings only
/// until `Settings` wraps them.
#[derive(Debug, Deserialize)]
struct RawSettings {
    host: String,
    port: u16,
    data_dir: PathBuf,
    uploads_dir: PathBuf,
    applications_dir: PathBuf,
    static_dir: PathBuf,
    admin_token: Option<String>,
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
    mail_from: Option<String>,
    job_retention_days: i64,
    max_upload_bytes: usize,
    allowed_origin: Option<String>,
}

#[derive(Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    /// Sender address; defaults to the SMTP user.
    pub from: String,
}

#[derive(Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Holds `jobs.json` and `events.json`.
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub applications_dir: PathBuf,
    /// Root of the static site.
    pub static_dir: PathBuf,
    pub admin_token: Option<SecretString>,
    /// Present only when host, user and password are all set.
    pub smtp: Option<SmtpSettings>,
    pub job_retention_days: i64,
    pub max_upload_bytes: usize,
    /// Cross-origin access to the API is off unless an origin is named.
    pub allowed_origin: Option<String>,
}

impl Settings {
    /// Loads `.env`, then resolves every source.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let conf = Self::defaults()?
            .add_source(File::with_name("chamber").required(false))
            .add_source(Environment::default())
            .build()?;
        Self::from_config(conf)
    }

    /// Builder pre-seeded with the default of every key.
    pub fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("data_dir", "./data")?
            .set_default("uploads_dir", "./uploads")?
            .set_default("applications_dir", "./applications")?
            .set_default("static_dir", "./public")?
            .set_default("smtp_port", 587)?
            .set_default("job_retention_days", 30)?
            .set_default("max_upload_bytes", 10 * 1024 * 1024)
    }

    pub fn from_config(conf: Config) -> Result<Self, SettingsError> {
        let raw: RawSettings = conf.try_deserialize()?;

        if raw.job_retention_days <= 0 {
            return Err(SettingsError::Invalid(
                "job_retention_days",
                format!("must be positive, got {}", raw.job_retention_days),
            ));
        }
        if raw.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid("max_upload_bytes", "must be positive".into()));
        }

        for (key, dir) in [
            ("data_dir", &raw.data_dir),
            ("uploads_dir", &raw.uploads_dir),
            ("applications_dir", &raw.applications_dir),
        ] {
            if normalize(dir).starts_with(normalize(&raw.static_dir)) {
                return Err(SettingsError::Invalid(
                    key,
                    format!(
                        "{} is inside static_dir {} and would be served publicly",
                        dir.display(),
                        raw.static_dir.display()
                    ),
                ));
            }
        }

        let smtp = match (
            non_empty(raw.smtp_host),
            non_empty(raw.smtp_user),
            non_empty(raw.smtp_pass),
        ) {
            (Some(host), Some(user), Some(pass)) => Some(SmtpSettings {
                host,
                port: raw.smtp_port,
                from: non_empty(raw.mail_from).unwrap_or_else(|| user.clone()),
                user,
                password: SecretString::from(pass),
            }),
            _ => None,
        };

        Ok(Self {
            host: raw.host,
            port: raw.port,
            data_dir: raw.data_dir,
            uploads_dir: raw.uploads_dir,
            applications_dir: raw.applications_dir,
            static_dir: raw.static_dir,
            admin_token: non_empty(raw.admin_token).map(SecretString::from),
            smtp,
            job_retention_days: raw.job_retention_days,
            max_upload_bytes: raw.max_upload_bytes,
            allowed_origin: non_empty(raw.allowed_origin),
        })
    }

    pub fn jobs_file(&self) -> PathBuf {
        self.data_dir.join("jobs.json")
    }

    pub fn events_file(&self) -> PathBuf {
        self.data_dir.join("events.json")
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically, so two
/// spellings of one directory compare equal.
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
