//! Applications and participations, one JSON object per line.
//!
//! Job applications go to `<jobId>.json`, event registrations to
//! `event-<eventId>.json`, both inside the applications directory.

use anyhow::Context;
use async_trait::async_trait;
use cb_core::models::{Application, Participation};
use cb_core::traits::SubmissionLog;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub struct JsonlSubmissionLog {
    dir: PathBuf,
}

impl JsonlSubmissionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn application_file(&self, job_id: u64) -> PathBuf {
        self.dir.join(format!("{job_id}.json"))
    }

    pub fn participation_file(&self, event_id: u64) -> PathBuf {
        self.dir.join(format!("event-{event_id}.json"))
    }

    async fn append<R: Serialize>(&self, path: PathBuf, record: &R) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionLog for JsonlSubmissionLog {
    async fn record_application(&self, application: &Application) -> anyhow::Result<()> {
        self.append(self.application_file(application.job_id), application)
            .await
    }

    async fn record_participation(&self, participation: &Participation) -> anyhow::Result<()> {
        self.append(self.participation_file(participation.event_id), participation)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn application(message: &str) -> Application {
        Application {
            job_id: 5,
            job_title: "Cook".into(),
            applicant_email: "cook@mail.test".into(),
            contact_number: "555".into(),
            message: message.into(),
            cv_path: None,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn applications_append_one_line_each() {
        let dir = TempDir::new().unwrap();
        let log = JsonlSubmissionLog::new(dir.path().join("applications"));

        log.record_application(&application("first")).await.unwrap();
        log.record_application(&application("second")).await.unwrap();

        let raw = std::fs::read_to_string(log.application_file(5)).unwrap();
        let lines: Vec<Application> = raw
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].message, "second");
        assert!(raw.contains("\"applicantEmail\""));
    }
}
