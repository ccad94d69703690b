//! `/api/jobs` handlers.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use cb_core::mail::{application_mail, MailAttachment};
use cb_core::models::{ApplicantContact, Application, NewJob};
use cb_core::AppError;
use chrono::Utc;
use serde_json::json;

use super::multipart::read_form;

/// Parts of an application form; anything else in the body is dropped.
const APPLICATION_FIELDS: &[&str] = &["applicantEmail", "contactNumber", "message", "cv"];
use super::{notify, parse_id, AppState};
use crate::auth::RequireAdmin;
use crate::error::ApiError;

/// Lists current postings; expired ones are pruned on the way.
pub async fn list(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let jobs = data
        .jobs
        .list_jobs()
        .await
        .map_err(ApiError::context("Failed to read jobs"))?;
    Ok(HttpResponse::Ok().json(jobs))
}

pub async fn create(
    _admin: RequireAdmin,
    data: web::Data<AppState>,
    body: web::Json<NewJob>,
) -> Result<HttpResponse, ApiError> {
    let job = data
        .jobs
        .create_job(body.into_inner())
        .await
        .map_err(ApiError::context("Failed to save job"))?;
    log::info!("created job #{} \"{}\"", job.id, job.title);
    Ok(HttpResponse::Created().json(job))
}

pub async fn delete(
    _admin: RequireAdmin,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let removed = data
        .jobs
        .delete_job(id)
        .await
        .map_err(ApiError::context("Failed to delete job"))?
        .ok_or_else(|| AppError::NotFound("Job", id.to_string()))?;
    log::info!("deleted job #{id}");
    Ok(HttpResponse::Ok().json(json!({ "removed": removed })))
}

/// Accepts an application as `multipart/form-data` with an optional `cv`
/// file. The form is validated before the CV or the record is written.
pub async fn apply(
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to process application";

    let id = parse_id(&path)?;
    let job = data
        .jobs
        .get_job(id)
        .await
        .map_err(ApiError::context(FAILED))?
        .ok_or_else(|| AppError::NotFound("Job", id.to_string()))?;

    let mut form = read_form(payload, APPLICATION_FIELDS, data.max_upload_bytes).await?;
    let contact = ApplicantContact::new(
        form.text("applicantEmail"),
        form.text("contactNumber"),
        form.text("message"),
    )?;

    let cv = match form.take_file("cv") {
        Some(file) => Some(
            data.store
                .save_upload(file.bytes, &file.file_name)
                .await
                .map_err(|e| ApiError::internal(FAILED, e))?,
        ),
        None => None,
    };

    let application = Application::new(&job, contact, cv.as_ref(), Utc::now());
    if let Err(err) = data.submissions.record_application(&application).await {
        if let Some(upload) = &cv {
            if let Err(cleanup) = data.store.remove_upload(upload).await {
                log::warn!(
                    "orphaned CV left at {}: {cleanup:#}",
                    upload.path.display()
                );
            }
        }
        return Err(ApiError::internal(FAILED, err));
    }
    log::info!("application for job #{id} saved");

    let attachment = cv.map(|upload| MailAttachment {
        file_name: upload.file_name,
        path: upload.path,
    });
    let sent = notify(&data, application_mail(&job, &application, attachment)).await;

    let body = if sent {
        json!({ "ok": true, "sent": true })
    } else {
        json!({ "ok": true, "sent": false, "note": "Saved locally" })
    };
    Ok(HttpResponse::Ok().json(body))
}
