//! `/api/events` handlers.

use actix_web::{web, HttpResponse};
use cb_core::mail::participation_mail;
use cb_core::models::{EventUpdate, NewEvent, Participation};
use cb_core::AppError;
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::{notify, parse_id, AppState};
use crate::auth::RequireAdmin;
use crate::error::ApiError;

pub async fn list(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let events = data
        .events
        .list_events()
        .await
        .map_err(ApiError::context("Failed to read events"))?;
    Ok(HttpResponse::Ok().json(events))
}

pub async fn get(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let event = data
        .events
        .get_event(id)
        .await
        .map_err(ApiError::context("Failed to read event"))?
        .ok_or_else(|| AppError::NotFound("Event", id.to_string()))?;
    Ok(HttpResponse::Ok().json(event))
}

pub async fn create(
    _admin: RequireAdmin,
    data: web::Data<AppState>,
    body: web::Json<NewEvent>,
) -> Result<HttpResponse, ApiError> {
    let event = data
        .events
        .create_event(body.into_inner())
        .await
        .map_err(ApiError::context("Failed to save event"))?;
    log::info!("created event #{} \"{}\" on {}", event.id, event.title, event.date);
    Ok(HttpResponse::Created().json(event))
}

pub async fn update(
    _admin: RequireAdmin,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EventUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let event = data
        .events
        .update_event(id, body.into_inner())
        .await
        .map_err(ApiError::context("Failed to update event"))?
        .ok_or_else(|| AppError::NotFound("Event", id.to_string()))?;
    log::info!("updated event #{id}");
    Ok(HttpResponse::Ok().json(event))
}

pub async fn delete(
    _admin: RequireAdmin,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let removed = data
        .events
        .delete_event(id)
        .await
        .map_err(ApiError::context("Failed to delete event"))?
        .ok_or_else(|| AppError::NotFound("Event", id.to_string()))?;
    log::info!("deleted event #{id}");
    Ok(HttpResponse::Ok().json(json!({ "removed": removed })))
}

/// Registers a participant. The body stays a raw object because the event
/// decides which extra fields are mandatory.
pub async fn participate(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    const FAILED: &str = "Failed to save participation";

    let id = parse_id(&path)?;
    let event = data
        .events
        .get_event(id)
        .await
        .map_err(ApiError::context(FAILED))?
        .ok_or_else(|| AppError::NotFound("Event", id.to_string()))?;

    let participation = Participation::from_form(&event, &body, Utc::now())?;
    data.submissions
        .record_participation(&participation)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;
    log::info!("participation for event #{id} saved");

    let sent = notify(&data, participation_mail(&event, &participation)).await;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "sent": sent })))
}
