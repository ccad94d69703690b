//! Buffers a `multipart/form-data` body into text fields and files.
//!
//! Nothing is written to disk here; handlers validate the form first and only
//! then hand file bytes to the `MediaStore`.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::error::ApiError;

/// Headroom on top of the file limit for the text fields of one form.
pub const TEXT_FIELD_ALLOWANCE: usize = 64 * 1024;

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Reads the parts named in `accepted`; any other part is drained and
/// dropped. Each part is capped at `max_part_bytes` and the whole body,
/// dropped parts included, at `max_part_bytes + TEXT_FIELD_ALLOWANCE`.
pub async fn read_form(
    mut payload: Multipart,
    accepted: &[&str],
    max_part_bytes: usize,
) -> Result<FormData, ApiError> {
    let mut form = FormData::default();
    let mut budget = Budget {
        remaining: max_part_bytes.saturating_add(TEXT_FIELD_ALLOWANCE),
    };

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let disposition = field.content_disposition();
        let name = disposition.get_name().map(str::to_owned);
        let file_name = disposition.get_filename().map(str::to_owned);

        let Some(name) = name.filter(|n| accepted.contains(&n.as_str())) else {
            drain(&mut field, &mut budget).await?;
            continue;
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(malformed)?;
            budget.spend(chunk.len())?;
            if bytes.len() + chunk.len() > max_part_bytes {
                return Err(ApiError::PayloadTooLarge(format!(
                    "{name} exceeds the {max_part_bytes} byte upload limit"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            // Browsers send an empty, unnamed part for an untouched file input.
            Some(file_name) if !file_name.is_empty() || !bytes.is_empty() => {
                form.files.insert(name, UploadedFile { file_name, bytes });
            }
            Some(_) => {}
            None => {
                form.fields
                    .insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(form)
}

struct Budget {
    remaining: usize,
}

impl Budget {
    fn spend(&mut self, bytes: usize) -> Result<(), ApiError> {
        self.remaining = self.remaining.checked_sub(bytes).ok_or_else(|| {
            ApiError::PayloadTooLarge("Form exceeds the upload size limit".into())
        })?;
        Ok(())
    }
}

async fn drain(field: &mut Field, budget: &mut Budget) -> Result<(), ApiError> {
    while let Some(chunk) = field.next().await {
        budget.spend(chunk.map_err(malformed)?.len())?;
    }
    Ok(())
}

fn malformed(err: actix_multipart::MultipartError) -> ApiError {
    log::debug!("rejecting multipart body: {err}");
    ApiError::BadRequest("Invalid multipart form data".into())
}
