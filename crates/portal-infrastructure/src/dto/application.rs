//! Application record DTOs.
//!
//! The stored value is a JSON array of records with camelCase keys:
//!
//! ```json
//! [{
//!   "id": 1736980205000,
//!   "submittedAt": "2025-01-15T22:30:05.000Z",
//!   "fullName": "Jane Doe",
//!   "email": "jane@example.com",
//!   "phone": "555-1234",
//!   "files": [{"name": "cv.pdf", "dataUrl": "data:application/pdf;base64,..."}, null, null]
//! }]
//! ```
//!
//! Records are decoded one by one so that a single malformed entry does not
//! take the rest of the list down with it.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use portal_core::application::{
    Application, ApplicationFiles, ApplicationId, DataUrl, FileAttachment, FileSlot,
};
use portal_core::error::{PortalError, Result};

/// A stored file slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachmentDTO {
    pub name: String,
    pub data_url: String,
}

/// A stored application record, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecordDTO {
    pub id: i64,
    pub submitted_at: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Older or hand-edited records may omit the field entirely.
    #[serde(default)]
    pub files: Vec<Option<FileAttachmentDTO>>,
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl TryFrom<FileAttachmentDTO> for FileAttachment {
    type Error = PortalError;

    fn try_from(dto: FileAttachmentDTO) -> Result<Self> {
        Ok(FileAttachment {
            data_url: DataUrl::parse(dto.data_url)?,
            name: dto.name,
        })
    }
}

/// Upper bound (exclusive) for stored ids: leaves room for every later id
/// to be one greater than the newest.
const MAX_RECORD_ID: i64 = i64::MAX / 2;

/// Validates a stored record.
///
/// - `id` must be positive and below [`MAX_RECORD_ID`]
/// - `submittedAt` must be RFC 3339
/// - every `dataUrl` must be a valid base64 `data:` URL
/// - `files` shorter than three slots is padded with empty slots; longer is rejected
impl TryFrom<ApplicationRecordDTO> for Application {
    type Error = PortalError;

    fn try_from(dto: ApplicationRecordDTO) -> Result<Self> {
        if dto.id <= 0 || dto.id >= MAX_RECORD_ID {
            return Err(PortalError::validation(format!(
                "record {}: id out of range",
                dto.id
            )));
        }

        let submitted_at = DateTime::parse_from_rfc3339(&dto.submitted_at)
            .map_err(|e| {
                PortalError::validation(format!(
                    "record {}: invalid submittedAt '{}': {}",
                    dto.id, dto.submitted_at, e
                ))
            })?
            .with_timezone(&Utc);

        if dto.files.len() > FileSlot::ALL.len() {
            return Err(PortalError::validation(format!(
                "record {}: expected at most {} file slots, found {}",
                dto.id,
                FileSlot::ALL.len(),
                dto.files.len()
            )));
        }

        let mut slots: [Option<FileAttachment>; 3] = Default::default();
        for (slot, file) in slots.iter_mut().zip(dto.files) {
            *slot = file
                .map(FileAttachment::try_from)
                .transpose()
                .map_err(|e| PortalError::validation(format!("record {}: {}", dto.id, e)))?;
        }

        Ok(Application {
            id: ApplicationId(dto.id),
            submitted_at,
            full_name: dto.full_name,
            email: dto.email,
            phone: dto.phone,
            files: ApplicationFiles::from(slots),
        })
    }
}

/// Convert domain model to DTO for persistence.
impl From<&Application> for ApplicationRecordDTO {
    fn from(app: &Application) -> Self {
        ApplicationRecordDTO {
            id: app.id.value(),
            submitted_at: app.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            full_name: app.full_name.clone(),
            email: app.email.clone(),
            phone: app.phone.clone(),
            files: app
                .files
                .iter()
                .map(|(_, file)| {
                    file.map(|file| FileAttachmentDTO {
                        name: file.name.clone(),
                        data_url: file.data_url.as_str().to_string(),
                    })
                })
                .collect(),
        }
    }
}

// ============================================================================
// List codec
// ============================================================================

/// Result of decoding a stored list.
#[derive(Debug, Default)]
pub struct DecodedApplications {
    /// Records that passed validation, in stored order.
    pub applications: Vec<Application>,
    /// One message per rejected record.
    pub rejected: Vec<String>,
}

/// Decodes the stored list.
///
/// # Errors
///
/// Returns a serialization error if `raw` is not a JSON array at all.
/// Individually malformed records are reported in
/// [`DecodedApplications::rejected`] instead. A repeated id keeps its
/// first occurrence.
pub fn decode_applications(raw: &str) -> Result<DecodedApplications> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;

    let mut decoded = DecodedApplications::default();
    let mut seen = HashSet::new();

    for (index, value) in values.into_iter().enumerate() {
        let record = serde_json::from_value::<ApplicationRecordDTO>(value)
            .map_err(PortalError::from)
            .and_then(Application::try_from);

        match record {
            Ok(app) if !seen.insert(app.id) => decoded
                .rejected
                .push(format!("entry {}: duplicate id {}", index, app.id)),
            Ok(app) => decoded.applications.push(app),
            Err(e) => decoded.rejected.push(format!("entry {}: {}", index, e)),
        }
    }

    Ok(decoded)
}

/// Encodes the whole list for storage.
pub fn encode_applications(applications: &[Application]) -> Result<String> {
    let dtos: Vec<ApplicationRecordDTO> = applications.iter().map(Into::into).collect();
    Ok(serde_json::to_string(&dtos)?)
}
