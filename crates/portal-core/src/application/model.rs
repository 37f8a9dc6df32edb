//! Application domain model.
//!
//! This module contains the application record submitted by an applicant and
//! its value objects (identifier, attachment slots, form draft).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data_url::DataUrl;
use super::file::SelectedFile;
use crate::error::{PortalError, Result};

/// Unique identifier of an application record.
///
/// Milliseconds since the Unix epoch at creation time. Assigned once and
/// never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl ApplicationId {
    /// Returns the raw integer token.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApplicationId {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<i64>()
            .map(ApplicationId)
            .map_err(|_| PortalError::validation(format!("'{}' is not an application id", s)))
    }
}

/// One of the three fixed attachment slots, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileSlot {
    Resume,
    CoverLetter,
    Transcripts,
}

impl FileSlot {
    /// All slots in their fixed storage order.
    pub const ALL: [FileSlot; 3] = [FileSlot::Resume, FileSlot::CoverLetter, FileSlot::Transcripts];

    /// Position of this slot in the persisted `files` sequence.
    pub fn index(self) -> usize {
        match self {
            FileSlot::Resume => 0,
            FileSlot::CoverLetter => 1,
            FileSlot::Transcripts => 2,
        }
    }

    /// Name of the corresponding form field.
    pub fn field_name(self) -> &'static str {
        match self {
            FileSlot::Resume => "resume",
            FileSlot::CoverLetter => "coverLetter",
            FileSlot::Transcripts => "transcripts",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FileSlot::Resume => "Resume",
            FileSlot::CoverLetter => "Cover letter",
            FileSlot::Transcripts => "Transcripts",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for FileSlot {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "resume" | "0" => Ok(FileSlot::Resume),
            "coverLetter" | "cover-letter" | "cover_letter" | "1" => Ok(FileSlot::CoverLetter),
            "transcripts" | "2" => Ok(FileSlot::Transcripts),
            other => Err(PortalError::validation(format!(
                "unknown file slot '{}' (expected resume, coverLetter or transcripts)",
                other
            ))),
        }
    }
}

/// An attached file embedded in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    /// Original file name, used as the download name.
    pub name: String,
    /// Encoded file content.
    pub data_url: DataUrl,
}

/// The three attachment slots of an application.
///
/// Serialized as a sequence of exactly three nullable entries, in
/// [`FileSlot::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "[Option<FileAttachment>; 3]",
    into = "[Option<FileAttachment>; 3]"
)]
pub struct ApplicationFiles {
    pub resume: Option<FileAttachment>,
    pub cover_letter: Option<FileAttachment>,
    pub transcripts: Option<FileAttachment>,
}

impl ApplicationFiles {
    /// Returns the attachment in the given slot.
    pub fn get(&self, slot: FileSlot) -> Option<&FileAttachment> {
        match slot {
            FileSlot::Resume => self.resume.as_ref(),
            FileSlot::CoverLetter => self.cover_letter.as_ref(),
            FileSlot::Transcripts => self.transcripts.as_ref(),
        }
    }

    /// Iterates over all slots in storage order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (FileSlot, Option<&FileAttachment>)> {
        FileSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }

    /// Iterates over the filled slots only.
    pub fn attached(&self) -> impl Iterator<Item = (FileSlot, &FileAttachment)> {
        self.iter()
            .filter_map(|(slot, file)| file.map(|file| (slot, file)))
    }

    /// Number of filled slots.
    pub fn count(&self) -> usize {
        self.attached().count()
    }
}

impl From<[Option<FileAttachment>; 3]> for ApplicationFiles {
    fn from([resume, cover_letter, transcripts]: [Option<FileAttachment>; 3]) -> Self {
        Self {
            resume,
            cover_letter,
            transcripts,
        }
    }
}

impl From<ApplicationFiles> for [Option<FileAttachment>; 3] {
    fn from(files: ApplicationFiles) -> Self {
        [files.resume, files.cover_letter, files.transcripts]
    }
}

/// A submitted job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub files: ApplicationFiles,
}

/// Draft of the applicant form, as filled in by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub resume: Option<SelectedFile>,
    pub cover_letter: Option<SelectedFile>,
    pub transcripts: Option<SelectedFile>,
}

impl ApplicationForm {
    /// Creates a draft with the required text fields and no attachments.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Attaches a file to a slot, replacing any previous selection.
    pub fn with_file(mut self, slot: FileSlot, file: SelectedFile) -> Self {
        *self.slot_mut(slot) = Some(file);
        self
    }

    /// Mutable access to a slot's selection.
    pub fn slot_mut(&mut self, slot: FileSlot) -> &mut Option<SelectedFile> {
        match slot {
            FileSlot::Resume => &mut self.resume,
            FileSlot::CoverLetter => &mut self.cover_letter,
            FileSlot::Transcripts => &mut self.transcripts,
        }
    }

    /// Checks the required fields.
    ///
    /// Only presence is enforced; the content of each field is free text.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PortalError::validation(format!(
                "required field(s) missing: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Draft of the admin login form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> FileAttachment {
        FileAttachment {
            name: name.to_string(),
            data_url: DataUrl::encode("text/plain", name.as_bytes()),
        }
    }

    #[test]
    fn test_files_serialize_as_three_slots() {
        let files = ApplicationFiles {
            resume: None,
            cover_letter: Some(attachment("cover.txt")),
            transcripts: None,
        };

        let json = serde_json::to_value(&files).unwrap();
        let slots = json.as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots[0].is_null());
        assert_eq!(slots[1]["name"], "cover.txt");
        assert!(slots[1]["dataUrl"].as_str().unwrap().starts_with("data:text/plain"));
        assert!(slots[2].is_null());
    }

    #[test]
    fn test_attached_preserves_slot_order() {
        let files = ApplicationFiles {
            resume: Some(attachment("cv.pdf")),
            cover_letter: None,
            transcripts: Some(attachment("grades.pdf")),
        };

        let slots: Vec<FileSlot> = files.attached().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![FileSlot::Resume, FileSlot::Transcripts]);
        assert_eq!(files.count(), 2);
    }

    #[test]
    fn test_slot_parsing() {
        assert_eq!("resume".parse::<FileSlot>().unwrap(), FileSlot::Resume);
        assert_eq!("coverLetter".parse::<FileSlot>().unwrap(), FileSlot::CoverLetter);
        assert_eq!("2".parse::<FileSlot>().unwrap(), FileSlot::Transcripts);
        assert!("photo".parse::<FileSlot>().is_err());
        for slot in FileSlot::ALL {
            assert_eq!(FileSlot::ALL[slot.index()], slot);
        }
    }

    #[test]
    fn test_validate_requires_all_text_fields() {
        assert!(ApplicationForm::new("Jane Doe", "jane@example.com", "555-1234")
            .validate()
            .is_ok());

        let err = ApplicationForm::new("", "jane@example.com", "")
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            PortalError::validation("required field(s) missing: fullName, phone")
        );
    }

    #[test]
    fn test_application_id_parse() {
        assert_eq!("1700000000000".parse::<ApplicationId>().unwrap().value(), 1_700_000_000_000);
        assert!("abc".parse::<ApplicationId>().is_err());
    }
}
