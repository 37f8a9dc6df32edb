//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs mirror the stored text format exactly and are validated on
//! the way in. They are private to the infrastructure layer; the rest of the
//! workspace only sees domain models.

mod application;

pub use application::{
    ApplicationRecordDTO, DecodedApplications, FileAttachmentDTO, decode_applications,
    encode_applications,
};
