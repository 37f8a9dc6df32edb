//! Portal state module.

pub mod model;

pub use model::{
    PortalState, SUBMISSION_FAILED_ALERT, SUCCESS_NOTICE_DURATION, SubmissionPhase, ViewState,
};
