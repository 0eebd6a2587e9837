//! Validation errors for client-supplied parameters.
//!
//! # Design
//! Every variant here is a client input problem and maps to HTTP 400 on the
//! server. Messages are safe to return to the caller verbatim: they only
//! echo back what the caller sent.

use std::fmt;

/// Rejected listing parameters or record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// `user_id` was absent or empty.
    MissingUserId,

    /// `page_size` was not a positive integer.
    InvalidPageSize(String),

    /// `page_size` exceeded the configured ceiling.
    PageSizeTooLarge { requested: i32, max: i32 },

    /// `page_token` was not a UUID in text form.
    InvalidPageToken(String),

    /// `prev_page_token` was not a UUID in text form.
    InvalidPrevPageToken(String),

    /// A status outside the configured closed set.
    UnknownStatus(String),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::MissingUserId => write!(f, "user_id is required"),
            ParamError::InvalidPageSize(raw) => write!(f, "invalid page size: {raw:?}"),
            ParamError::PageSizeTooLarge { requested, max } => {
                write!(f, "page size {requested} exceeds maximum of {max}")
            }
            ParamError::InvalidPageToken(raw) => write!(f, "invalid page token: {raw:?}"),
            ParamError::InvalidPrevPageToken(raw) => {
                write!(f, "invalid prev page token: {raw:?}")
            }
            ParamError::UnknownStatus(status) => write!(f, "unknown status: {status:?}"),
        }
    }
}

impl std::error::Error for ParamError {}
