//! Optional closed vocabulary for the `status` field.

use std::collections::BTreeSet;

use crate::error::ParamError;

/// Which `status` values the service accepts.
///
/// `FreeForm` accepts anything. `Closed` accepts only the listed values. The
/// empty string is always accepted since it means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    #[default]
    FreeForm,
    Closed(BTreeSet<String>),
}

impl StatusPolicy {
    /// Parse a comma-separated list such as `pending,in-progress,done`.
    /// A list with no non-blank entries yields `FreeForm`.
    pub fn from_list(raw: &str) -> Self {
        let allowed: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if allowed.is_empty() {
            StatusPolicy::FreeForm
        } else {
            StatusPolicy::Closed(allowed)
        }
    }

    pub fn check(&self, status: &str) -> Result<(), ParamError> {
        match self {
            StatusPolicy::Closed(allowed) if !status.is_empty() && !allowed.contains(status) => {
                Err(ParamError::UnknownStatus(status.to_string()))
            }
            _ => Ok(()),
        }
    }
}
