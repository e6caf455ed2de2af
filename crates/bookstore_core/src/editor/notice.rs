//! Short user-facing outcome messages for editor actions.

use crate::editor::form::FormField;
use std::fmt::{Display, Formatter};

/// Transient notification produced by an editor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    FillAllFields,
    /// Price or quantity text is not a whole number.
    InvalidNumber(FormField),
    /// Provider rejected a field; carries its message.
    Invalid(String),
    InsertSucceeded,
    InsertFailed,
    UpdateSucceeded,
    UpdateFailed,
    DeleteSucceeded,
    DeleteFailed,
    EnterPhoneNumber,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::FillAllFields => "Please fill in all fields".to_string(),
            Self::InvalidNumber(field) => format!("{} must be a whole number", field.label()),
            Self::Invalid(message) => message.clone(),
            Self::InsertSucceeded => "Book saved".to_string(),
            Self::InsertFailed => "Error with saving book".to_string(),
            Self::UpdateSucceeded => "Book updated".to_string(),
            Self::UpdateFailed => "Error with updating book".to_string(),
            Self::DeleteSucceeded => "Book deleted".to_string(),
            Self::DeleteFailed => "Error with deleting book".to_string(),
            Self::EnterPhoneNumber => "Please enter a phone number".to_string(),
        }
    }

    /// Returns `true` for notices that report a completed write.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::InsertSucceeded | Self::UpdateSucceeded | Self::DeleteSucceeded
        )
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
