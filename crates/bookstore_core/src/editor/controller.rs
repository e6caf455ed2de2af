//! Editor session controller for adding or editing one book.
//!
//! # Responsibility
//! - Drive the New/Existing session state machine.
//! - Translate form text into provider calls and provider results into
//!   `Notice`s.
//! - Model confirmation prompts as explicit pending state.
//!
//! # Invariants
//! - `changed` only turns true through user edits or stepper taps.
//! - Quantity decrement never goes below 1.
//! - Delete closes the session whatever the delete result was.

use crate::editor::form::{BookForm, FormField};
use crate::editor::notice::Notice;
use crate::model::book::BookValues;
use crate::provider::book_provider::{BookStoreProvider, FetchError, ProviderError};
use crate::provider::uri::ContentUri;
use crate::repo::book_repo::BookFilter;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const TEL_SCHEME: &str = "tel:";

pub type EditorResult<T> = Result<T, EditorError>;

/// Editor misuse or provider failure that is not a user-facing notice.
#[derive(Debug)]
pub enum EditorError {
    SessionClosed,
    /// Delete and call are only available for existing records.
    NotAvailableForNewBook,
    NoPendingPrompt,
    Provider(ProviderError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionClosed => write!(f, "editor session is closed"),
            Self::NotAvailableForNewBook => {
                write!(f, "action is only available for an existing book")
            }
            Self::NoPendingPrompt => write!(f, "no confirmation prompt is pending"),
            Self::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for EditorError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// Which record the session edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Existing(ContentUri),
}

/// How the user asked to leave the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    NavigateUp,
    Back,
}

/// Confirmation prompt currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    UnsavedChanges(ExitKind),
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Discard,
    KeepEditing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Delete,
    Cancel,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Saved,
    Exited(ExitKind),
    Deleted,
}

/// Result of an exit request or unsaved-changes answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Closed(ExitKind),
    PromptShown,
    Stayed,
}

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Persisted; the session is closed. `uri` addresses the saved record.
    Saved { notice: Notice, uri: ContentUri },
    /// Nothing persisted; the session stays open.
    Rejected(Notice),
}

/// Result of the delete-prompt answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub notice: Option<Notice>,
    pub closed: bool,
}

/// Result of loading an existing record into the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
    Cancelled,
    /// New sessions have nothing to load.
    Skipped,
}

/// Dial request for the supplier phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub phone: String,
}

impl DialTarget {
    /// `tel:` URI handed to the platform dialer.
    pub fn uri(&self) -> String {
        format!("{TEL_SCHEME}{}", self.phone)
    }
}

/// One add/edit session bound to a provider.
pub struct EditorController {
    provider: Arc<BookStoreProvider>,
    mode: EditorMode,
    form: BookForm,
    changed: bool,
    prompt: Option<Prompt>,
    closed: Option<CloseReason>,
}

impl EditorController {
    /// Starts a session; `uri = None` edits a new book.
    pub fn new(provider: Arc<BookStoreProvider>, uri: Option<ContentUri>) -> Self {
        let (mode, form) = match uri {
            Some(uri) => (EditorMode::Existing(uri), BookForm::default()),
            None => (EditorMode::New, BookForm::blank()),
        };
        debug!(
            "event=editor_open module=editor status=ok mode={}",
            mode_label(&mode)
        );
        Self {
            provider,
            mode,
            form,
            changed: false,
            prompt: None,
            closed: None,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn screen_title(&self) -> &'static str {
        match self.mode {
            EditorMode::New => "Add a Book",
            EditorMode::Existing(_) => "Edit Book",
        }
    }

    /// Delete and call affordances are shown for existing records only.
    pub fn shows_record_actions(&self) -> bool {
        matches!(self.mode, EditorMode::Existing(_))
    }

    pub fn form(&self) -> &BookForm {
        &self.form
    }

    pub fn field(&self, field: FormField) -> &str {
        self.form.get(field)
    }

    pub fn has_changes(&self) -> bool {
        self.changed
    }

    pub fn pending_prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// Fetches the bound record and fills the form when a row came back.
    ///
    /// Zero rows or a cancelled fetch leave the form untouched.
    pub async fn load(&mut self) -> EditorResult<LoadOutcome> {
        self.ensure_open()?;
        let uri = match &self.mode {
            EditorMode::New => return Ok(LoadOutcome::Skipped),
            EditorMode::Existing(uri) => uri.clone(),
        };

        match Arc::clone(&self.provider).fetch(uri).await {
            Ok(Some(book)) => {
                self.form = BookForm::from_book(&book);
                debug!(
                    "event=editor_load module=editor status=ok id={}",
                    book.id
                );
                Ok(LoadOutcome::Loaded)
            }
            Ok(None) => Ok(LoadOutcome::NotFound),
            Err(FetchError::Cancelled) => Ok(LoadOutcome::Cancelled),
            Err(FetchError::Provider(err)) => Err(err.into()),
        }
    }

    /// Drops loaded data, clearing every field.
    pub fn invalidate(&mut self) {
        self.form.clear();
    }

    /// Replaces one field's text and marks the session changed.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> EditorResult<()> {
        self.ensure_open()?;
        self.form.set(field, value);
        self.changed = true;
        Ok(())
    }

    pub fn increment_quantity(&mut self) -> EditorResult<()> {
        self.ensure_open()?;
        self.changed = true;
        let next = match parse_whole(&self.form.quantity) {
            Some(quantity) => quantity.saturating_add(1),
            None => 1,
        };
        self.form.quantity = next.to_string();
        Ok(())
    }

    /// Decrements quantity, staying put at 1 or below.
    pub fn decrement_quantity(&mut self) -> EditorResult<()> {
        self.ensure_open()?;
        self.changed = true;
        match parse_whole(&self.form.quantity) {
            Some(quantity) if quantity > 1 => self.form.quantity = (quantity - 1).to_string(),
            Some(_) => {}
            None => self.form.quantity = "1".to_string(),
        }
        Ok(())
    }

    /// Validates the form and persists it.
    ///
    /// New sessions insert; existing sessions update all five fields.
    pub fn save(&mut self) -> EditorResult<SaveOutcome> {
        self.ensure_open()?;
        if self.form.has_empty_field() {
            return Ok(SaveOutcome::Rejected(Notice::FillAllFields));
        }
        let Some(price) = parse_whole(&self.form.price) else {
            return Ok(SaveOutcome::Rejected(Notice::InvalidNumber(FormField::Price)));
        };
        let Some(quantity) = parse_whole(&self.form.quantity) else {
            return Ok(SaveOutcome::Rejected(Notice::InvalidNumber(
                FormField::Quantity,
            )));
        };

        let values = BookValues::complete(
            self.form.title.trim(),
            price,
            quantity,
            self.form.supplier_name.trim(),
            self.form.supplier_phone.trim(),
        );

        let saved = match &self.mode {
            EditorMode::New => {
                match self.provider.insert(&self.provider.books_uri(), &values) {
                    Ok(Some(uri)) => (Notice::InsertSucceeded, uri),
                    Ok(None) => return Ok(SaveOutcome::Rejected(Notice::InsertFailed)),
                    Err(ProviderError::InvalidArgument(err)) => {
                        return Ok(SaveOutcome::Rejected(Notice::Invalid(err.to_string())))
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            EditorMode::Existing(uri) => {
                match self.provider.update(uri, &values, &BookFilter::all()) {
                    Ok(0) => return Ok(SaveOutcome::Rejected(Notice::UpdateFailed)),
                    Ok(_) => (Notice::UpdateSucceeded, uri.clone()),
                    Err(ProviderError::InvalidArgument(err)) => {
                        return Ok(SaveOutcome::Rejected(Notice::Invalid(err.to_string())))
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let (notice, uri) = saved;
        self.close(CloseReason::Saved);
        Ok(SaveOutcome::Saved { notice, uri })
    }

    /// Leaves immediately when unchanged, otherwise asks for confirmation.
    pub fn request_exit(&mut self, kind: ExitKind) -> EditorResult<ExitOutcome> {
        self.ensure_open()?;
        if !self.changed {
            self.close(CloseReason::Exited(kind));
            return Ok(ExitOutcome::Closed(kind));
        }
        self.prompt = Some(Prompt::UnsavedChanges(kind));
        Ok(ExitOutcome::PromptShown)
    }

    /// Resolves the unsaved-changes prompt.
    pub fn answer_unsaved(&mut self, choice: UnsavedChoice) -> EditorResult<ExitOutcome> {
        self.ensure_open()?;
        let Some(Prompt::UnsavedChanges(kind)) = self.prompt else {
            return Err(EditorError::NoPendingPrompt);
        };
        self.prompt = None;
        match choice {
            UnsavedChoice::Discard => {
                self.close(CloseReason::Exited(kind));
                Ok(ExitOutcome::Closed(kind))
            }
            UnsavedChoice::KeepEditing => Ok(ExitOutcome::Stayed),
        }
    }

    /// Shows the delete confirmation prompt.
    pub fn request_delete(&mut self) -> EditorResult<()> {
        self.ensure_open()?;
        self.existing_uri()?;
        self.prompt = Some(Prompt::ConfirmDelete);
        Ok(())
    }

    /// Resolves the delete prompt; `Delete` always closes the session.
    pub fn answer_delete(&mut self, choice: DeleteChoice) -> EditorResult<DeleteOutcome> {
        self.ensure_open()?;
        if self.prompt != Some(Prompt::ConfirmDelete) {
            return Err(EditorError::NoPendingPrompt);
        }
        self.prompt = None;
        if choice == DeleteChoice::Cancel {
            return Ok(DeleteOutcome {
                notice: None,
                closed: false,
            });
        }

        let uri = self.existing_uri()?.clone();
        let notice = match self.provider.delete(&uri, &BookFilter::all()) {
            Ok(0) => Notice::DeleteFailed,
            Ok(_) => Notice::DeleteSucceeded,
            Err(err) => {
                error!(
                    "event=editor_delete module=editor status=error uri={} error={}",
                    uri, err
                );
                Notice::DeleteFailed
            }
        };
        self.close(CloseReason::Deleted);
        Ok(DeleteOutcome {
            notice: Some(notice),
            closed: true,
        })
    }

    /// Builds a dial request for the supplier phone shown in the form.
    pub fn call_supplier(&self) -> EditorResult<Result<DialTarget, Notice>> {
        self.ensure_open()?;
        self.existing_uri()?;
        let phone = self.form.supplier_phone.trim();
        if phone.is_empty() {
            return Ok(Err(Notice::EnterPhoneNumber));
        }
        Ok(Ok(DialTarget {
            phone: phone.to_string(),
        }))
    }

    fn existing_uri(&self) -> EditorResult<&ContentUri> {
        match &self.mode {
            EditorMode::Existing(uri) => Ok(uri),
            EditorMode::New => Err(EditorError::NotAvailableForNewBook),
        }
    }

    fn ensure_open(&self) -> EditorResult<()> {
        if self.closed.is_some() {
            return Err(EditorError::SessionClosed);
        }
        Ok(())
    }

    fn close(&mut self, reason: CloseReason) {
        info!(
            "event=editor_close module=editor status=ok mode={} reason={:?}",
            mode_label(&self.mode),
            reason
        );
        self.prompt = None;
        self.changed = false;
        self.closed = Some(reason);
    }
}

fn mode_label(mode: &EditorMode) -> &'static str {
    match mode {
        EditorMode::New => "new",
        EditorMode::Existing(_) => "existing",
    }
}

fn parse_whole(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_whole;

    #[test]
    fn parse_whole_trims_and_rejects_fractions() {
        assert_eq!(parse_whole(" 12 "), Some(12));
        assert_eq!(parse_whole("-3"), Some(-3));
        assert_eq!(parse_whole("1.5"), None);
        assert_eq!(parse_whole(""), None);
    }
}
