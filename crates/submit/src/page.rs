use anyhow::Result;

use crate::form::Field;
use crate::validation::ValidationReport;

mod terminal;

pub use terminal::TerminalPage;

pub const SUCCESS_MESSAGE: &str = "Success!";
pub const FAILURE_MESSAGE: &str = "Something went wrong!";

/// Validation state of a single input and the feedback element next to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldView {
    pub invalid: bool,
    pub feedback: String,
}

/// In-memory model of the form markup the controller drives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormView {
    repo_url: FieldView,
    access_token: FieldView,
    email: FieldView,
    validated: bool,
    disabled: bool,
}

impl FormView {
    #[must_use]
    pub fn field(&self, field: Field) -> &FieldView {
        match field {
            Field::RepoUrl => &self.repo_url,
            Field::AccessToken => &self.access_token,
            Field::Email => &self.email,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldView {
        match field {
            Field::RepoUrl => &mut self.repo_url,
            Field::AccessToken => &mut self.access_token,
            Field::Email => &mut self.email,
        }
    }

    #[must_use]
    pub const fn is_validated(&self) -> bool {
        self.validated
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn reset(&mut self) {
        self.validated = false;
    }

    /// Marks invalid fields with their message, clears the invalid flag on valid
    /// ones and switches the form into its validated state.
    ///
    /// Feedback text of a field that became valid is left in place; it is hidden
    /// by the cleared flag.
    pub fn render_errors(&mut self, report: &ValidationReport) {
        self.validated = false;

        for field in Field::ALL {
            let view = self.field_mut(field);
            match report.message(field) {
                Some(message) => {
                    view.invalid = true;
                    message.clone_into(&mut view.feedback);
                }
                None => view.invalid = false,
            }
        }

        self.validated = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
    Status,
}

/// A message the user has to acknowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success() -> Self {
        Self {
            kind: NotificationKind::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn failure() -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: FAILURE_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn status(status: &str) -> Self {
        Self {
            kind: NotificationKind::Status,
            message: status.to_string(),
        }
    }
}

/// Everything the submission controller needs from the surface hosting the form.
pub trait Page {
    fn set_loading(&self, visible: bool);

    fn render_form(&self, form: &FormView);

    fn notify(&self, notification: &Notification);

    /// Renders an HTML response into the dedicated result container.
    ///
    /// # Errors
    /// Returns an error if the container cannot be written.
    fn render_html(&self, html: &str) -> Result<()>;
}
