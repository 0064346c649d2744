use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::form::FormInput;
use crate::page::{FormView, Notification, Page};
use crate::storage::{SessionStore, StorageError, RESULT_DATA_KEY};
use crate::transport::{RawResponse, Transport, TransportError};
use crate::validation::{validate, ValidationReport};


pub const DEFAULT_ENDPOINT_PATH: &str = "/api/v1/smells";

/// Shape the backend answers a successful submission with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// `{"status": ..., "result": ...}`; the result is kept in session storage.
    Json,
    /// `{"status": ...}`; the status is shown to the user.
    Status,
    /// A complete HTML page rendered into the result container.
    #[default]
    Html,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerOptions {
    pub endpoint_path: String,
    pub response_mode: ResponseMode,
    pub validate: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            response_mode: ResponseMode::default(),
            validate: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,

    #[error("validation failed: {0}")]
    Validation(ValidationReport),

    #[error(transparent)]
    Network(#[from] TransportError),

    #[error("backend responded with status {status}{}", message_suffix(.message.as_deref()))]
    Http { status: u16, message: Option<String> },

    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unable to render response: {0}")]
    Render(String),
}

fn message_suffix(message: Option<&str>) -> String {
    message
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Stored { status: Option<String> },
    Acknowledged { status: String },
    Rendered,
}

/// A submit event raised by the form.
#[derive(Debug)]
pub struct SubmitEvent {
    input: FormInput,
    default_prevented: bool,
}

impl SubmitEvent {
    #[must_use]
    pub fn new(input: FormInput) -> Self {
        Self {
            input,
            default_prevented: false,
        }
    }

    #[must_use]
    pub fn input(&self) -> &FormInput {
        &self.input
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Deserialize)]
struct ResultEnvelope {
    #[serde(default)]
    status: serde_json::Value,
    result: serde_json::Value,
}

impl ResultEnvelope {
    fn status(&self) -> Option<String> {
        match &self.status {
            serde_json::Value::Null => None,
            serde_json::Value::String(status) => Some(status.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
}

#[derive(Debug)]
pub struct SubmissionController<T, P, S> {
    transport: T,
    page: P,
    store: S,
    options: ControllerOptions,
    form: Mutex<FormView>,
    in_flight: AtomicBool,
}

impl<T, P, S> SubmissionController<T, P, S>
where
    T: Transport,
    P: Page,
    S: SessionStore,
{
    #[must_use]
    pub fn new(transport: T, page: P, store: S, options: ControllerOptions) -> Self {
        Self {
            transport,
            page,
            store,
            options,
            form: Mutex::new(FormView::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn form_view(&self) -> FormView {
        self.with_form(|form| form.clone())
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one submission attempt end to end.
    ///
    /// The event's default action is always suppressed. Every failure is
    /// reported to the page before it is returned, and the loading indicator is
    /// hidden again on every path that showed it.
    ///
    /// # Errors
    /// Returns the reason the attempt ended without a result. Nothing is retried.
    pub async fn handle_submit(&self, event: &mut SubmitEvent) -> Result<Completion, SubmitError> {
        event.prevent_default();

        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            warn!("ignoring submit while a previous request is still in flight");
            return Err(SubmitError::InFlight);
        };

        let input = event.input();
        self.with_form(FormView::reset);

        if self.options.validate {
            let report = validate(input);
            let form = self.with_form(|form| {
                form.render_errors(&report);
                form.clone()
            });

            if !report.is_valid() {
                warn!(fields = ?report.invalid_fields(), "submission rejected by validation");
                self.page.render_form(&form);
                return Err(SubmitError::Validation(report));
            }
        }

        let result = self.send(input).await;
        if let Err(error) = &result {
            self.report_failure(error);
        }
        result
    }

    async fn send(&self, input: &FormInput) -> Result<Completion, SubmitError> {
        info!(
            repo_url = %input.repo_url,
            mode = ?self.options.response_mode,
            "submitting analysis request"
        );

        let loading = LoadingGuard::show(&self.page, &self.form);
        let response = self
            .transport
            .post_form(&self.options.endpoint_path, &input.form_pairs())
            .await;
        drop(loading);

        let response = response?;
        if !response.is_success() {
            return Err(SubmitError::Http {
                status: response.status,
                message: response.error_message(),
            });
        }

        self.dispatch(&response)
    }

    fn dispatch(&self, response: &RawResponse) -> Result<Completion, SubmitError> {
        match self.options.response_mode {
            ResponseMode::Json => {
                let envelope = serde_json::from_slice::<ResultEnvelope>(&response.body)?;
                let serialized = serde_json::to_string(&envelope.result)?;
                self.store.set_item(RESULT_DATA_KEY, &serialized)?;
                let status = envelope.status();

                info!(
                    status = status.as_deref().unwrap_or("-"),
                    bytes = serialized.len(),
                    "stored analysis result"
                );
                self.page.notify(&Notification::success());
                Ok(Completion::Stored { status })
            }
            ResponseMode::Status => {
                let envelope = serde_json::from_slice::<StatusEnvelope>(&response.body)?;

                info!(status = %envelope.status, "backend acknowledged submission");
                self.page.notify(&Notification::status(&envelope.status));
                Ok(Completion::Acknowledged {
                    status: envelope.status,
                })
            }
            ResponseMode::Html => {
                self.page
                    .render_html(&response.text())
                    .map_err(|error| SubmitError::Render(format!("{error:#}")))?;
                Ok(Completion::Rendered)
            }
        }
    }

    fn report_failure(&self, failure: &SubmitError) {
        match failure {
            SubmitError::Http { status, message } => warn!(
                status = *status,
                message = message.as_deref().unwrap_or("-"),
                "backend rejected analysis request"
            ),
            other => error!(error = %other, "analysis request failed"),
        }

        self.page.notify(&Notification::failure());
    }

    fn with_form<R>(&self, apply: impl FnOnce(&mut FormView) -> R) -> R {
        let mut form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut form)
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Disables the form and shows the loading indicator until dropped.
struct LoadingGuard<'a, P: Page> {
    page: &'a P,
    form: &'a Mutex<FormView>,
}

impl<'a, P: Page> LoadingGuard<'a, P> {
    fn show(page: &'a P, form: &'a Mutex<FormView>) -> Self {
        let guard = Self { page, form };
        guard.set_submitting(true);
        guard
    }

    fn set_submitting(&self, submitting: bool) {
        let snapshot = {
            let mut form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
            form.set_disabled(submitting);
            form.clone()
        };
        self.page.render_form(&snapshot);
        self.page.set_loading(submitting);
    }
}

impl<P: Page> Drop for LoadingGuard<'_, P> {
    fn drop(&mut self) {
        self.set_submitting(false);
    }
}
