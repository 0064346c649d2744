use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{FormView, Notification, NotificationKind, Page};
use crate::form::Field;

/// Drives the submission from a terminal. HTML results land in a file that
/// plays the part of the result container.
#[derive(Debug)]
pub struct TerminalPage {
    html_output: PathBuf,
}

impl TerminalPage {
    #[must_use]
    pub fn new(html_output: impl Into<PathBuf>) -> Self {
        Self {
            html_output: html_output.into(),
        }
    }

    #[must_use]
    pub fn html_output(&self) -> &Path {
        &self.html_output
    }
}

impl Page for TerminalPage {
    fn set_loading(&self, visible: bool) {
        if visible {
            info!("analysis request in flight");
            eprintln!("Analyzing repository, this can take a few minutes...");
        } else {
            debug!("analysis request settled");
        }
    }

    fn render_form(&self, form: &FormView) {
        for field in Field::ALL {
            let view = form.field(field);
            if view.invalid {
                eprintln!("  {}: {}", field.id(), view.feedback);
            }
        }
    }

    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Failure => eprintln!("{}", notification.message),
            NotificationKind::Success | NotificationKind::Status => {
                println!("{}", notification.message);
            }
        }
    }

    fn render_html(&self, html: &str) -> Result<()> {
        if let Some(parent) = self
            .html_output
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create result directory: {}", parent.display())
            })?;
        }

        fs::write(&self.html_output, html).with_context(|| {
            format!(
                "Failed to write result page: {}",
                self.html_output.display()
            )
        })?;

        info!(path = %self.html_output.display(), bytes = html.len(), "rendered result page");
        println!("Result written to {}", self.html_output.display());
        Ok(())
    }
}
