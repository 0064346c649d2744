use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::controller::SubmitError;
use crate::transport::Transport;

pub const DEFAULT_REPORT_PATH: &str = "/api/v1/pdf";

/// Fetches the PDF report of the most recent analysis and writes it to `destination`.
///
/// # Errors
///
/// This function will return an error if the request fails, the backend answers with a
/// non-success status, or the file cannot be written.
pub async fn download_report<T>(transport: &T, path: &str, destination: &Path) -> Result<usize>
where
    T: Transport + ?Sized,
{
    let response = transport.get(path).await.map_err(SubmitError::from)?;
    if !response.is_success() {
        return Err(SubmitError::Http {
            status: response.status,
            message: response.error_message(),
        }
        .into());
    }

    if let Some(parent) = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }

    fs::write(destination, &response.body)
        .with_context(|| format!("Failed to write report: {}", destination.display()))?;

    info!(
        path = %destination.display(),
        bytes = response.body.len(),
        content_type = response.content_type.as_deref().unwrap_or("-"),
        "downloaded smells report"
    );
    Ok(response.body.len())
}
