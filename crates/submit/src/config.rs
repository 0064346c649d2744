use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::{ControllerOptions, ResponseMode, DEFAULT_ENDPOINT_PATH};
use crate::report::DEFAULT_REPORT_PATH;

const DEFAULT_CONFIG_PATH: &str = "smells-submit.json";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_SESSION_FILE: &str = ".smells-session.json";
const DEFAULT_HTML_OUTPUT_PATH: &str = "smells-result.html";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub base_url: Option<String>,
    pub endpoint_path: Option<String>,
    pub report_path: Option<String>,
    pub response_mode: Option<ResponseMode>,
    pub validate: Option<bool>,
    pub request_timeout_seconds: Option<u64>,
    pub session_file: Option<String>,
    pub html_output_path: Option<String>,
}

impl SubmitConfig {
    /// Reads the config file named by `SMELLS_SUBMIT_CONFIG_PATH`, or the default path.
    ///
    /// # Errors
    ///
    /// This function will return an error if the config file is located but JSON contents cannot be parsed
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SMELLS_SUBMIT_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let path = Path::new(&config_path);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {config_path}"))?;

        let config = serde_json::from_str::<Self>(&raw)
            .with_context(|| format!("Failed to parse config JSON: {config_path}"))?;

        Ok(config)
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var("SMELLS_SUBMIT_BASE_URL").ok())
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    #[must_use]
    pub fn endpoint_path(&self) -> String {
        self.endpoint_path
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT_PATH)
            .to_string()
    }

    #[must_use]
    pub fn report_path(&self) -> String {
        self.report_path
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_REPORT_PATH)
            .to_string()
    }

    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode.unwrap_or_default()
    }

    #[must_use]
    pub fn validate(&self) -> bool {
        self.validate.unwrap_or(true)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .filter(|seconds| *seconds > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    #[must_use]
    pub fn session_file(&self) -> String {
        self.session_file
            .clone()
            .or_else(|| std::env::var("SMELLS_SUBMIT_SESSION_FILE").ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string())
    }

    #[must_use]
    pub fn html_output_path(&self) -> String {
        self.html_output_path
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_HTML_OUTPUT_PATH)
            .to_string()
    }

    #[must_use]
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            endpoint_path: self.endpoint_path(),
            response_mode: self.response_mode(),
            validate: self.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        std::env::set_var(
            "SMELLS_SUBMIT_CONFIG_PATH",
            "/path/that/does/not/exist/smells-submit.json",
        );
        std::env::remove_var("SMELLS_SUBMIT_BASE_URL");
        std::env::remove_var("SMELLS_SUBMIT_SESSION_FILE");

        let config = SubmitConfig::load().expect("load should succeed");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.endpoint_path(), DEFAULT_ENDPOINT_PATH);
        assert_eq!(config.report_path(), DEFAULT_REPORT_PATH);
        assert_eq!(config.response_mode(), ResponseMode::Html);
        assert!(config.validate());
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        );
        assert_eq!(config.session_file(), DEFAULT_SESSION_FILE);
        assert_eq!(config.html_output_path(), DEFAULT_HTML_OUTPUT_PATH);

        std::env::remove_var("SMELLS_SUBMIT_CONFIG_PATH");
    }

    #[test]
    fn load_parses_and_trims_values() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        let tempdir = tempfile::tempdir().expect("tempdir");
        let config_path = tempdir.path().join("smells-submit.json");

        fs::write(
            &config_path,
            r#"{
  "base_url": "  http://smells.internal:8080/  ",
  "endpoint_path": "  /api/v2/smells  ",
  "response_mode": "json",
  "validate": false,
  "request_timeout_seconds": 30,
  "session_file": "  /tmp/session.json  ",
  "html_output_path": "  out/result.html  "
}"#,
        )
        .expect("write config");

        std::env::set_var(
            "SMELLS_SUBMIT_CONFIG_PATH",
            config_path.to_string_lossy().to_string(),
        );

        let config = SubmitConfig::load().expect("load should succeed");
        assert_eq!(config.base_url(), "http://smells.internal:8080");
        assert_eq!(config.endpoint_path(), "/api/v2/smells");
        assert_eq!(config.report_path(), DEFAULT_REPORT_PATH);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.session_file(), "/tmp/session.json");
        assert_eq!(config.html_output_path(), "out/result.html");
        assert_eq!(
            config.controller_options(),
            ControllerOptions {
                endpoint_path: "/api/v2/smells".to_string(),
                response_mode: ResponseMode::Json,
                validate: false,
            }
        );

        std::env::remove_var("SMELLS_SUBMIT_CONFIG_PATH");
    }

    #[test]
    fn load_rejects_unknown_response_mode() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        let tempdir = tempfile::tempdir().expect("tempdir");
        let config_path = tempdir.path().join("smells-submit.json");
        fs::write(&config_path, r#"{ "response_mode": "xml" }"#).expect("write config");

        std::env::set_var(
            "SMELLS_SUBMIT_CONFIG_PATH",
            config_path.to_string_lossy().to_string(),
        );

        assert!(SubmitConfig::load().is_err());

        std::env::remove_var("SMELLS_SUBMIT_CONFIG_PATH");
    }

    #[test]
    fn base_url_falls_back_to_env_var() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        std::env::set_var("SMELLS_SUBMIT_BASE_URL", "  https://smells.example.com/  ");

        let config = SubmitConfig::default();
        assert_eq!(config.base_url(), "https://smells.example.com");

        std::env::remove_var("SMELLS_SUBMIT_BASE_URL");
    }

    #[test]
    fn blank_paths_fall_back_to_defaults() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        std::env::remove_var("SMELLS_SUBMIT_SESSION_FILE");

        let config = SubmitConfig {
            endpoint_path: Some("  ".to_string()),
            report_path: Some(String::new()),
            session_file: Some(" ".to_string()),
            html_output_path: Some("   ".to_string()),
            ..SubmitConfig::default()
        };
        assert_eq!(config.endpoint_path(), DEFAULT_ENDPOINT_PATH);
        assert_eq!(config.report_path(), DEFAULT_REPORT_PATH);
        assert_eq!(config.session_file(), DEFAULT_SESSION_FILE);
        assert_eq!(config.html_output_path(), DEFAULT_HTML_OUTPUT_PATH);
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = SubmitConfig {
            request_timeout_seconds: Some(0),
            ..SubmitConfig::default()
        };
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        );
    }
}
