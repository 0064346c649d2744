use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::form::{Field, FormInput};

const GITHUB_REPO_URL_PATTERN: &str = r"^https://github\.com/[^/]+/[^/]+$";
const ACCESS_TOKEN_PATTERN: &str = r"^github_pat_[A-Za-z0-9_-]{36,}$";
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const REPO_URL_MESSAGE: &str =
    "Valid URL (https://github.com/username/repository) is required.";
pub const ACCESS_TOKEN_MESSAGE: &str = "Valid Github PAT: github_pat_xxxxxx";
pub const EMAIL_MESSAGE: &str = "Valid email is required.";

static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| compile(GITHUB_REPO_URL_PATTERN));
static ACCESS_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(ACCESS_TOKEN_PATTERN));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(EMAIL_PATTERN));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|error| panic!("invalid validation pattern {pattern:?}: {error}"))
}

#[must_use]
pub fn is_github_repo_url(value: &str) -> bool {
    GITHUB_REPO_URL.is_match(value)
}

#[must_use]
pub fn is_access_token(value: &str) -> bool {
    !value.is_empty() && ACCESS_TOKEN.is_match(value)
}

#[must_use]
pub fn is_email(value: &str) -> bool {
    !value.is_empty() && EMAIL.is_match(&value.to_lowercase())
}

/// Per-field outcome of checking one [`FormInput`]. `None` means the field is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    repo_url: Option<&'static str>,
    access_token: Option<&'static str>,
    email: Option<&'static str>,
}

impl ValidationReport {
    #[must_use]
    pub fn message(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::RepoUrl => self.repo_url,
            Field::AccessToken => self.access_token,
            Field::Email => self.email,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        Field::ALL
            .iter()
            .all(|field| self.message(*field).is_none())
    }

    #[must_use]
    pub fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.message(*field).is_some())
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = Field::ALL
            .into_iter()
            .filter_map(|field| {
                self.message(field)
                    .map(|message| format!("{}: {message}", field.id()))
            })
            .collect::<Vec<_>>();

        if messages.is_empty() {
            formatter.write_str("all fields valid")
        } else {
            formatter.write_str(&messages.join("; "))
        }
    }
}

/// Checks every field and returns a fresh report; nothing carries over between calls.
#[must_use]
pub fn validate(input: &FormInput) -> ValidationReport {
    ValidationReport {
        repo_url: (!is_github_repo_url(&input.repo_url)).then_some(REPO_URL_MESSAGE),
        access_token: (!is_access_token(&input.access_token)).then_some(ACCESS_TOKEN_MESSAGE),
        email: (!is_email(&input.email)).then_some(EMAIL_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_token() -> String {
        format!("github_pat_{}", "A1b2_C3-d4".repeat(4))
    }

    #[test]
    fn patterns_compile() {
        for pattern in [GITHUB_REPO_URL_PATTERN, ACCESS_TOKEN_PATTERN, EMAIL_PATTERN] {
            Regex::new(pattern).expect("pattern compiles");
        }
    }

    #[test]
    #[should_panic(expected = "invalid validation pattern")]
    fn broken_pattern_is_not_treated_as_a_mismatch() {
        let _ = compile(r"^github_pat_[A-Za-z0-9_-{36,}$");
    }

    #[test]
    fn github_repo_url_requires_owner_and_repo_only() {
        assert!(is_github_repo_url("https://github.com/octo/hello-world"));
        assert!(is_github_repo_url("https://github.com/octo/repo.git"));

        assert!(!is_github_repo_url(""));
        assert!(!is_github_repo_url("http://github.com/octo/repo"));
        assert!(!is_github_repo_url("https://gitlab.com/octo/repo"));
        assert!(!is_github_repo_url("https://github.com/octo"));
        assert!(!is_github_repo_url("https://github.com//repo"));
        assert!(!is_github_repo_url("https://github.com/octo/"));
        assert!(!is_github_repo_url("https://github.com/octo/repo/"));
        assert!(!is_github_repo_url("https://github.com/octo/repo/tree/main"));
        assert!(!is_github_repo_url("https://github.com.evil.io/octo/repo"));
    }

    #[test]
    fn access_token_requires_prefix_and_minimum_length() {
        assert!(is_access_token(&valid_token()));
        assert!(is_access_token(&format!("github_pat_{}", "x".repeat(36))));

        assert!(!is_access_token(""));
        assert!(!is_access_token(&format!("github_pat_{}", "x".repeat(35))));
        assert!(!is_access_token(&format!("ghp_{}", "x".repeat(40))));
        assert!(!is_access_token(&format!("github_pat_{}!", "x".repeat(40))));
        assert!(!is_access_token(&format!(" {}", valid_token())));
    }

    #[test]
    fn email_requires_at_and_dotted_domain() {
        assert!(is_email("dev@example.com"));
        assert!(is_email("Dev.Ops@Example.CO.uk"));

        assert!(!is_email(""));
        assert!(!is_email("dev.example.com"));
        assert!(!is_email("dev@example"));
        assert!(!is_email("dev @example.com"));
        assert!(!is_email("dev@exa mple.com"));
        assert!(!is_email("dev@@example.com"));
    }

    #[test]
    fn validate_reports_each_invalid_field_with_its_message() {
        let input = FormInput::new("https://github.com/octo", "token", "nobody");
        let report = validate(&input);

        assert!(!report.is_valid());
        assert_eq!(report.message(Field::RepoUrl), Some(REPO_URL_MESSAGE));
        assert_eq!(report.message(Field::AccessToken), Some(ACCESS_TOKEN_MESSAGE));
        assert_eq!(report.message(Field::Email), Some(EMAIL_MESSAGE));
        assert_eq!(report.invalid_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn validate_accepts_well_formed_input() {
        let input = FormInput::new(
            "https://github.com/octo/repo",
            valid_token(),
            "dev@example.com",
        );
        let report = validate(&input);

        assert!(report.is_valid());
        assert!(report.invalid_fields().is_empty());
        assert_eq!(report.to_string(), "all fields valid");
    }

    #[test]
    fn validate_is_independent_between_calls() {
        let bad = FormInput::new("nope", "nope", "nope");
        let good = FormInput::new(
            "https://github.com/octo/repo",
            valid_token(),
            "dev@example.com",
        );

        assert!(!validate(&bad).is_valid());
        assert!(validate(&good).is_valid());
    }

    #[test]
    fn display_lists_only_invalid_fields() {
        let input = FormInput::new("https://github.com/octo/repo", valid_token(), "nobody");
        assert_eq!(
            validate(&input).to_string(),
            format!("email: {EMAIL_MESSAGE}")
        );
    }
}
