use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    RepoUrl,
    AccessToken,
    Email,
}

impl Field {
    pub const ALL: [Self; 3] = [Self::RepoUrl, Self::AccessToken, Self::Email];

    /// Element id of the input, which doubles as its key in the form body.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::RepoUrl => "repo-url",
            Self::AccessToken => "access-token",
            Self::Email => "email",
        }
    }
}

/// The three values read from the form for a single submission attempt.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub repo_url: String,
    pub access_token: String,
    pub email: String,
}

impl FormInput {
    #[must_use]
    pub fn new(
        repo_url: impl Into<String>,
        access_token: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            access_token: access_token.into(),
            email: email.into(),
        }
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::RepoUrl => &self.repo_url,
            Field::AccessToken => &self.access_token,
            Field::Email => &self.email,
        }
    }

    /// Body pairs in form order. Values are passed through untouched.
    #[must_use]
    pub fn form_pairs(&self) -> [(&'static str, &str); 3] {
        Field::ALL.map(|field| (field.id(), self.value(field)))
    }
}

impl fmt::Debug for FormInput {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FormInput")
            .field("repo_url", &self.repo_url)
            .field(
                "access_token",
                &(!self.access_token.is_empty()).then_some("***"),
            )
            .field("email", &self.email)
            .finish()
    }
}
