use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for jira-sprint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a flow
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unreadable configuration, raised before any request
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection-level failure talking to Jira
    #[error("request to Jira failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Jira answered with a non-2xx status
    #[error("jira error: {status} {text}")]
    Remote { status: u16, text: String },

    /// Response body did not have the expected shape
    #[error("failed to decode Jira response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no transition to {target:?} for issue {issue} (available: {})", .available.join(", "))]
    NoSuchTransition {
        issue: String,
        target: String,
        available: Vec<String>,
    },

    #[error("no active sprint found in current issues")]
    NoActiveSprint,

    /// Malformed command line or interactive answer
    #[error("{0}")]
    Usage(String),

    /// Reading the interactive answer or writing to the terminal failed
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// User-friendly error wrapper
#[derive(Debug)]
pub struct UserError {
    message: String,
    details: Option<String>,
    suggestion: Option<String>,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        UserError {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Print the error to stderr
    pub fn display(&self) {
        eprintln!("\n❌ Error: {}", self.message);

        if let Some(ref details) = self.details {
            eprintln!("\n   {}", details);
        }

        if let Some(ref suggestion) = self.suggestion {
            eprintln!("\n💡 {}", suggestion);
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

/// Convert a top-level failure into something a person can act on
pub fn user_friendly_error(error: &anyhow::Error) -> UserError {
    let Some(err) = error.downcast_ref::<Error>() else {
        return UserError::new("An unexpected error occurred").with_details(format!("{:#}", error));
    };

    match err {
        Error::Config(msg) => UserError::new("Configuration is incomplete")
            .with_details(msg.clone())
            .with_suggestion(
                "Set JIRA_EMAIL, JIRA_API_TOKEN and JIRA_URL, or add them to the [jira] table of the config file",
            ),
        Error::Transport(e) => UserError::new("Network connection failed")
            .with_details(e.to_string())
            .with_suggestion("Check JIRA_URL and your internet connection"),
        Error::Remote { status: 401, .. } | Error::Remote { status: 403, .. } => {
            UserError::new("Jira rejected the credentials")
                .with_details(err.to_string())
                .with_suggestion("Check JIRA_EMAIL and JIRA_API_TOKEN")
        }
        Error::Remote { status: 404, .. } => UserError::new("Jira resource not found")
            .with_details(err.to_string())
            .with_suggestion("Check the issue key and JIRA_URL"),
        Error::Remote { .. } => UserError::new("Jira returned an error").with_details(err.to_string()),
        Error::Decode(_) => UserError::new("Unexpected response from Jira")
            .with_details(err.to_string())
            .with_suggestion("Check the custom field ids in the [fields] table of the config file"),
        Error::NoSuchTransition { .. } => UserError::new("Status change not available").with_details(err.to_string()),
        Error::NoActiveSprint => UserError::new("No active sprint found")
            .with_details("None of your assigned issues belong to an active sprint")
            .with_suggestion("Add any issue of the current sprint to yourself and try again"),
        Error::Usage(msg) => UserError::new(msg.clone()),
        Error::Io(e) => UserError::new("Terminal input/output failed").with_details(e.to_string()),
    }
}
