use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("No entry recorded for {0}")]
    NotFound(String),

    #[error("Authentication failed")]
    AuthFailure,

    #[error("Only an owner may modify entries")]
    Forbidden,

    #[error("Failed to persist entry: {0}")]
    PersistenceFailure(String),

    #[error("Insight generation failed: {0}")]
    InsightFailure(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl TrackerError {
    /// The text shown to the user when this error ends an operation.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => String::new(),
            Self::AuthFailure => {
                "Invalid credentials. Please check your email and password.".to_string()
            }
            Self::Forbidden => "Partner View: Entries can only be modified by Owner.".to_string(),
            Self::PersistenceFailure(_) => "Failed to save data. Try again.".to_string(),
            Self::InsightFailure(_) => "Failed to load AI suggestions. Please try again.".to_string(),
            Self::DateError(details) => format!("Invalid date: {}", details),
            Self::InvalidConfig(details) => format!("Configuration error: {}", details),
            Self::SerializationError(_) => "Stored data could not be read.".to_string(),
        }
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        Self::InsightFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_message_is_generic() {
        let msg = TrackerError::AuthFailure.user_message();
        assert!(msg.contains("Invalid credentials"));
        assert!(!msg.to_lowercase().contains("password is wrong"));
    }

    #[test]
    fn test_not_found_has_no_user_message() {
        assert!(TrackerError::NotFound("2024-06-01".to_string())
            .user_message()
            .is_empty());
    }
}
