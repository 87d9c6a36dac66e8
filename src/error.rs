//! Error types and handling for `TravelAI` application

use thiserror::Error;

/// Main error type for the `TravelAI` application
#[derive(Error, Debug)]
pub enum TravelAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Gemini or weather API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The AI returned text that could not be turned into a plan
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// A planner session id that does not exist (or expired)
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TravelAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// True for quota / rate limit failures reported by the AI provider
    #[must_use]
    pub fn is_quota(&self) -> bool {
        match self {
            TravelAiError::Api { message } => {
                let lower = message.to_lowercase();
                lower.contains("quota") || lower.contains("429")
            }
            _ => false,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelAiError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelAiError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TravelAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelAiError::Parse { .. } => {
                "The AI response could not be understood. Please try again.".to_string()
            }
            TravelAiError::NotFound { message } => message.clone(),
            TravelAiError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TravelAiError::config("missing API key");
        assert!(matches!(config_err, TravelAiError::Config { .. }));

        let api_err = TravelAiError::api("connection failed");
        assert!(matches!(api_err, TravelAiError::Api { .. }));

        let parse_err = TravelAiError::parse("no JSON object");
        assert!(matches!(parse_err, TravelAiError::Parse { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TravelAiError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = TravelAiError::api("test");
        assert!(api_err.user_message().contains("Unable to connect"));

        let validation_err = TravelAiError::validation("destination is required");
        assert!(
            validation_err
                .user_message()
                .contains("destination is required")
        );

        let parse_err = TravelAiError::parse("garbage");
        assert!(parse_err.user_message().contains("could not be understood"));
    }

    #[test]
    fn test_quota_detection() {
        assert!(TravelAiError::api("Gemini returned 429: Resource has been exhausted").is_quota());
        assert!(TravelAiError::api("Quota exceeded for project").is_quota());
        assert!(!TravelAiError::api("connection refused").is_quota());
        assert!(!TravelAiError::parse("quota").is_quota());
    }
}
