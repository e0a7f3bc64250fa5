use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    #[error("Resource not found")]
    NotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Expected {expected} days in meal plan, got {actual}")]
    DayCountMismatch { expected: usize, actual: usize },

    #[error("LLM provider overloaded: {0}")]
    ProviderOverloaded(String),

    #[error("LLM output failed schema validation after {attempts} attempts: {reason}")]
    SchemaValidation { attempts: u32, reason: String },

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl CoreError {
    /// Whether the error signals temporary capacity exhaustion on the provider side.
    ///
    /// Some providers surface overload only through the message text, so
    /// `ExternalServiceError` is inspected for the usual markers as well.
    pub fn is_overload(&self) -> bool {
        match self {
            CoreError::ProviderOverloaded(_) => true,
            CoreError::ExternalServiceError(message) => is_overload_message(message),
            _ => false,
        }
    }
}

/// Places where a 529 is a status code rather than an arbitrary number.
const OVERLOAD_STATUS_MARKERS: [&str; 5] = [
    "error: 529",
    "status: 529",
    "status 529",
    "\"code\": 529",
    "\"code\":529",
];

pub fn is_overload_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("overloaded")
        || OVERLOAD_STATUS_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_variant_is_overload() {
        assert!(CoreError::ProviderOverloaded("busy".to_string()).is_overload());
    }

    #[test]
    fn test_external_error_with_marker_is_overload() {
        let err = CoreError::ExternalServiceError("LLM API returned error: 529".to_string());
        assert!(err.is_overload());

        let err = CoreError::ExternalServiceError("Model is Overloaded, try later".to_string());
        assert!(err.is_overload());
    }

    #[test]
    fn test_status_shaped_529_is_overload() {
        assert!(is_overload_message("Gemini API returned error: 529 <unknown status code> - {}"));
        assert!(is_overload_message(r#"{"error":{"code": 529,"message":"busy"}}"#));
        assert!(is_overload_message("upstream status 529"));
    }

    #[test]
    fn test_stray_529_is_not_overload() {
        let err = CoreError::ExternalServiceError(
            "Failed to parse LLM response: expected value at line 1 column 529".to_string(),
        );
        assert!(!err.is_overload());
        assert!(!is_overload_message("request id 15290"));
    }

    #[test]
    fn test_other_errors_are_not_overload() {
        assert!(!CoreError::ExternalServiceError("401 unauthorized".to_string()).is_overload());
        assert!(!CoreError::NotFound.is_overload());
        assert!(
            !CoreError::SchemaValidation {
                attempts: 4,
                reason: "overloaded".to_string()
            }
            .is_overload()
        );
    }
}
