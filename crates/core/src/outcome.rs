//! Typed result of running an operation.

use serde_json::Value;

/// Status code reported for a successful operation.
pub const SUCCESS_CODE: u16 = 200;

/// Status code reported for an operation that failed or panicked.
pub const INTERNAL_ERROR_CODE: u16 = 500;

/// What an operation produced.
///
/// Operations signal expected errors by returning [`Outcome::Failure`]; they
/// never need to panic to report a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation's result value (a URL, an object of URLs, a message...).
    Success(Value),
    /// An error with an HTTP-style code (`>= 400`) and a human-readable text.
    Failure { code: u16, message: String },
}

impl Outcome {
    /// Shorthand for a failure with an arbitrary code.
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self::Failure {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a `500` failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::failure(INTERNAL_ERROR_CODE, message)
    }

    /// The HTTP-style status code carried by this outcome.
    pub fn code(&self) -> u16 {
        match self {
            Self::Success(_) => SUCCESS_CODE,
            Self::Failure { code, .. } => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_reports_200() {
        assert_eq!(Outcome::Success(json!("/uploads/a.mp3")).code(), 200);
    }

    #[test]
    fn failure_reports_its_code() {
        assert_eq!(Outcome::failure(401, "Unauthorized").code(), 401);
        assert_eq!(Outcome::internal("boom").code(), 500);
        assert!(!Outcome::internal("boom").is_success());
    }
}
