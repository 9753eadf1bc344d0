use thiserror::Error;

/// Validation failures raised by the registration and login forms. All of
/// these are recoverable notices, never fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {minimum} characters long")]
    WeakPassword { minimum: usize },

    #[error("SafeNest is designed for children aged 5-18, computed age is {age}")]
    AgeOutOfRange { age: i32 },
}

impl ValidationError {
    /// Stable code used in API notice payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::PasswordMismatch => "password_mismatch",
            Self::WeakPassword { .. } => "weak_password",
            Self::AgeOutOfRange { .. } => "age_out_of_range",
        }
    }
}
