//! Configuration errors

use super::ProvisionError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> ProvisionError {
    ProvisionError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> ProvisionError {
    ProvisionError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates an invalid context error
pub fn invalid_context(message: impl Into<String>) -> ProvisionError {
    ProvisionError::ContextInvalid {
        message: message.into(),
    }
}
