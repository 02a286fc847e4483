//! File system errors

use std::path::Path;

use super::ProvisionError;

/// Creates a file system error carrying the offending path
pub fn failed(path: &Path, err: impl ToString) -> ProvisionError {
    ProvisionError::FilesystemFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an archive extraction error
pub fn extraction_failed(archive: &Path, reason: impl ToString) -> ProvisionError {
    ProvisionError::ExtractionFailed {
        archive: archive.display().to_string(),
        reason: reason.to_string(),
    }
}
