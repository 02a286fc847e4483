//! Artifact download errors

use super::ProvisionError;

/// Creates a download failed error
pub fn failed(
    name: impl Into<String>,
    version: impl Into<String>,
    uri: impl Into<String>,
    reason: impl ToString,
) -> ProvisionError {
    ProvisionError::DownloadFailed {
        name: name.into(),
        version: version.into(),
        uri: uri.into(),
        reason: reason.to_string(),
    }
}
