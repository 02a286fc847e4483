//! Transports that move artifact bytes into the cache
//!
//! - `http://` and `https://` URIs are fetched with a blocking `reqwest`
//!   client, retrying transient failures
//! - `file://` URIs and plain paths are copied from the local filesystem

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

/// Attempts made for an HTTP download before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay between HTTP attempts, multiplied by the attempt number
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Where an artifact is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Remote resource
    Http(String),
    /// Local file
    Local(PathBuf),
}

impl Source {
    /// Classify a URI
    pub fn parse(uri: &str) -> Self {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            Source::Http(uri.to_string())
        } else if let Some(path) = uri.strip_prefix("file://") {
            Source::Local(PathBuf::from(path))
        } else {
            Source::Local(PathBuf::from(uri))
        }
    }
}

/// Copy the artifact behind `uri` into `destination`, returning the byte count
///
/// `destination` is truncated before each attempt so a failed attempt
/// never leaves a partial prefix behind.
pub fn fetch_into(client: &Client, uri: &str, destination: &mut File) -> Result<u64, String> {
    match Source::parse(uri) {
        Source::Local(path) => {
            reset(destination)?;
            let mut source =
                File::open(&path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
            io::copy(&mut source, destination).map_err(|e| e.to_string())
        }
        Source::Http(url) => fetch_http(client, &url, destination),
    }
}

fn fetch_http(client: &Client, url: &str, destination: &mut File) -> Result<u64, String> {
    let mut attempt = 1;
    loop {
        reset(destination)?;
        debug!(url, attempt, "downloading");

        match try_http(client, url, destination) {
            Ok(bytes) => return Ok(bytes),
            Err(failure) if failure.transient && attempt < MAX_ATTEMPTS => {
                warn!(
                    url,
                    attempt,
                    reason = %failure.reason,
                    "transient download failure, retrying"
                );
                thread::sleep(RETRY_DELAY * attempt);
                attempt += 1;
            }
            Err(failure) => return Err(failure.reason),
        }
    }
}

struct HttpFailure {
    reason: String,
    transient: bool,
}

fn try_http(client: &Client, url: &str, destination: &mut File) -> Result<u64, HttpFailure> {
    let mut response = client.get(url).send().map_err(|e| HttpFailure {
        transient: e.is_connect() || e.is_timeout(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpFailure {
            reason: format!("server responded with {status}"),
            transient: status.is_server_error(),
        });
    }

    response.copy_to(destination).map_err(|e| HttpFailure {
        transient: e.is_timeout() || e.is_body(),
        reason: e.to_string(),
    })
}

fn reset(file: &mut File) -> Result<(), String> {
    file.set_len(0).map_err(|e| e.to_string())?;
    file.seek(SeekFrom::Start(0))
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://repo.example.com/t.tar.gz"),
            Source::Http("https://repo.example.com/t.tar.gz".to_string())
        );
        assert_eq!(
            Source::parse("file:///repo/t.tar.gz"),
            Source::Local(PathBuf::from("/repo/t.tar.gz"))
        );
        assert_eq!(
            Source::parse("/repo/t.tar.gz"),
            Source::Local(PathBuf::from("/repo/t.tar.gz"))
        );
    }

    #[test]
    fn test_fetch_local_file() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let source = temp.path().join("support.jar");
        std::fs::write(&source, b"jar bytes").expect("write source");

        let mut destination = tempfile::tempfile().expect("temp file");
        let client = Client::new();
        let bytes = fetch_into(&client, &source.display().to_string(), &mut destination)
            .expect("local fetch");
        assert_eq!(bytes, 9);

        let mut contents = Vec::new();
        destination.seek(SeekFrom::Start(0)).expect("seek");
        destination.read_to_end(&mut contents).expect("read");
        assert_eq!(contents, b"jar bytes");
    }

    #[test]
    fn test_fetch_missing_local_file() {
        let mut destination = tempfile::tempfile().expect("temp file");
        let client = Client::new();
        let err = fetch_into(&client, "file:///nonexistent/support.jar", &mut destination)
            .expect_err("missing file");
        assert!(err.contains("cannot open"));
    }
}
