//! Unified error types for gifstash.
//!
//! Every variant renders as `CODE: detail` and maps to a distinct MCP error code.

use std::path::{Path, PathBuf};

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the gifstash store, fetcher and server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The identifier derived from the submitted URL is already indexed.
    #[error("ALREADY_EXISTS: {0}")]
    AlreadyExists(String),

    /// Another indexed gif already occupies the blob location.
    #[error("LOCATION_TAKEN: {location} is held by {owner}")]
    LocationTaken { location: String, owner: String },

    /// No index entry for the given identifier.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Filesystem operation failed.
    #[error("IO_ERROR: {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index snapshot could not be encoded or decoded.
    #[error("SNAPSHOT_ERROR: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Store could not be opened at startup.
    #[error("INIT_FAILED: {0}")]
    InitFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// SSRF blocked - private/internal address not allowed.
    #[error("SSRF_BLOCKED: {0}")]
    SsrfBlocked(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Transport failure or error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl Error {
    /// Build a `map_err` adapter that tags an I/O failure with the operation and path.
    pub fn io(operation: &'static str, path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.as_ref().to_path_buf();
        move |source| Error::Io { operation, path, source }
    }

    /// Whether this error came from the remote fetch rather than local storage.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_)
                | Error::SsrfBlocked(_)
                | Error::FetchTimeout(_)
                | Error::FetchTooLarge(_)
                | Error::HttpError(_)
        )
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NotFound(id) => (-32001, format!("no gif with id {id}")),
            Error::AlreadyExists(id) => (-32009, format!("gif already stored as {id}")),
            Error::LocationTaken { .. } => (-32010, err.to_string()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::SsrfBlocked(msg) => (-32004, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::Io { .. } | Error::Snapshot(_) | Error::InitFailed(_) => (-32002, err.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("abc123".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_io_error_display() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io("write", "/tmp/gifs/index.json")(source);
        let text = err.to_string();
        assert!(text.starts_with("IO_ERROR: write"));
        assert!(text.contains("index.json"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::NotFound("abc123".to_string()).into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::AlreadyExists("abc123".to_string()).into();
        assert_eq!(mcp_err.code.0, -32009);

        let mcp_err: McpError =
            Error::LocationTaken { location: "x.test/a.gif".into(), owner: "abc123".into() }.into();
        assert_eq!(mcp_err.code.0, -32010);
        assert!(mcp_err.message.contains("x.test/a.gif"));

        let mcp_err: McpError = Error::InitFailed("gone".to_string()).into();
        assert_eq!(mcp_err.code.0, -32002);
    }

    #[test]
    fn test_is_fetch_error() {
        assert!(Error::HttpError("status 404".into()).is_fetch_error());
        assert!(Error::SsrfBlocked("127.0.0.1".into()).is_fetch_error());
        assert!(!Error::AlreadyExists("x".into()).is_fetch_error());
        assert!(!Error::NotFound("x".into()).is_fetch_error());
    }
}
