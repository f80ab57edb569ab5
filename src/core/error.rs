use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Every way a single tool invocation can fail. None of these are fatal to
/// the server; the dispatcher turns each one into an `{"error": ...}` payload.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Both filePath and keyword are required")]
    MissingArgument,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading file: {0}")]
    ReadFailure(#[from] std::io::Error),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_messages() {
        assert_eq!(
            SearchError::UnknownTool("grep".to_string()).to_string(),
            "Unknown tool: grep"
        );
        assert_eq!(
            SearchError::MissingArgument.to_string(),
            "Both filePath and keyword are required"
        );
        assert_eq!(
            SearchError::FileNotFound(PathBuf::from("/tmp/missing.txt")).to_string(),
            "File not found: /tmp/missing.txt"
        );
    }

    #[test]
    fn test_read_failure_embeds_cause() {
        let err: SearchError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.to_string(), "Error reading file: denied");
    }
}
