//! Command implementations.

pub mod config;
pub mod promise;
pub mod report;
pub mod run;
pub mod scrub;
pub mod summary;
pub mod verify;

pub use self::config::execute_config;
pub use self::promise::execute_promise;
pub use self::report::execute_report;
pub use self::run::execute_run;
pub use self::scrub::execute_scrub;
pub use self::summary::execute_summary;
pub use self::verify::execute_verify;

use crate::error::{CliError, Result};
use inkwarden_domain::{Document, SourceCandidate};
use std::io::Read;
use std::path::Path;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran and nothing blocks the content
    Accepted,
    /// The command ran and the content must not ship
    GateFailed,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Accepted => 0,
            Outcome::GateFailed => 2,
        }
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a document from JSON.
pub fn parse_document(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(|e| CliError::InvalidInput(format!("Document is not valid JSON: {}", e)))
}

/// Parse a JSON array of source candidates.
pub fn parse_candidates(json: &str) -> Result<Vec<SourceCandidate>> {
    serde_json::from_str(json)
        .map_err(|e| CliError::InvalidInput(format!("Expected a JSON array of sources: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Accepted.exit_code(), 0);
        assert_eq!(Outcome::GateFailed.exit_code(), 2);
    }

    #[test]
    fn test_parse_document_accepts_partial_json() {
        let doc = parse_document(r#"{"title": "睡眠指南"}"#).unwrap();
        assert_eq!(doc.title, "睡眠指南");
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_parse_candidates_rejects_object() {
        let err = parse_candidates(r#"{"url": "https://www.hpa.gov.tw"}"#).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
