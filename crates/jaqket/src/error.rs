//! Error type for dataset generation

use std::path::PathBuf;

use arrow::error::ArrowError;
use jaqket_core::StreamError;

/// Everything that can stop a generation run.
///
/// Records that fail a filter (answer not among the candidates, too few
/// candidates, no context with the answer) are not errors; they are skipped.
#[derive(Debug)]
pub enum DatasetError {
    /// Unrecognized config name
    InvalidConfig(String),
    /// A required input path was not supplied
    MissingArgument {
        config: &'static str,
        argument: &'static str,
    },
    /// Could not open or read an input file
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Input is not valid JSON or lacks a required field
    Malformed {
        path: PathBuf,
        /// 1-based line number for line-delimited inputs
        line: Option<usize>,
        message: String,
    },
    /// A v1 answer candidate has no entry in the entity table
    UnknownEntity { qid: String, title: String },
    /// Resource could not be resolved to a local file
    Fetch { url: String, source: StreamError },
    /// Building a `RecordBatch` failed
    Arrow(ArrowError),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(name) => write!(f, "Invalid config name: {name}"),
            Self::MissingArgument { config, argument } => {
                write!(f, "Invalid argument for {config}: {argument} is required")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Malformed {
                path,
                line: Some(line),
                message,
            } => write!(f, "{}:{line}: malformed record: {message}", path.display()),
            Self::Malformed {
                path,
                line: None,
                message,
            } => write!(f, "{}: malformed document: {message}", path.display()),
            Self::UnknownEntity { qid, title } => {
                write!(f, "{qid}: candidate '{title}' not found in entity table")
            }
            Self::Fetch { url, source } => write!(f, "failed to fetch {url}: {source}"),
            Self::Arrow(e) => write!(f, "Arrow: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Fetch { source, .. } => Some(source),
            Self::Arrow(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArrowError> for DatasetError {
    fn from(e: ArrowError) -> Self {
        Self::Arrow(e)
    }
}

impl DatasetError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed(
        path: &std::path::Path,
        line: Option<usize>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            line,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_invalid_config() {
        let err = DatasetError::InvalidConfig("v3.0".into());
        assert_eq!(err.to_string(), "Invalid config name: v3.0");
    }

    #[test]
    fn display_missing_argument() {
        let err = DatasetError::MissingArgument {
            config: "v1.0",
            argument: "entities_file_path",
        };
        assert_eq!(
            err.to_string(),
            "Invalid argument for v1.0: entities_file_path is required"
        );
    }

    #[test]
    fn display_malformed_with_line() {
        let err = DatasetError::malformed(std::path::Path::new("train.json"), Some(3), "EOF");
        assert_eq!(err.to_string(), "train.json:3: malformed record: EOF");
    }

    #[test]
    fn display_malformed_document() {
        let err = DatasetError::malformed(std::path::Path::new("dev.json"), None, "expected `[`");
        assert!(err.to_string().starts_with("dev.json: malformed document"));
    }

    #[test]
    fn display_unknown_entity() {
        let err = DatasetError::UnknownEntity {
            qid: "QA20QBIK-0002".into(),
            title: "東京".into(),
        };
        assert_eq!(
            err.to_string(),
            "QA20QBIK-0002: candidate '東京' not found in entity table"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        let err = DatasetError::io(
            std::path::Path::new("missing.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("missing.json:"));
    }
}
