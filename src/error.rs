use crate::generator::Stage;
use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for documentation generation
#[derive(Debug)]
pub enum Error {
    /// The documentation directory exists but cannot be written to.
    Permission(PathBuf),
    IoError { path: PathBuf, source: std::io::Error },
    ParseError { file: PathBuf, message: String },
    InvalidInput(String),
    SerializationError(String),
    /// A pipeline stage failed; wraps the underlying cause.
    Stage { stage: Stage, source: Box<Error> },
}

impl Error {
    /// Builds an `IoError` tagged with the path that was being accessed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }

    /// Returns the innermost error, skipping stage wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Permission(dir) => write!(
                f,
                "Documentation storage directory is not writable: {}",
                dir.display()
            ),
            Error::IoError { path, source } => {
                write!(f, "IO error on {}: {}", path.display(), source)
            }
            Error::ParseError { file, message } => {
                write!(f, "Failed to parse file(\"{}\"): {}", file.display(), message)
            }
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::Stage { stage, source } => write!(f, "{} failed: {}", stage, source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source, .. } => Some(source),
            Error::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}
