use std::fmt;
use std::path::PathBuf;

/// Error taxonomy for the telemetry pipeline
#[derive(Debug)]
pub enum PipelineError {
    /// I/O errors (walking the tree, writing or deleting artifacts)
    Io(std::io::Error),
    /// CSV errors while reading or writing intermediate tables
    Csv(csv::Error),
    /// The decoder could not parse the log or locate a requested topic
    Decode(String),
    /// A satellite topic has no rows to join against
    MissingTopic(String),
    /// Registered artifacts missing on disk at cleanup time
    IncompleteArtifacts(Vec<PathBuf>),
    /// Chart or styled-report rendering failed
    Export(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(err) => write!(f, "I/O error: {}", err),
            PipelineError::Csv(err) => write!(f, "CSV error: {}", err),
            PipelineError::Decode(msg) => write!(f, "Decode error: {}", msg),
            PipelineError::MissingTopic(topic) => {
                write!(f, "Missing topic: {} has no samples to join", topic)
            }
            PipelineError::IncompleteArtifacts(paths) => {
                write!(
                    f,
                    "Incomplete artifacts: {} registered file(s) missing:",
                    paths.len()
                )?;
                for path in paths {
                    write!(f, " {}", path.display())?;
                }
                Ok(())
            }
            PipelineError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(err) => Some(err),
            PipelineError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Csv(err)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
