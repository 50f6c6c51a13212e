use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Not Found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Not A Directory: '{path}'")]
    NotADirectory { path: PathBuf },

    #[error("Path Escape: '{path}' resolves outside project root '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error("Unknown File Type: '{0}'")]
    UnknownType(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Configuration Parsing Error: {0}")]
    ConfigParse(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("Glob Pattern Error: {0}")]
    Glob(String),
}

impl AppError {
    /// Errors caused by what the caller supplied rather than by the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound { .. }
                | AppError::NotADirectory { .. }
                | AppError::UnknownType(_)
                | AppError::InvalidArgument(_)
                | AppError::Config(_)
                | AppError::ConfigParse(_)
        )
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified() {
        assert!(AppError::UnknownType("rust".into()).is_invalid_input());
        assert!(
            AppError::NotFound {
                path: PathBuf::from("missing")
            }
            .is_invalid_input()
        );
        assert!(!AppError::WalkDir("boom".into()).is_invalid_input());
        assert!(
            !AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).is_invalid_input()
        );
    }
}
