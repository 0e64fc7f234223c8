use booklend_config::ConfigError;
use booklend_core::error::AppError;
use booklend_core::ErrorSeverity;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Domain(#[from] AppError),

    #[error("Settings error: {0}")]
    Config(#[from] ConfigError),
}

impl LibraryError {
    /// Severity of the underlying failure; settings errors are validation failures
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Domain(e) => e.severity(),
            Self::Config(_) => ErrorSeverity::Rejected,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(e) => e.user_message(),
            Self::Config(e) => e.to_string(),
        }
    }
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
