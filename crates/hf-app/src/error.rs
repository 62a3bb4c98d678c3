//! Error types for the hf-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors behind one
/// interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Compilation of '{entity}' failed: {message}")]
    Compile { entity: String, message: String },

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hf_project::ProjectError> for AppError {
    fn from(err: hf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<hf_project::ValidationError> for AppError {
    fn from(err: hf_project::ValidationError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<hf_sim::SimError> for AppError {
    fn from(err: hf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
