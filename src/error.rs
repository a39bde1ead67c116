//! Unified application error type.
//!
//! Each subsystem defines its own error enum; this type folds them into one
//! so the binary has a single failure channel. Every variant is transparent,
//! the subsystem messages are already written for the operator.

use thiserror::Error;

/// Any failure the runner can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Port(#[from] crate::port::PortError),

    #[error(transparent)]
    Tool(#[from] crate::exec::ToolError),

    #[error(transparent)]
    Identity(#[from] crate::identity::IdentityError),

    #[error(transparent)]
    Board(#[from] crate::board::BoardError),

    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),

    #[error(transparent)]
    Report(#[from] crate::report::ReportError),
}

/// A specialized `Result` for runner operations.
pub type Result<T> = std::result::Result<T, Error>;
