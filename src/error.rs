//! Error types and handling for the postinstall orchestrator
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Errors here are deliberately coarse: a postinstall run never aborts the
//! surrounding npm install, so most variants end up logged and recorded in
//! the diagnostics output rather than propagated to the process boundary.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for postinstall operations
#[derive(Error, Diagnostic, Debug)]
pub enum OutpostError {
    // Environment errors
    #[error("Could not resolve the user home directory")]
    #[diagnostic(
        code(outpost::env::home_unavailable),
        help("Set HOME (or USERPROFILE on Windows), or pass --home-dir explicitly")
    )]
    HomeDirUnavailable,

    // File system errors
    #[error("Failed to read {path}: {reason}")]
    #[diagnostic(code(outpost::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    #[diagnostic(code(outpost::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to create directory {path}: {reason}")]
    #[diagnostic(
        code(outpost::fs::dir_create_failed),
        help("Check permissions on the parent directory")
    )]
    DirCreateFailed { path: String, reason: String },

    #[error("Failed to copy {src_path} to {target}: {reason}")]
    #[diagnostic(code(outpost::fs::copy_failed))]
    CopyFailed {
        src_path: String,
        target: String,
        reason: String,
    },

    // Configuration errors
    #[error("Failed to parse {path}: {reason}")]
    #[diagnostic(
        code(outpost::config::parse_failed),
        help("The file may be corrupted; deleting it lets the next run regenerate it")
    )]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to serialize {what}: {reason}")]
    #[diagnostic(code(outpost::config::serialize_failed))]
    SerializeFailed { what: String, reason: String },

    // Deployment errors
    #[error("Failed to deploy component '{name}': {reason}")]
    #[diagnostic(code(outpost::deploy::component_failed))]
    ComponentDeployFailed { name: String, reason: String },

    #[error("No components could be deployed")]
    #[diagnostic(
        code(outpost::deploy::nothing_deployed),
        help("Check that the package was extracted completely and the target directory is writable")
    )]
    NothingDeployed,
}

impl OutpostError {
    /// Map an IO error into a read failure for `path`
    pub fn read(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }

    /// Map an IO error into a write failure for `path`
    pub fn write(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Result type alias for postinstall operations
pub type Result<T> = std::result::Result<T, OutpostError>;
