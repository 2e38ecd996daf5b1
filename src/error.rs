//! Error taxonomy for image resolution and build invocation.

use std::path::PathBuf;

/// Errors produced while resolving a build target or driving the external tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No manifest entry and allowed combination match the request.
    #[error("Wanted combination of {distribution} {version} {architecture} is not possible to be build.")]
    NotBuildable {
        distribution: String,
        version: String,
        architecture: String,
    },

    /// Invocation construction was handed a target with empty fields.
    #[error("Not all values are prepared for build (missing: {})", missing.join(", "))]
    IncompleteTarget { missing: Vec<&'static str> },

    /// An external command could not be spawned or exited non-zero.
    #[error("{tool} failed: {detail}")]
    ExternalTool { tool: String, detail: String },

    #[error("'{}' is not a Machinekit-HAL repository root: {reason}", path.display())]
    NotARepository { path: PathBuf, reason: String },

    #[error("manifest '{}': {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Missing required host tools:\n{0}")]
    MissingTools(String),
}

impl Error {
    pub(crate) fn external(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
