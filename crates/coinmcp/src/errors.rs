use thiserror::Error;

/// Failures raised at the dispatch boundary, before any upstream call is made.
///
/// These are caller mistakes and are reported at the transport level rather than
/// inside a tool response envelope.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("{0}")]
    InvalidParameters(String),
}

pub type ToolResult<T> = Result<T, ToolError>;
