use std::path::PathBuf;

use crate::context::Scope;
use crate::invoke::InvokeError;

/// Errors surfaced by mixer operations.
#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    #[error("no {scope} control with id {id}")]
    NotFound { scope: Scope, id: usize },

    #[error("{requested} control id used while the {active} context is active")]
    ScopeMismatch { requested: Scope, active: Scope },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to read card registry {path}: {source}")]
    Registry {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl MixerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// True for errors caused by the caller rather than the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::ScopeMismatch { .. } | Self::InvalidArgument(_)
        )
    }
}
