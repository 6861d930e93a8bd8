use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while parsing, generating or configuring.
/// Validation problems are *not* errors: they drive the repair loop instead,
/// see `crate::validate`.
#[derive(Debug, Error)]
pub enum Error {
    /// a single line could not be read as a fact or a rule
    #[error("could not parse `{line}`: {reason}")]
    Parse { line: String, reason: String },

    /// the text-generation collaborator failed or answered with something unusable
    #[error("text generation failed: {0}")]
    Generation(String),

    /// the text-generation collaborator did not answer in time
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("could not build http client: {0}")]
    Http(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(line: &str, reason: &str) -> Error {
        Error::Parse {
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }
    /// Collaborator failures end a workflow run, they are never retried by us
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Error::Generation(_) | Error::Timeout(_) | Error::Retrieval(_))
    }
}
