//! Crate-level error types.

use std::fmt;

/// Errors produced by the swoop crate.
///
/// Animation requests themselves never fail — degenerate inputs are
/// handled by policy (instant apply or snap-to-target). The fallible
/// surface is limited to options I/O and worker-thread plumbing.
#[derive(Debug)]
pub enum SwoopError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Failed to spawn the animation worker thread.
    ThreadSpawn(std::io::Error),
}

impl fmt::Display for SwoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
        }
    }
}

impl std::error::Error for SwoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<std::io::Error> for SwoopError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
