use sapwood_core::{LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};

use crate::query::QueryError;

/// Failures surfaced by parsing, configuration and query compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// `parse` called before `set_language`.
    #[error("no language set")]
    NoLanguage,

    #[error(
        "incompatible language version {version}, expected {}..={}",
        MIN_COMPATIBLE_LANGUAGE_VERSION,
        LANGUAGE_VERSION
    )]
    LanguageVersionMismatch { version: u32 },

    /// The cancellation flag was raised mid-parse. The parse can be resumed.
    #[error("parse cancelled")]
    Cancelled,

    /// The timeout elapsed mid-parse. The parse can be resumed.
    #[error("parse timed out")]
    TimedOut,

    /// Included ranges must be well-formed, ascending and non-overlapping.
    #[error("included range {index} is malformed or overlaps its predecessor")]
    InvalidRanges { index: usize },

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
