use core_dom::DomError;
use thiserror::Error;

/// Setup-time mistakes. Unlike measurement failures these are returned as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("cannot observe `{target}`: target does not resolve to an element")]
    UnresolvedTarget {
        target: String,
        #[source]
        source: DomError,
    },

    #[error("cannot observe `{target}`: {source}")]
    Registration {
        target: String,
        #[source]
        source: DomError,
    },
}
