//! Notice generation errors.

use thiserror::Error;

/// Errors from the notice pipeline. All of them are fatal to the
/// `issue_legal_notice` tool call; a notice is never issued from a
/// partially rendered document.
#[derive(Debug, Error)]
pub enum NoticeError {
    /// A required placeholder had no bound value.
    #[error("template render failed: unbound placeholder {{{placeholder}}}")]
    UnboundPlaceholder {
        /// The offending token name.
        placeholder: String,
    },

    /// Malformed template syntax (unclosed `{`).
    #[error("template render failed: unclosed placeholder at offset {offset}")]
    UnclosedPlaceholder {
        /// Byte offset of the opening brace.
        offset: usize,
    },

    /// Template store lookup failed.
    #[error(transparent)]
    Store(#[from] gable_store::StoreError),

    /// The rendered artifact could not be persisted.
    #[error("artifact write failed: {0}")]
    ArtifactIo(#[from] std::io::Error),
}
