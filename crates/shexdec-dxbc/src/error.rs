use thiserror::Error;

/// Errors produced while walking a `DXBC` container.
///
/// Every variant carries a human-readable context string describing which
/// field or chunk was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DxbcError {
    /// The fixed container header is missing or inconsistent.
    #[error("malformed DXBC header: {context}")]
    MalformedHeader {
        /// What was wrong with the header.
        context: String,
    },
    /// The chunk offset table is inconsistent.
    #[error("malformed DXBC chunk offsets: {context}")]
    MalformedOffsets {
        /// What was wrong with the offset table.
        context: String,
    },
    /// A declared size or range falls outside the available bytes.
    #[error("DXBC data out of bounds: {context}")]
    OutOfBounds {
        /// Which range overflowed.
        context: String,
    },
}

impl DxbcError {
    pub(crate) fn malformed_header(context: impl Into<String>) -> Self {
        Self::MalformedHeader {
            context: context.into(),
        }
    }

    pub(crate) fn malformed_offsets(context: impl Into<String>) -> Self {
        Self::MalformedOffsets {
            context: context.into(),
        }
    }

    pub(crate) fn out_of_bounds(context: impl Into<String>) -> Self {
        Self::OutOfBounds {
            context: context.into(),
        }
    }

    /// Returns the context string without the variant prefix.
    pub fn context(&self) -> &str {
        match self {
            Self::MalformedHeader { context }
            | Self::MalformedOffsets { context }
            | Self::OutOfBounds { context } => context,
        }
    }
}
