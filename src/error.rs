//! Error types for PBN tokenizing and document editing.

use thiserror::Error;

/// Broad class of a [`PbnError`], so callers can decide what is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input. The whole parse is aborted.
    Syntax,
    /// A well-formed value that does not make sense, reported when it is used.
    Content,
    /// The caller broke a document invariant. Indicates a bug in the caller.
    Invariant,
    /// The operation exists but is deliberately not implemented.
    Unsupported,
    /// Reading or writing failed.
    Io,
    /// The external analysis service failed.
    Analysis,
}

/// Errors that can occur when reading, editing or writing PBN documents
#[derive(Error, Debug)]
pub enum PbnError {
    #[error("line {line}: invalid tag: {text}")]
    InvalidTag { line: usize, text: String },

    #[error("multiline comment starting at line {line} is not closed")]
    UnterminatedComment { line: usize },

    #[error("invalid column format: {0}")]
    InvalidColumnFormat(String),

    #[error("only one column can be ordered: {0}")]
    MultipleOrderedColumns(String),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<PbnError>,
    },

    #[error("invalid {tag} value: {value:?}")]
    InvalidTagValue { tag: &'static str, value: String },

    #[error("cannot build a board from an incomplete context: missing {0} tag")]
    IncompleteBoard(&'static str),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("board number {0} cannot be changed in place")]
    BoardNumberImmutable(u32),

    #[error("board number {0} is already used by another board")]
    DuplicateBoardNumber(u32),

    #[error("board context already holds a {0} tag")]
    DuplicateTag(String),

    #[error("index {index} is out of range for {len} tokens")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("token not found in document")]
    TokenNotFound,

    #[error("board context {0} not found")]
    ContextNotFound(u32),

    #[error("inconsistent document: {0}")]
    Inconsistent(String),

    #[error("not implemented: {0}")]
    Unsupported(String),

    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PbnError {
    /// Class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PbnError::InvalidTag { .. }
            | PbnError::UnterminatedComment { .. }
            | PbnError::InvalidColumnFormat(_)
            | PbnError::MultipleOrderedColumns(_) => ErrorKind::Syntax,
            PbnError::AtLine { source, .. } => source.kind(),
            PbnError::InvalidTagValue { .. }
            | PbnError::IncompleteBoard(_)
            | PbnError::InvalidOption(_) => ErrorKind::Content,
            PbnError::BoardNumberImmutable(_)
            | PbnError::DuplicateBoardNumber(_)
            | PbnError::DuplicateTag(_)
            | PbnError::IndexOutOfRange { .. }
            | PbnError::TokenNotFound
            | PbnError::ContextNotFound(_)
            | PbnError::Inconsistent(_) => ErrorKind::Invariant,
            PbnError::Unsupported(_) => ErrorKind::Unsupported,
            PbnError::Analysis(_) => ErrorKind::Analysis,
            PbnError::Io(_) => ErrorKind::Io,
        }
    }

    /// Attach the input line a nested error was raised on.
    pub(crate) fn at_line(self, line: usize) -> Self {
        PbnError::AtLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Result type for PBN operations
pub type Result<T> = std::result::Result<T, PbnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_wrapped_error_is_kind_of_source() {
        let err = PbnError::InvalidColumnFormat("Score\\X".to_string()).at_line(7);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(
            err.to_string(),
            "line 7: invalid column format: Score\\X"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(PbnError::TokenNotFound.kind(), ErrorKind::Invariant);
        assert_eq!(PbnError::IncompleteBoard("Deal").kind(), ErrorKind::Content);
        assert_eq!(
            PbnError::Unsupported("range splitting".into()).kind(),
            ErrorKind::Unsupported
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(PbnError::from(io).kind(), ErrorKind::Io);
    }
}
