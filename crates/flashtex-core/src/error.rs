//! Deck error types.
//!
//! Per-card and per-file problems are collected as values during a load;
//! operation errors (`commit`, scheduling) are returned directly. Both share
//! [`DeckError`] so callers can report them the same way.

use std::path::PathBuf;

use thiserror::Error;

/// What went wrong with a single card or annotation line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// `\begin{flashcard}` without a `{id}` argument, or with an empty one.
    #[error("card has no ID")]
    MissingId,

    /// The ID contains whitespace or a colon.
    #[error("invalid card ID `{0}`")]
    InvalidId(String),

    /// No `\Q{...}` payload inside the card.
    #[error("card `{0}` has no question")]
    MissingQuestion(String),

    /// No `\A{...}` payload inside the card.
    #[error("card `{0}` has no answer")]
    MissingAnswer(String),

    /// The card was never closed by `\end{flashcard}`.
    #[error("card `{0}` is not terminated")]
    Unterminated(String),

    /// An annotation line that could not be decoded.
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(String),

    /// An annotation that is not directly attached to the card it names.
    #[error("annotation for `{0}` does not follow that card")]
    OrphanedAnnotation(String),
}

/// A parse problem localized to one line of one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}: {kind}", .file.display())]
pub struct ParseError {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(file: impl Into<PathBuf>, line: usize, kind: ParseErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}

/// Errors produced while loading, scheduling or persisting a deck.
#[derive(Debug, Error)]
pub enum DeckError {
    /// A card or annotation in a source file could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A card ID that was already taken by an earlier card.
    #[error("{}:{line}: duplicate card ID `{id}` (first defined at {}:{first_line})", .file.display(), .first_file.display())]
    DuplicateId {
        id: String,
        file: PathBuf,
        line: usize,
        first_file: PathBuf,
        first_line: usize,
    },

    /// Lookup or commit for an ID that is not in the deck.
    #[error("unknown card: {0}")]
    UnknownCard(String),

    /// A rating outside 1..=5.
    #[error("invalid rating {0}, expected 1-5")]
    InvalidRating(i64),

    /// Reading a source file or replacing it failed.
    #[error("failed to access {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The card is in the deck but no longer present in its source file.
    #[error("card `{id}` no longer exists in {}", .file.display())]
    CardMissing { id: String, file: PathBuf },

    /// No input file yielded a single valid card. Carries the problems that
    /// were collected along the way.
    #[error("empty deck: no valid cards in {files} file(s), {} problem(s) reported", .errors.len())]
    EmptyDeck {
        files: usize,
        errors: Vec<DeckError>,
    },
}

impl DeckError {
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeckError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// The file this error is attributed to, if any.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            DeckError::Parse(e) => Some(e.file.as_path()),
            DeckError::DuplicateId { file, .. }
            | DeckError::Persistence { path: file, .. }
            | DeckError::CardMissing { file, .. } => Some(file.as_path()),
            DeckError::UnknownCard(_) | DeckError::InvalidRating(_) | DeckError::EmptyDeck { .. } => {
                None
            }
        }
    }
}

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;
