//! flashtex-core: card parsing, SM-2 scheduling and in-place annotation.
//!
//! Flashcards live in LaTeX-like `*_cards.tex` files. This crate parses them
//! into [`CardRecord`]s, computes the next review with SM-2, and writes the
//! result back as a `%@rep:` comment without disturbing the rest of the file.

pub mod annotation;
pub mod config;
pub mod deck;
pub mod discovery;
pub mod error;
pub mod model;
pub mod parser;
pub mod scheduler;
pub mod store;

pub use deck::{Deck, LoadReport, SectionSummary};
pub use error::{DeckError, DeckResult, ParseError, ParseErrorKind};
pub use model::{CardRecord, EaseFactor, Rating, ReviewState, SourceLocation, Span};
