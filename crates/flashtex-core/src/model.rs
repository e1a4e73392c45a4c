//! Core data model types for flashtex.
//!
//! A deck is a set of [`CardRecord`]s parsed out of `*_cards.tex` files. Each
//! card optionally carries the [`ReviewState`] that the scheduler produced the
//! last time it was rated.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DeckError, DeckResult};

/// Section name used for cards that appear before any `\section{...}`.
pub const DEFAULT_SECTION: &str = "General";

/// A half-open byte range into a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice `text` with this span.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Where a card came from, precise enough to patch it back in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// The originating deck file.
    pub file: PathBuf,
    /// 1-based line of the card's `\begin{flashcard}`.
    pub line: usize,
    /// From the start of the opening line through the end of the closing line,
    /// line terminator included.
    pub card_span: Span,
    /// The annotation line directly below the card, without its terminator.
    pub annotation_span: Option<Span>,
}

/// SM-2 ease factor, stored exactly in hundredths.
///
/// Every SM-2 adjustment is a whole number of hundredths, so keeping the value
/// in fixed point means a state written to disk with two decimals reads back
/// identical, no matter how many save cycles it goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct EaseFactor(u32);

impl EaseFactor {
    /// The floor imposed by SM-2.
    pub const MIN: EaseFactor = EaseFactor(130);
    /// Starting ease for a card that has never been reviewed.
    pub const INITIAL: EaseFactor = EaseFactor(250);

    /// Build from hundredths, clamping to [`EaseFactor::MIN`].
    pub fn from_hundredths(hundredths: i64) -> Self {
        let floored = hundredths.max(i64::from(Self::MIN.0));
        EaseFactor(u32::try_from(floored).unwrap_or(u32::MAX))
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for EaseFactor {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for EaseFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<f64> for EaseFactor {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(format!("ease factor is not a number: {value}"));
        }
        let hundredths = (value * 100.0).round();
        if hundredths < f64::from(Self::MIN.0) {
            return Err(format!("ease factor {value} is below {}", Self::MIN));
        }
        if hundredths > f64::from(u32::MAX) {
            return Err(format!("ease factor {value} is out of range"));
        }
        Ok(EaseFactor(hundredths as u32))
    }
}

impl From<EaseFactor> for f64 {
    fn from(ease: EaseFactor) -> Self {
        ease.as_f64()
    }
}

impl FromStr for EaseFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid ease factor: {s}"))?;
        EaseFactor::try_from(value)
    }
}

/// Scheduling state of a card after at least one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub last_review_date: NaiveDate,
    /// Days from `last_review_date` until the card is due again; always >= 1.
    pub interval_days: u32,
    pub ease_factor: EaseFactor,
    /// Consecutive successful reviews; reset to 0 on failure.
    pub repetitions: u32,
}

impl ReviewState {
    /// Date on which the card becomes due again.
    pub fn next_review_date(&self) -> NaiveDate {
        self.last_review_date
            .checked_add_days(Days::new(u64::from(self.interval_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date() <= today
    }
}

/// Self-assessed recall quality, 1 (forgot) to 5 (perfect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw rating. Out-of-range values are rejected, never clamped.
    pub fn new(value: i64) -> DeckResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(DeckError::InvalidRating(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above count as successful recall.
    pub const fn is_success(self) -> bool {
        self.0 >= 3
    }

    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "forgot",
            2 => "hard",
            3 => "ok",
            4 => "good",
            _ => "perfect",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = DeckError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(i64::from(value))
    }
}

impl TryFrom<i64> for Rating {
    type Error = DeckError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// A single question/answer card and its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Unique across the whole deck.
    pub id: String,
    /// Raw question payload; math markup is kept verbatim.
    pub question: String,
    /// Raw answer payload.
    pub answer: String,
    /// Nearest preceding section heading, or [`DEFAULT_SECTION`].
    pub section: String,
    pub source: SourceLocation,
    /// `None` until the card is reviewed for the first time.
    #[serde(default)]
    pub review_state: Option<ReviewState>,
}

impl CardRecord {
    /// A card is due when it was never reviewed or its interval has elapsed.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.review_state.map_or(true, |state| state.is_due(today))
    }

    pub fn next_review_date(&self) -> Option<NaiveDate> {
        self.review_state.map(|state| state.next_review_date())
    }
}
