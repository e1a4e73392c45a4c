//! Inline review annotations.
//!
//! A card's scheduling state lives in a LaTeX comment on the line right after
//! its `\end{flashcard}`:
//!
//! ```text
//! %@rep:<id>:<YYYY-MM-DD>:<interval days>:<ease, 2 decimals>:<repetitions>
//! ```
//!
//! Updates are applied as a minimal patch: only the annotation line of the
//! target card is replaced (or inserted), every other byte stays as it was.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{DeckError, DeckResult};
use crate::model::ReviewState;
use crate::parser::parse_source;

/// Marks an annotation line.
pub const ANNOTATION_PREFIX: &str = "%@rep:";

/// Number of colon-separated fields after the ID.
const FIELD_COUNT: usize = 4;

/// Date written for a card that was saved but never reviewed.
const NEVER_REVIEWED: &str = "none";

/// An annotation line split into its ID and undecoded state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAnnotation<'a> {
    pub id: &'a str,
    pub fields: &'a str,
}

/// Split an annotation line (leading whitespace already removed).
///
/// Returns `None` when the line is not an annotation or names no card.
pub fn split(line: &str) -> Option<RawAnnotation<'_>> {
    let rest = line.strip_prefix(ANNOTATION_PREFIX)?;
    let (id, fields) = rest.split_once(':').unwrap_or((rest, ""));
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some(RawAnnotation {
        id,
        fields: fields.trim_end(),
    })
}

/// Decode `date:interval:ease:repetitions`.
///
/// Older decks may omit the repetition count, which then reads as 0. A date
/// of `none` marks a card that was saved without ever being reviewed and
/// decodes to `None`.
pub fn decode_state(fields: &str) -> Result<Option<ReviewState>, String> {
    let parts: Vec<&str> = fields.split(':').map(str::trim).collect();
    if !(FIELD_COUNT - 1..=FIELD_COUNT).contains(&parts.len()) {
        return Err(format!(
            "expected {FIELD_COUNT} fields after the card ID, found {}",
            parts.len()
        ));
    }

    let interval_days: u32 = parts[1]
        .parse()
        .map_err(|_| format!("invalid interval `{}`", parts[1]))?;
    if interval_days == 0 {
        return Err("interval must be at least 1 day".into());
    }
    let ease_factor = parts[2].parse()?;
    let repetitions: u32 = match parts.get(3) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid repetition count `{raw}`"))?,
        None => 0,
    };

    if parts[0] == NEVER_REVIEWED {
        return Ok(None);
    }
    let last_review_date = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d")
        .map_err(|e| format!("invalid review date `{}`: {e}", parts[0]))?;

    Ok(Some(ReviewState {
        last_review_date,
        interval_days,
        ease_factor,
        repetitions,
    }))
}

/// Render the annotation line for `id`, without a line terminator.
pub fn render(id: &str, state: &ReviewState) -> String {
    format!(
        "{ANNOTATION_PREFIX}{id}:{}:{}:{}:{}",
        state.last_review_date.format("%Y-%m-%d"),
        state.interval_days,
        state.ease_factor,
        state.repetitions
    )
}

/// Write `state` into `text` as the annotation of card `id`.
///
/// An existing annotation directly below the card is replaced in place;
/// otherwise a new line is inserted right after the card's closing line,
/// using that line's terminator. Everything else is returned untouched.
/// `file` only labels errors.
pub fn apply_review_state(
    text: &str,
    file: &Path,
    id: &str,
    state: &ReviewState,
) -> DeckResult<String> {
    let parsed = parse_source(text, file);
    let card = parsed.card(id).ok_or_else(|| DeckError::CardMissing {
        id: id.to_string(),
        file: file.to_path_buf(),
    })?;
    let line = render(id, state);

    let mut out = String::with_capacity(text.len() + line.len() + 2);
    match card.source.annotation_span {
        Some(span) => {
            out.push_str(&text[..span.start]);
            out.push_str(&line);
            out.push_str(&text[span.end..]);
        }
        None => {
            let at = card.source.card_span.end;
            let head = &text[..at];
            out.push_str(head);
            if head.ends_with('\n') {
                out.push_str(&line);
                out.push_str(if head.ends_with("\r\n") { "\r\n" } else { "\n" });
            } else {
                out.push_str(line_ending(text));
                out.push_str(&line);
            }
            out.push_str(&text[at..]);
        }
    }
    Ok(out)
}

/// The terminator used by the first line of `text`, `\n` if there is none.
fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(pos) if text[..pos].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}
