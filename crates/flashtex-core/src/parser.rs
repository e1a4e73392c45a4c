//! Deck file parser.
//!
//! Splits a `*_cards.tex` file into an ordered, gap-free list of [`Block`]s and
//! extracts a [`CardRecord`] for every well-formed card. Anything that is not a
//! section heading, a card or an annotation is passed through as text, so the
//! blocks always reassemble into the original bytes.
//!
//! Recognised constructs, each at the start of a line:
//!
//! ```text
//! \section{Algebra}
//! \begin{flashcard}{quad-01}
//!   \Q{Solve $x^2 - 5x + 6 = 0$}
//!   \A{$x \in \{2, 3\}$}
//! \end{flashcard}
//! %@rep:quad-01:2026-01-02:6:2.50:2
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::annotation::{self, ANNOTATION_PREFIX};
use crate::error::{DeckError, DeckResult, ParseError, ParseErrorKind};
use crate::model::{CardRecord, SourceLocation, Span, DEFAULT_SECTION};
use crate::store;

/// Opens a card; followed by `{id}`.
pub const BEGIN_TAG: &str = "\\begin{flashcard}";
/// Closes a card.
pub const END_TAG: &str = "\\end{flashcard}";

/// What a [`Block`] holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Preamble, prose, comments, blank lines, unknown commands.
    Text,
    /// `\section{name}` or `\section*{name}`.
    Section { name: String },
    /// A terminated card with a usable ID (possibly a duplicate).
    Card { id: String },
    /// A `%@rep:` line.
    Annotation { id: String },
    /// A card that could not be parsed.
    Malformed,
}

/// A contiguous region of the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub span: Span,
    /// 1-based line on which the block starts.
    pub first_line: usize,
}

/// Everything extracted from one file.
#[derive(Debug, Default)]
pub struct ParsedSource {
    pub blocks: Vec<Block>,
    /// Cards in file order, duplicates and malformed cards excluded.
    pub cards: Vec<CardRecord>,
    /// Per-card and per-line problems, in file order.
    pub errors: Vec<DeckError>,
}

impl ParsedSource {
    /// Find a card by ID.
    pub fn card(&self, id: &str) -> Option<&CardRecord> {
        self.cards.iter().find(|c| c.id == id)
    }
}

/// Read and parse a deck file.
pub fn parse_file(path: &Path) -> DeckResult<ParsedSource> {
    let text = store::read_source(path)?;
    Ok(parse_source(&text, path))
}

/// Parse deck text. `file` is recorded in every card and error.
pub fn parse_source(text: &str, file: &Path) -> ParsedSource {
    let parsed = SourceParser::new(text, file).run();
    tracing::debug!(
        "parsed {}: {} cards, {} blocks, {} errors",
        file.display(),
        parsed.cards.len(),
        parsed.blocks.len(),
        parsed.errors.len()
    );
    parsed
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// Byte offset of the first character.
    start: usize,
    /// Line text without its terminator.
    content: &'a str,
    /// Byte offset just past the terminator.
    end: usize,
    /// 1-based.
    number: usize,
}

impl Line<'_> {
    fn indent(&self) -> usize {
        self.content.len() - self.content.trim_start().len()
    }
}

/// Byte order mark some editors put at the start of a file.
const BOM: char = '\u{feff}';

/// Split `text` into lines. A leading byte order mark is not part of the
/// first line.
fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let body = text.strip_prefix(BOM).unwrap_or(text);
    let mut start = text.len() - body.len();
    for (idx, raw) in body.split_inclusive('\n').enumerate() {
        let content = match raw.strip_suffix('\n') {
            Some(s) => s.strip_suffix('\r').unwrap_or(s),
            None => raw,
        };
        lines.push(Line {
            start,
            content,
            end: start + raw.len(),
            number: idx + 1,
        });
        start += raw.len();
    }
    lines
}

/// The card closed on the line just before the current one.
struct Pending {
    id: String,
    /// Index into `cards`, `None` if the card was excluded.
    card: Option<usize>,
}

struct SourceParser<'a> {
    text: &'a str,
    file: PathBuf,
    lines: Vec<Line<'a>>,
    out: ParsedSource,
    section: String,
    text_start: Option<(usize, usize)>,
    pending: Option<Pending>,
    first_seen: HashMap<String, usize>,
}

impl<'a> SourceParser<'a> {
    fn new(text: &'a str, file: &Path) -> Self {
        Self {
            text,
            file: file.to_path_buf(),
            lines: split_lines(text),
            out: ParsedSource::default(),
            section: DEFAULT_SECTION.to_string(),
            // a byte order mark opens the first text block
            text_start: text.starts_with(BOM).then_some((0, 1)),
            pending: None,
            first_seen: HashMap::new(),
        }
    }

    fn run(mut self) -> ParsedSource {
        let mut i = 0;
        while i < self.lines.len() {
            let line = self.lines[i];
            let trimmed = line.content.trim_start();

            if trimmed.starts_with(ANNOTATION_PREFIX) {
                self.scan_annotation(line);
                i += 1;
                continue;
            }
            self.pending = None;

            if trimmed.starts_with(BEGIN_TAG) {
                i = self.scan_card(i);
                continue;
            }

            if let Some(name) = section_name(trimmed) {
                let name = name.to_string();
                self.push_block(BlockKind::Section { name: name.clone() }, line.start, line.end, line.number);
                self.section = name;
            } else {
                self.push_text(line);
            }
            i += 1;
        }
        self.flush_text(self.text.len());
        self.out
    }

    fn error(&mut self, line: usize, kind: ParseErrorKind) {
        self.out
            .errors
            .push(ParseError::new(self.file.clone(), line, kind).into());
    }

    fn push_text(&mut self, line: Line<'_>) {
        if self.text_start.is_none() {
            self.text_start = Some((line.start, line.number));
        }
    }

    fn flush_text(&mut self, up_to: usize) {
        if let Some((start, first_line)) = self.text_start.take() {
            if up_to > start {
                self.out.blocks.push(Block {
                    kind: BlockKind::Text,
                    span: Span::new(start, up_to),
                    first_line,
                });
            }
        }
    }

    fn push_block(&mut self, kind: BlockKind, start: usize, end: usize, first_line: usize) {
        self.flush_text(start);
        self.out.blocks.push(Block {
            kind,
            span: Span::new(start, end),
            first_line,
        });
    }

    fn scan_annotation(&mut self, line: Line<'_>) {
        let body = line.content.trim_start();
        let span = Span::new(line.start + line.indent(), line.start + line.content.len());
        let pending = self.pending.take();

        let Some(raw) = annotation::split(body) else {
            self.push_block(
                BlockKind::Annotation { id: String::new() },
                line.start,
                line.end,
                line.number,
            );
            self.error(
                line.number,
                ParseErrorKind::MalformedAnnotation("missing card ID".into()),
            );
            return;
        };

        self.push_block(
            BlockKind::Annotation { id: raw.id.to_string() },
            line.start,
            line.end,
            line.number,
        );

        match pending {
            Some(p) if p.id == raw.id => {
                let Some(idx) = p.card else {
                    return;
                };
                self.out.cards[idx].source.annotation_span = Some(span);
                match annotation::decode_state(raw.fields) {
                    Ok(state) => self.out.cards[idx].review_state = state,
                    Err(reason) => {
                        self.error(line.number, ParseErrorKind::MalformedAnnotation(reason));
                    }
                }
            }
            _ => self.error(
                line.number,
                ParseErrorKind::OrphanedAnnotation(raw.id.to_string()),
            ),
        }
    }

    /// Scan the card opened on line `i`; returns the index of the next line
    /// to look at.
    fn scan_card(&mut self, i: usize) -> usize {
        let open = self.lines[i];
        let after_tag = open.indent() + BEGIN_TAG.len();
        let header = &open.content[after_tag..];
        let id = parse_card_id(header);

        let mut close = None;
        for j in i..self.lines.len() {
            let line = self.lines[j];
            if j > i && line.content.trim_start().starts_with(BEGIN_TAG) {
                break;
            }
            let from = if j == i { after_tag } else { 0 };
            if let Some(pos) = line.content[from..].find(END_TAG) {
                close = Some((j, from + pos));
                break;
            }
        }

        let Some((j, end_pos)) = close else {
            let name = id.as_ref().map(|(id, _)| id.clone()).unwrap_or_default();
            self.push_block(BlockKind::Malformed, open.start, open.end, open.number);
            self.error(open.number, ParseErrorKind::Unterminated(name));
            return i + 1;
        };

        let close_line = self.lines[j];
        let span = Span::new(open.start, close_line.end);
        let body_start = open.start + after_tag + id.as_ref().map_or(0, |(_, used)| *used);
        let body_end = close_line.start + end_pos;
        let text = self.text;
        let body = &text[body_start.min(body_end)..body_end];

        let id = match id {
            Ok((id, _)) => id,
            Err(kind) => {
                self.push_block(BlockKind::Malformed, span.start, span.end, open.number);
                self.error(open.number, kind);
                return j + 1;
            }
        };

        let question = find_payload(body, "Q");
        let answer = find_payload(body, "A");
        let (question, answer) = match (question, answer) {
            (Some(q), Some(a)) => (q.to_string(), a.to_string()),
            (None, _) => {
                self.reject_card(span, open.number, ParseErrorKind::MissingQuestion(id));
                return j + 1;
            }
            (_, None) => {
                self.reject_card(span, open.number, ParseErrorKind::MissingAnswer(id));
                return j + 1;
            }
        };

        self.push_block(BlockKind::Card { id: id.clone() }, span.start, span.end, open.number);

        if let Some(&first_line) = self.first_seen.get(&id) {
            self.out.errors.push(DeckError::DuplicateId {
                id: id.clone(),
                file: self.file.clone(),
                line: open.number,
                first_file: self.file.clone(),
                first_line,
            });
            self.pending = Some(Pending { id, card: None });
            return j + 1;
        }

        self.first_seen.insert(id.clone(), open.number);
        self.out.cards.push(CardRecord {
            id: id.clone(),
            question,
            answer,
            section: self.section.clone(),
            source: SourceLocation {
                file: self.file.clone(),
                line: open.number,
                card_span: span,
                annotation_span: None,
            },
            review_state: None,
        });
        self.pending = Some(Pending {
            id,
            card: Some(self.out.cards.len() - 1),
        });
        j + 1
    }

    fn reject_card(&mut self, span: Span, line: usize, kind: ParseErrorKind) {
        let id = match &kind {
            ParseErrorKind::MissingQuestion(id) | ParseErrorKind::MissingAnswer(id) => id.clone(),
            _ => String::new(),
        };
        self.push_block(BlockKind::Malformed, span.start, span.end, line);
        self.error(line, kind);
        self.pending = Some(Pending { id, card: None });
    }
}

/// `{id}` right after the begin tag. Returns the ID and the number of header
/// bytes consumed.
fn parse_card_id(header: &str) -> Result<(String, usize), ParseErrorKind> {
    let rest = header.trim_start();
    let skipped = header.len() - rest.len();
    if !rest.starts_with('{') {
        return Err(ParseErrorKind::MissingId);
    }
    let (inner, used) = braced(rest).ok_or(ParseErrorKind::MissingId)?;
    let id = inner.trim();
    if id.is_empty() {
        return Err(ParseErrorKind::MissingId);
    }
    if id.chars().any(|c| c.is_whitespace() || matches!(c, ':' | '{' | '}')) {
        return Err(ParseErrorKind::InvalidId(id.to_string()));
    }
    Ok((id.to_string(), skipped + used))
}

/// Section name from a `\section{...}` or `\section*{...}` line.
fn section_name(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("\\section")?;
    let rest = rest.strip_prefix('*').unwrap_or(rest).trim_start();
    if !rest.starts_with('{') {
        return None;
    }
    let (inner, _) = braced(rest)?;
    let name = inner.trim();
    (!name.is_empty()).then_some(name)
}

/// First `\<command>{...}` or `\<command>block{...}` payload in `body`,
/// trimmed. Empty payloads count as missing.
fn find_payload<'b>(body: &'b str, command: &str) -> Option<&'b str> {
    let needle = format!("\\{command}");
    let mut search = 0;
    while let Some(pos) = body[search..].find(&needle) {
        let at = search + pos;
        search = at + needle.len();
        // `\\Q` is a line break followed by plain text
        if body[..at].ends_with('\\') {
            continue;
        }
        let rest = &body[search..];
        let rest = rest.strip_prefix("block").unwrap_or(rest).trim_start();
        if rest.starts_with('{') {
            return braced(rest)
                .map(|(inner, _)| inner.trim())
                .filter(|payload| !payload.is_empty());
        }
    }
    None
}

/// Content of the balanced `{...}` group at the start of `s`, and the number
/// of bytes the group occupies. Backslash escapes do not count toward nesting.
fn braced(s: &str) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut chars = s.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some((&s[1..idx], idx + 1));
                }
            }
            _ => {}
        }
    }
    None
}
