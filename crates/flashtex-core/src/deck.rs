//! The deck repository.
//!
//! Aggregates the cards of several deck files into one collection keyed by ID
//! and routes state changes back to the file each card came from.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::annotation::apply_review_state;
use crate::error::{DeckError, DeckResult};
use crate::model::{CardRecord, ReviewState};
use crate::parser::{parse_file, parse_source, ParsedSource};
use crate::scheduler;
use crate::store;

/// All cards loaded from a set of deck files.
#[derive(Debug, Default)]
pub struct Deck {
    cards: Vec<CardRecord>,
    index: HashMap<String, usize>,
}

/// A successful load: the deck plus every problem found on the way.
#[derive(Debug)]
pub struct LoadReport {
    pub deck: Deck,
    pub errors: Vec<DeckError>,
}

/// Card counts for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub name: String,
    pub total: usize,
    pub due: usize,
}

impl Deck {
    /// Load every file in `paths`, in order.
    ///
    /// Unreadable files, malformed cards and duplicate IDs are collected in
    /// [`LoadReport::errors`]; for a duplicate the card seen first wins. The
    /// load only fails, with [`DeckError::EmptyDeck`], when no valid card is
    /// found at all.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> DeckResult<LoadReport> {
        let mut deck = Deck::default();
        let mut errors = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match parse_file(path) {
                Ok(parsed) => deck.absorb(parsed, &mut errors),
                Err(e) => errors.push(e),
            }
        }

        for e in &errors {
            tracing::warn!("{e}");
        }

        if deck.is_empty() {
            return Err(DeckError::EmptyDeck {
                files: paths.len(),
                errors,
            });
        }

        tracing::debug!(
            "loaded {} cards from {} file(s), {} problem(s)",
            deck.len(),
            paths.len(),
            errors.len()
        );
        Ok(LoadReport { deck, errors })
    }

    /// Build a deck from already parsed sources, in order. Unlike
    /// [`Deck::load`] an empty result is not an error.
    pub fn from_sources(sources: impl IntoIterator<Item = ParsedSource>) -> LoadReport {
        let mut deck = Deck::default();
        let mut errors = Vec::new();
        for parsed in sources {
            deck.absorb(parsed, &mut errors);
        }
        LoadReport { deck, errors }
    }

    fn absorb(&mut self, parsed: ParsedSource, errors: &mut Vec<DeckError>) {
        errors.extend(parsed.errors);
        for card in parsed.cards {
            if let Some(&idx) = self.index.get(&card.id) {
                let first = &self.cards[idx].source;
                errors.push(DeckError::DuplicateId {
                    id: card.id,
                    file: card.source.file,
                    line: card.source.line,
                    first_file: first.file.clone(),
                    first_line: first.line,
                });
                continue;
            }
            self.index.insert(card.id.clone(), self.cards.len());
            self.cards.push(card);
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards in load order.
    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    pub fn get(&self, id: &str) -> Option<&CardRecord> {
        self.index.get(id).map(|&idx| &self.cards[idx])
    }

    /// Like [`Deck::get`], but an unknown ID is an error.
    pub fn lookup(&self, id: &str) -> DeckResult<&CardRecord> {
        self.get(id)
            .ok_or_else(|| DeckError::UnknownCard(id.to_string()))
    }

    /// Cards never reviewed or whose interval has elapsed by `today`.
    pub fn due_cards(&self, today: NaiveDate) -> Vec<&CardRecord> {
        self.cards.iter().filter(|c| c.is_due(today)).collect()
    }

    pub fn cards_in_section(&self, section: &str) -> Vec<&CardRecord> {
        self.cards.iter().filter(|c| c.section == section).collect()
    }

    /// Distinct section names, sorted.
    pub fn sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cards.iter().map(|c| c.section.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Per-section totals, sorted by section name.
    pub fn section_summaries(&self, today: NaiveDate) -> Vec<SectionSummary> {
        let mut by_name: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for card in &self.cards {
            let entry = by_name.entry(card.section.as_str()).or_default();
            entry.0 += 1;
            if card.is_due(today) {
                entry.1 += 1;
            }
        }
        by_name
            .into_iter()
            .map(|(name, (total, due))| SectionSummary {
                name: name.to_string(),
                total,
                due,
            })
            .collect()
    }

    /// Files that contributed at least one card, in load order.
    pub fn source_files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = Vec::new();
        for card in &self.cards {
            let file = card.source.file.as_path();
            if !files.contains(&file) {
                files.push(file);
            }
        }
        files
    }

    /// Persist `state` for card `id` into its originating file.
    ///
    /// The file is re-read so edits made since the deck was loaded survive,
    /// patched, and atomically replaced. Committing a state the file already
    /// holds leaves the file untouched.
    pub fn commit(&mut self, id: &str, state: ReviewState) -> DeckResult<()> {
        let file: PathBuf = self.lookup(id)?.source.file.clone();

        let text = store::read_source(&file)?;
        let updated = apply_review_state(&text, &file, id, &state)?;
        if updated != text {
            store::write_atomic(&file, &updated)?;
            tracing::info!(
                "saved {id} to {}: next review {}",
                file.display(),
                state.next_review_date()
            );
        }

        self.refresh_file(&file, &updated);
        Ok(())
    }

    /// Rate card `id` and commit the resulting state. Returns the new state.
    ///
    /// An invalid rating fails before anything is written.
    pub fn review(&mut self, id: &str, rating: i64, today: NaiveDate) -> DeckResult<ReviewState> {
        let current = self.lookup(id)?.review_state;
        let next = scheduler::next_state(current.as_ref(), rating, today)?;
        self.commit(id, next)?;
        Ok(next)
    }

    /// Re-sync spans and states of the cards that live in `file`.
    fn refresh_file(&mut self, file: &Path, text: &str) {
        let parsed = parse_source(text, file);
        for fresh in parsed.cards {
            if let Some(&idx) = self.index.get(&fresh.id) {
                let card = &mut self.cards[idx];
                if card.source.file == file {
                    card.source = fresh.source;
                    card.review_state = fresh.review_state;
                }
            }
        }
    }
}
