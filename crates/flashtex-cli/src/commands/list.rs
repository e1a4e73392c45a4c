//! The `flashtex list` command.

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use flashtex_core::CardRecord;

use super::{one_line, today_or, DeckArgs};

pub fn execute(
    args: &DeckArgs,
    section: Option<String>,
    due_only: bool,
    today: Option<NaiveDate>,
    format: String,
) -> Result<()> {
    if !matches!(format.as_str(), "text" | "json") {
        anyhow::bail!("unknown format: {format} (expected text or json)");
    }

    let today = today_or(today);
    let report = args.load()?;
    let deck = &report.deck;
    let mut cards: Vec<&CardRecord> = match section.as_deref() {
        Some(name) => deck.cards_in_section(name),
        None if due_only => deck.due_cards(today),
        None => deck.cards().iter().collect(),
    };
    if due_only && section.is_some() {
        cards.retain(|c| c.is_due(today));
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("No matching cards.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Section", "Question", "Due", "Next review", "Interval", "Ease", "Reps",
    ]);
    for card in &cards {
        let (next, interval, ease, reps) = match card.review_state {
            Some(state) => (
                state.next_review_date().to_string(),
                format!("{}d", state.interval_days),
                state.ease_factor.to_string(),
                state.repetitions.to_string(),
            ),
            None => ("new".into(), "-".into(), "-".into(), "0".into()),
        };
        table.add_row(vec![
            Cell::new(&card.id),
            Cell::new(&card.section),
            Cell::new(one_line(&card.question, 48)),
            Cell::new(if card.is_due(today) { "yes" } else { "no" }),
            Cell::new(next),
            Cell::new(interval),
            Cell::new(ease),
            Cell::new(reps),
        ]);
    }

    println!("{table}");
    println!("{} card(s)", cards.len());
    Ok(())
}
