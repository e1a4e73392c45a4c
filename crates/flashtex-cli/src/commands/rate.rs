//! The `flashtex rate` command.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use flashtex_core::Rating;

use super::{today_or, DeckArgs};

pub fn execute(args: &DeckArgs, id: String, rating: i64, today: Option<NaiveDate>) -> Result<()> {
    let rating = Rating::new(rating)?;
    let today = today_or(today);

    let mut deck = args.load()?.deck;
    let state = deck
        .review(&id, i64::from(rating.value()), today)
        .with_context(|| format!("failed to record review of {id}"))?;

    println!("Rated {id}: {rating}");
    println!(
        "Next review on {} (interval {}d, ease {}, {} repetition(s))",
        state.next_review_date(),
        state.interval_days,
        state.ease_factor,
        state.repetitions
    );
    Ok(())
}
