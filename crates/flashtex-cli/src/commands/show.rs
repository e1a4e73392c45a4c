//! The `flashtex show` command.

use anyhow::Result;

use super::DeckArgs;

pub fn execute(args: &DeckArgs, id: String) -> Result<()> {
    let report = args.load()?;
    let card = report.deck.lookup(&id)?;

    println!("{} [{}]", card.id, card.section);
    println!("  source:   {}:{}", card.source.file.display(), card.source.line);
    println!("  question: {}", card.question);
    println!("  answer:   {}", card.answer);
    match card.review_state {
        Some(state) => {
            println!(
                "  reviewed: {} (interval {}d, ease {}, {} repetition(s))",
                state.last_review_date, state.interval_days, state.ease_factor, state.repetitions
            );
            println!("  next:     {}", state.next_review_date());
        }
        None => println!("  never reviewed"),
    }
    Ok(())
}
