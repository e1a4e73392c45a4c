//! The `flashtex sections` command.

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use super::{today_or, DeckArgs};

pub fn execute(args: &DeckArgs, today: Option<NaiveDate>) -> Result<()> {
    let today = today_or(today);
    let report = args.load()?;
    let summaries = report.deck.section_summaries(today);

    let mut table = Table::new();
    table.set_header(vec!["Section", "Cards", "Due"]);
    for s in &summaries {
        table.add_row(vec![Cell::new(&s.name), Cell::new(s.total), Cell::new(s.due)]);
    }

    println!("{table}");
    let due: usize = summaries.iter().map(|s| s.due).sum();
    println!("{} card(s) due on {today}", due);
    Ok(())
}
