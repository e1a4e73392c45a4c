//! The `flashtex validate` command.

use anyhow::Result;

use flashtex_core::parser::parse_file;
use flashtex_core::Deck;

use super::DeckArgs;

pub fn execute(args: &DeckArgs) -> Result<()> {
    let files = args.files()?;

    let mut errors = Vec::new();
    let mut sources = Vec::new();
    let mut counts = Vec::new();
    for path in &files {
        match parse_file(path) {
            Ok(parsed) => {
                counts.push(Some(parsed.cards.len()));
                sources.push(parsed);
            }
            Err(e) => {
                counts.push(None);
                errors.push(e);
            }
        }
    }

    let report = Deck::from_sources(sources);
    errors.extend(report.errors);

    for (path, count) in files.iter().zip(&counts) {
        match count {
            Some(n) => println!("{}: {n} card(s)", path.display()),
            None => println!("{}: unreadable", path.display()),
        }
        for e in errors.iter().filter(|e| e.file() == Some(path.as_path())) {
            println!("  ERROR: {e}");
        }
    }
    for e in errors.iter().filter(|e| e.file().is_none()) {
        println!("  ERROR: {e}");
    }

    let deck = &report.deck;
    println!(
        "\n{} card(s) in {} section(s) across {} file(s).",
        deck.len(),
        deck.sections().len(),
        files.len()
    );

    if deck.is_empty() {
        anyhow::bail!("no valid cards found");
    }
    if !errors.is_empty() {
        anyhow::bail!("{} problem(s) found", errors.len());
    }
    println!("All deck files valid.");
    Ok(())
}
