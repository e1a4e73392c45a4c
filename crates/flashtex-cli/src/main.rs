//! flashtex CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

use commands::DeckArgs;

#[derive(Parser)]
#[command(
    name = "flashtex",
    version,
    about = "LaTeX flashcards with SM-2 spaced repetition"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Deck directory (overrides `deck_dir` from the config)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and an example deck file
    Init,

    /// Check every deck file and report all problems
    Validate,

    /// List cards
    List {
        /// Only cards in this section
        #[arg(long)]
        section: Option<String>,

        /// Only cards that are due
        #[arg(long)]
        due: bool,

        /// Date to evaluate due-ness against (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show card and due counts per section
    Sections {
        /// Date to evaluate due-ness against (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Print a single card
    Show {
        /// Card ID
        id: String,
    },

    /// Record a rating for a card and save the new schedule
    Rate {
        /// Card ID
        id: String,

        /// Recall quality, 1 (forgot) to 5 (perfect)
        #[arg(long, allow_negative_numbers = true)]
        rating: i64,

        /// Review date (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flashtex_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let deck = DeckArgs {
        config: cli.config,
        dir: cli.dir,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate => commands::validate::execute(&deck),
        Commands::List {
            section,
            due,
            today,
            format,
        } => commands::list::execute(&deck, section, due, today, format),
        Commands::Sections { today } => commands::sections::execute(&deck, today),
        Commands::Show { id } => commands::show::execute(&deck, id),
        Commands::Rate { id, rating, today } => commands::rate::execute(&deck, id, rating, today),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
