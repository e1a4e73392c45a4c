//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ALGEBRA: &str = r"\section{Algebra}
\begin{flashcard}{alg-1}
\Q{$x + 1 = 2$}
\A{$x = 1$}
\end{flashcard}
%@rep:alg-1:2026-01-01:6:2.50:2

\begin{flashcard}{alg-2}
\Q{$2x = 4$}
\A{$x = 2$}
\end{flashcard}
";

const CALCULUS: &str = r"\begin{flashcard}{calc-1}
\Q{$\int 1\,dx$}
\A{$x + C$}
\end{flashcard}
";

/// A command isolated from the caller's config and environment.
fn flashtex(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("flashtex").unwrap();
    cmd.env("HOME", home)
        .env_remove("FLASHTEX_DECK_DIR")
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

fn deck_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("algebra_cards.tex"), ALGEBRA).unwrap();
    std::fs::write(dir.path().join("calculus_cards.tex"), CALCULUS).unwrap();
    std::fs::write(dir.path().join("notes.tex"), "\\begin{flashcard}{broken}\n").unwrap();
    dir
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    flashtex(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("spaced repetition"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    flashtex(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flashtex"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    flashtex(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created flashtex.toml"))
        .stdout(predicate::str::contains("Created example_cards.tex"));

    assert!(dir.path().join("flashtex.toml").exists());
    assert!(dir.path().join("example_cards.tex").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("flashtex.toml"), "recursive = true\n").unwrap();

    flashtex(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("flashtex.toml already exists"));

    assert_eq!(
        std::fs::read_to_string(dir.path().join("flashtex.toml")).unwrap(),
        "recursive = true\n"
    );
}

#[test]
fn init_output_validates() {
    let dir = TempDir::new().unwrap();
    flashtex(dir.path()).arg("init").assert().success();

    flashtex(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 card(s) in 2 section(s) across 1 file(s)"))
        .stdout(predicate::str::contains("All deck files valid"));
}

#[test]
fn validate_clean_deck() {
    let dir = deck_dir();
    flashtex(dir.path())
        .arg("validate")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("algebra_cards.tex: 2 card(s)"))
        .stdout(predicate::str::contains("calculus_cards.tex: 1 card(s)"))
        .stdout(predicate::str::contains("notes.tex").not());
}

#[test]
fn validate_reports_every_problem() {
    let dir = deck_dir();
    std::fs::write(
        dir.path().join("extra_cards.tex"),
        "\\begin{flashcard}{alg-2}\n\\Q{again}\n\\A{dup}\n\\end{flashcard}\n\
\\begin{flashcard}{lonely}\n\\Q{no answer}\n\\end{flashcard}\n",
    )
    .unwrap();

    flashtex(dir.path())
        .arg("validate")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("duplicate card ID `alg-2`"))
        .stdout(predicate::str::contains("card `lonely` has no answer"))
        .stderr(predicate::str::contains("2 problem(s) found"));
}

#[test]
fn validate_lists_errors_under_their_file() {
    let dir = deck_dir();
    std::fs::write(
        dir.path().join("broken_cards.tex"),
        "\\begin{flashcard}{lonely}\n\\Q{no answer}\n\\end{flashcard}\n",
    )
    .unwrap();

    let output = flashtex(dir.path()).arg("validate").output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let header = stdout.find("broken_cards.tex: 0 card(s)").unwrap();
    let error = stdout.find("card `lonely` has no answer").unwrap();
    let next_file = stdout.find("calculus_cards.tex: 1 card(s)").unwrap();
    assert!(header < error && error < next_file, "{stdout}");
}

#[test]
fn validate_accepts_decks_with_unreviewed_annotations() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("saved_cards.tex"),
        "\\begin{flashcard}{fresh}\n\\Q{q}\n\\A{a}\n\\end{flashcard}\n%@rep:fresh:none:1:2.50:0\n\
\\begin{flashcard}{old}\n\\Q{q}\n\\A{a}\n\\end{flashcard}\n%@rep:old:2026-01-02:6:2.50\n",
    )
    .unwrap();

    flashtex(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All deck files valid"));

    flashtex(dir.path())
        .args(["rate", "fresh", "--rating", "5", "--today", "2026-01-01"])
        .assert()
        .success();
    let text = std::fs::read_to_string(dir.path().join("saved_cards.tex")).unwrap();
    assert!(text.contains("%@rep:fresh:2026-01-01:1:2.60:1\n"));
    assert!(!text.contains("none"));
}

#[test]
fn validate_without_deck_files() {
    let dir = TempDir::new().unwrap();
    flashtex(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no deck files matching *_cards.tex"));
}

#[test]
fn list_due_cards() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["list", "--due", "--today", "2026-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alg-2"))
        .stdout(predicate::str::contains("calc-1"))
        .stdout(predicate::str::contains("alg-1").not())
        .stdout(predicate::str::contains("2 card(s)"));
}

#[test]
fn list_by_section() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["list", "--section", "General"])
        .assert()
        .success()
        .stdout(predicate::str::contains("calc-1"))
        .stdout(predicate::str::contains("alg-2").not());
}

#[test]
fn list_due_within_section() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["list", "--section", "Algebra", "--due", "--today", "2026-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alg-2"))
        .stdout(predicate::str::contains("alg-1").not())
        .stdout(predicate::str::contains("calc-1").not())
        .stdout(predicate::str::contains("1 card(s)"));
}

#[test]
fn list_json() {
    let dir = deck_dir();
    let output = flashtex(dir.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let cards: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0]["id"], "alg-1");
    assert_eq!(cards[0]["review_state"]["interval_days"], 6);
    assert_eq!(cards[0]["review_state"]["ease_factor"], 2.5);
    assert!(cards[1]["review_state"].is_null());
}

#[test]
fn list_rejects_unknown_format() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["list", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn sections_summary() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["sections", "--today", "2026-01-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Algebra"))
        .stdout(predicate::str::contains("General"))
        .stdout(predicate::str::contains("2 card(s) due on 2026-01-06"));
}

#[test]
fn show_card() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["show", "alg-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("question: $x + 1 = 2$"))
        .stdout(predicate::str::contains("next:     2026-01-07"));
}

#[test]
fn show_unknown_card() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown card: nope"));
}

#[test]
fn rate_updates_existing_annotation() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["rate", "alg-1", "--rating", "4", "--today", "2026-01-07"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rated alg-1: 4 (good)"))
        .stdout(predicate::str::contains("Next review on 2026-01-22"));

    let text = std::fs::read_to_string(dir.path().join("algebra_cards.tex")).unwrap();
    assert_eq!(
        text,
        ALGEBRA.replace(
            "%@rep:alg-1:2026-01-01:6:2.50:2",
            "%@rep:alg-1:2026-01-07:15:2.50:3"
        )
    );
}

#[test]
fn rate_new_card_appends_annotation() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["rate", "calc-1", "--rating", "5", "--today", "2026-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next review on 2026-01-02"));

    let text = std::fs::read_to_string(dir.path().join("calculus_cards.tex")).unwrap();
    assert_eq!(text, format!("{CALCULUS}%@rep:calc-1:2026-01-01:1:2.60:1\n"));

    // the other file is left alone
    assert_eq!(
        std::fs::read_to_string(dir.path().join("algebra_cards.tex")).unwrap(),
        ALGEBRA
    );
}

#[test]
fn rate_rejects_out_of_range() {
    let dir = deck_dir();
    for bad in ["0", "6", "-1"] {
        flashtex(dir.path())
            .args(["rate", "alg-1", "--rating", bad])
            .assert()
            .failure()
            .stderr(predicate::str::contains(format!("invalid rating {bad}")));
    }
    assert_eq!(
        std::fs::read_to_string(dir.path().join("algebra_cards.tex")).unwrap(),
        ALGEBRA
    );
}

#[test]
fn rate_unknown_card() {
    let dir = deck_dir();
    flashtex(dir.path())
        .args(["rate", "nope", "--rating", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown card: nope"));
}

#[test]
fn config_file_and_env_override() {
    let decks = deck_dir();
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(
        &config,
        format!("deck_dir = {:?}\n", decks.path().to_str().unwrap()),
    )
    .unwrap();

    flashtex(home.path())
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 card(s)"));

    flashtex(home.path())
        .env("FLASHTEX_DECK_DIR", decks.path())
        .args(["show", "calc-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("calc-1 [General]"));
}

#[test]
fn missing_config_file() {
    let dir = TempDir::new().unwrap();
    flashtex(dir.path())
        .args(["--config", "nope.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
