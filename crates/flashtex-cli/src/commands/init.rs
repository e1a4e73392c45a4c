//! The `flashtex init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("flashtex.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("example_cards.tex"), EXAMPLE_DECK)?;

    println!("\nNext steps:");
    println!("  1. Add cards to example_cards.tex or create more *_cards.tex files");
    println!("  2. Run: flashtex validate");
    println!("  3. Run: flashtex list --due");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# flashtex configuration

# Directory holding the deck files.
deck_dir = "."

# Deck files are the files whose name ends with this.
file_suffix = "_cards.tex"

# Also search subdirectories of deck_dir.
recursive = false
"#;

const EXAMPLE_DECK: &str = r"\documentclass{article}
\usepackage{amsmath}
\begin{document}

\section{Algebra}

\begin{flashcard}{quadratic-formula}
  \Q{Roots of $ax^2 + bx + c = 0$?}
  \A{$x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}$}
\end{flashcard}

\begin{flashcard}{difference-of-squares}
  \Q{Factor $a^2 - b^2$.}
  \A{$(a - b)(a + b)$}
\end{flashcard}

\section{Calculus}

\begin{flashcard}{power-rule}
  \Qblock{
    What is $\frac{d}{dx} x^n$?
  }
  \Ablock{
    $n x^{n-1}$
  }
\end{flashcard}

\end{document}
";
