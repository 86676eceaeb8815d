//! Terminal prompts for confirming and choosing a commit message.

use std::io::{self, BufRead, BufReader, IsTerminal, Write};

use anyhow::Result;

/// Label of the list entry that requests fresh candidates.
pub const REGENERATE_LABEL: &str = "♻️ Regenerate Commit Messages";

/// Outcome of the list selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Commit this message.
    Commit(String),
    /// Generate a new set of candidates.
    Regenerate,
    /// Quit without committing.
    Abort,
}

/// Line-oriented prompt source.
///
/// Holds the input reader and whether it is an interactive terminal.
/// Non-interactive input answers every question negatively.
pub struct Terminal {
    is_terminal: bool,
    reader: Box<dyn BufRead + Send>,
}

impl Terminal {
    /// Creates a terminal reading from `reader`.
    pub fn new(is_terminal: bool, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            is_terminal,
            reader,
        }
    }

    /// Terminal backed by the process's standard input.
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        Self::new(stdin.is_terminal(), Box::new(BufReader::new(stdin)))
    }

    /// Reads one trimmed line; `None` when input is closed.
    fn read_answer(&mut self) -> Result<Option<String>> {
        io::stdout().flush()?;
        let mut input = String::new();
        if self.reader.read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_lowercase()))
    }

    /// Asks a yes/no question; an empty answer picks `default`.
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if !self.is_terminal {
            eprintln!("warning: stdin is not interactive, answering no (use --force or --message-only)");
            return Ok(false);
        }

        loop {
            print!("{question} {} ", if default { "[Y/n]" } else { "[y/N]" });
            let Some(answer) = self.read_answer()? else {
                eprintln!("warning: stdin closed, answering no");
                return Ok(false);
            };
            match answer.as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                "" => return Ok(default),
                _ => println!("Please answer 'y' or 'n'."),
            }
        }
    }

    /// Shows numbered candidates plus a regenerate entry and reads a choice.
    ///
    /// `q` quits. Closed or non-interactive input aborts.
    pub fn select(&mut self, candidates: &[String]) -> Result<Selection> {
        if !self.is_terminal {
            eprintln!("warning: stdin is not interactive, cannot choose a message (use --force or --message-only)");
            return Ok(Selection::Abort);
        }

        let regenerate = candidates.len() + 1;
        println!("\nPick a commit message:");
        for (i, candidate) in candidates.iter().enumerate() {
            println!("  {}. {candidate}", i + 1);
        }
        println!("  {regenerate}. {REGENERATE_LABEL}");

        loop {
            print!("❓ Select [1-{regenerate}] or q to quit: ");
            let Some(answer) = self.read_answer()? else {
                eprintln!("warning: stdin closed, aborting");
                return Ok(Selection::Abort);
            };
            if answer == "q" || answer == "quit" {
                return Ok(Selection::Abort);
            }
            match answer.parse::<usize>() {
                Ok(n) if n == regenerate => return Ok(Selection::Regenerate),
                Ok(n) if (1..regenerate).contains(&n) => {
                    return Ok(Selection::Commit(candidates[n - 1].clone()));
                }
                _ => println!("Invalid choice. Enter a number between 1 and {regenerate}, or q."),
            }
        }
    }
}
