//! Operator console: line input, printed output, and yes/no confirmations.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Line-oriented operator interface driving the REPL.
pub trait Operator {
    /// Print `prompt` and read one line. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Show text to the operator.
    fn say(&mut self, text: &str);
}

/// Synchronous yes/no gate used by tools with side effects.
pub trait Confirmer {
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Accepts `y`/`yes` (case-insensitive); anything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Console bound to the process's stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl StdConsole {
    fn prompt_line(prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes()).context("write prompt")?;
        stdout.flush().context("flush prompt")?;
        drop(stdout);

        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read operator input")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Operator for StdConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        Self::prompt_line(prompt)
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}

impl Confirmer for StdConsole {
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = Self::prompt_line(&format!("{question} [y/N]: "))?;
        Ok(answer.as_deref().is_some_and(is_affirmative))
    }
}
