//! Terminal prompter
//!
//! Line-based [`Prompter`] over any reader/writer pair; the binary uses
//! stdin and stdout.

use std::io::{self, BufRead, Stdout, Write};

use crossterm::style::Stylize;

use crate::core::wizard::Prompter;
use crate::error::ConfigError;

/// [`Prompter`] reading answers line by line
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, Stdout> {
    /// Prompter on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask `prompt`; `None` at end of input
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>, ConfigError> {
        write!(self.output, "{prompt}: ").map_err(prompt_error)?;
        self.output.flush().map_err(prompt_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(prompt_error)?;
        if read == 0 {
            writeln!(self.output).map_err(prompt_error)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(
        &mut self,
        question: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        Ok(self.read_answer(question)?.map(|answer| {
            if answer.trim().is_empty() {
                default.unwrap_or_default().to_string()
            } else {
                answer
            }
        }))
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>, ConfigError> {
        let choices = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.read_answer(&format!("{question} {choices}"))? else {
                return Ok(None);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.notice("Error: invalid input"),
            }
        }
    }

    fn notice(&mut self, message: &str) {
        let styled = if message.starts_with("Error") {
            message.red().to_string()
        } else {
            message.cyan().to_string()
        };
        // A broken terminal surfaces on the next read
        let _ = writeln!(self.output, "{styled}");
    }
}

fn prompt_error(e: io::Error) -> ConfigError {
    ConfigError::Prompt {
        error: e.to_string(),
    }
}
