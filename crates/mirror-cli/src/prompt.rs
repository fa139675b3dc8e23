//! Interactive prompts for the pause extension
//!
//! Uses dialoguer when stdin is a terminal. Piped stdin is read one line
//! per confirmation, so an operator can feed confirmations through a pipe.

use std::io::{BufRead, IsTerminal};
use std::sync::Mutex;

use dialoguer::Input;
use mirror_core::Prompter;

/// Blocks on the terminal until the operator presses enter
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn wait_for_confirmation(&self, message: &str) -> mirror_core::Result<()> {
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map(|_| ())
            .map_err(|e| mirror_core::Error::Prompt(e.to_string()))
    }
}

/// Waits for one line of input per confirmation
pub struct LinePrompter<R> {
    input: Mutex<R>,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn wait_for_confirmation(&self, message: &str) -> mirror_core::Result<()> {
        eprintln!("{message}");
        let mut input = self
            .input
            .lock()
            .map_err(|_| mirror_core::Error::Prompt("input lock poisoned".to_string()))?;
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| mirror_core::Error::Prompt(e.to_string()))?;
        if read == 0 {
            tracing::warn!("Input closed, continuing without confirmation");
        }
        Ok(())
    }
}

/// The prompter for this process: dialoguer on a terminal, otherwise one
/// line from stdin per confirmation
pub fn for_current_terminal() -> Box<dyn Prompter> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        Box::new(TerminalPrompter)
    } else {
        Box::new(LinePrompter::new(stdin.lock()))
    }
}
