//! Terminal implementation of the `InputSource` port.

use anyhow::Result;

use crate::application::ports::InputSource;

/// Prompts on the controlling terminal with dialoguer.
///
/// Yields no answers when `non_interactive` is set or nobody is attached to
/// the terminal, so callers stop prompting instead of blocking.
pub struct TerminalInput {
    non_interactive: bool,
}

impl TerminalInput {
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }

    fn attended(&self) -> bool {
        !self.non_interactive && console::user_attended()
    }
}

impl InputSource for TerminalInput {
    fn ask(&self, prompt: &str) -> Result<Option<String>> {
        if !self.attended() {
            return Ok(None);
        }
        let answer: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(answer))
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.attended() {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
