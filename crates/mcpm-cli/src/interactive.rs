//! Terminal confirmation prompts.
//!
//! Uses dialoguer when stdin is a terminal. Without a terminal every prompt
//! is declined so scripted runs never block; pass `--force` instead.

use std::io::{self, IsTerminal};

use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};

use mcpm_core::confirm::Confirmer;

pub struct TerminalConfirmer {
    theme: ColorfulTheme,
    interactive: bool,
}

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if !self.interactive {
            eprintln!(
                "{} {} (declined: not a terminal, use --force)",
                style("?").yellow(),
                prompt
            );
            tracing::debug!(prompt, "auto-declined confirmation");
            return false;
        }

        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "confirmation prompt failed");
                false
            })
    }
}
