//! Stdin-backed confirmation gate for the CLI.

use crate::cli::Output;
use crate::error::Result;
use crate::reconcile::ConfirmationGate;
use async_trait::async_trait;
use console::style;
use std::io::{self, Write};

/// Confirmation gate that prompts the terminal user.
pub struct StdinGate;

#[async_trait]
impl ConfirmationGate for StdinGate {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        Output::warning(prompt);
        print!("{} ", style("Continue? [y/N]").bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Gate that approves everything, for non-interactive runs (`--yes`).
pub struct AssumeYes;

#[async_trait]
impl ConfirmationGate for AssumeYes {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        Output::info(&format!("{prompt} (auto-confirmed)"));
        Ok(true)
    }
}
