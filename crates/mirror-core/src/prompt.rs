//! Interactive confirmation

use crate::Result;

/// Asks the operator to confirm before the run continues
pub trait Prompter {
    /// Show `message` and block until the operator confirms
    fn wait_for_confirmation(&self, message: &str) -> Result<()>;
}

/// Prompter for unattended runs: logs the message and continues at once
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoContinue;

impl Prompter for AutoContinue {
    fn wait_for_confirmation(&self, message: &str) -> Result<()> {
        tracing::warn!("{message} (non-interactive, continuing)");
        Ok(())
    }
}
