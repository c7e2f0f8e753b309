//! Terminal presenter and confirmation prompt

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use trolley::{alerts::Alert, engine::Confirm, session::Presenter, snapshot::CartSnapshot};

/// Prints alerts to stdout. The cart table is written once the session settles.
#[derive(Debug, Default)]
pub(crate) struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn render(&mut self, snapshot: &CartSnapshot) {
        debug!(
            lines = snapshot.len(),
            items = snapshot.items_count(),
            total = %snapshot.grand_total(),
            "rendered cart"
        );
    }

    fn alert(&mut self, alert: &Alert) {
        if let Err(error) = writeln!(io::stdout().lock(), "{alert}") {
            warn!(%error, "failed to write alert");
        }
    }
}

/// How destructive operations are confirmed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TerminalConfirm {
    /// Ask on stderr and read the answer from stdin.
    Prompt,

    /// Treat every prompt as accepted.
    AssumeYes,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match self {
            TerminalConfirm::AssumeYes => true,
            TerminalConfirm::Prompt => ask(prompt).unwrap_or_else(|error| {
                warn!(%error, "failed to read confirmation");
                false
            }),
        }
    }
}

fn ask(prompt: &str) -> io::Result<bool> {
    let mut stderr = io::stderr().lock();

    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
