use anyhow::Result;
use console::Term;

use crate::core::session::ConversionSession;

/// Clears the conversion history after confirmation. The clear itself
/// is unconditional once confirmed.
pub async fn run(session: &mut ConversionSession, yes: bool) -> Result<()> {
    if !yes {
        let term = Term::stderr();
        term.write_str("Clear the conversion history? [y/N] ")?;
        let answer = term.read_line()?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    session.clear_history().await;
    println!("History cleared");
    Ok(())
}
