use anyhow::Result;

use super::ui;
use crate::core::session::ConversionSession;

/// Runs one conversion and renders the result panel. The spinner covers
/// the only suspension point; no second conversion can start while it
/// is pending.
pub async fn run(
    session: &mut ConversionSession,
    amount: &str,
    from: &str,
    to: &str,
) -> Result<()> {
    let spinner = ui::new_spinner("Converting...");
    let result = session.convert(amount, from, to).await;
    spinner.finish_and_clear();

    let record = result?;

    println!(
        "{:.2} {} = {} {}",
        record.amount,
        record.from_currency,
        ui::style_text(&record.converted_amount.to_string(), ui::StyleType::Value),
        record.to_currency
    );
    println!(
        "1 {} = {:.6} {}",
        record.from_currency, record.exchange_rate, record.to_currency
    );
    println!(
        "{}",
        ui::style_text(record.source.describe(), ui::StyleType::Subtle)
    );

    Ok(())
}
