use anyhow::Result;
use comfy_table::Cell;

use super::ui;
use crate::core::session::{ConversionSession, HISTORY_DISPLAY_LIMIT};

/// Renders the most recent conversions, newest first.
pub fn run(session: &ConversionSession) -> Result<()> {
    if session.history().len() == 0 {
        println!("No conversions yet. Start converting!");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("When"),
        ui::header_cell("Conversion"),
        ui::header_cell("Rate"),
    ]);

    for record in session.history().take(HISTORY_DISPLAY_LIMIT) {
        table.add_row(vec![
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(format!(
                "{:.2} {} -> {} {}",
                record.amount, record.from_currency, record.converted_amount, record.to_currency
            )),
            ui::numeric_cell(&format!("{:.4}", record.exchange_rate)),
        ]);
    }

    println!("{table}");
    Ok(())
}
