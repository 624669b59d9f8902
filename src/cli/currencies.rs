use anyhow::Result;
use comfy_table::Cell;

use super::ui;
use crate::core::session::ConversionSession;

/// Lists the supported currencies, sorted by code.
pub fn run(session: &ConversionSession) -> Result<()> {
    let currencies = session.currencies();
    if currencies.is_empty() {
        println!("No currencies available. Is the backend reachable?");
        return Ok(());
    }

    let mut codes: Vec<_> = currencies.keys().collect();
    codes.sort();

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for code in codes {
        table.add_row(vec![Cell::new(code), Cell::new(&currencies[code])]);
    }

    println!("{table}");
    Ok(())
}
