use anyhow::Result;

use crate::config::AppConfig;
use crate::store::disk::DiskStore;
use crate::store::Theme;

/// Shows or sets the persisted theme preference.
pub fn run(config: &AppConfig, mode: Option<&str>) -> Result<()> {
    let data_path = config.default_data_path()?;
    let store = DiskStore::open(&data_path)?;

    match mode {
        Some(raw) => {
            let theme: Theme = raw.parse()?;
            store.set_theme(theme)?;
            println!("Theme set to {theme}");
        }
        None => println!("{}", store.theme()),
    }
    Ok(())
}
