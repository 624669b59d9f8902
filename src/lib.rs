pub mod cli;
pub mod config;
pub mod core;
pub mod log;
pub mod providers;
pub mod store;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::core::provider::HistoryStore;
use crate::core::session::ConversionSession;
use crate::providers::rest::RestProvider;
use crate::store::disk::DiskStore;
use crate::store::memory::MemoryStore;

pub enum AppCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    History,
    Currencies,
    ClearHistory {
        yes: bool,
    },
    Theme {
        mode: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Theme handling only touches the local store, no session needed.
    if let AppCommand::Theme { mode } = &command {
        return cli::theme::run(&config, mode.as_deref());
    }

    let provider = Arc::new(RestProvider::new(&config.provider.base_url));
    let store: Arc<dyn HistoryStore> = match config.history {
        config::HistoryBackend::Remote => provider.clone(),
        config::HistoryBackend::Local => {
            match config.default_data_path().and_then(|path| DiskStore::open(&path)) {
                Ok(disk) => Arc::new(disk),
                Err(e) => {
                    warn!(error = %e, "Local store unavailable, history will not survive this session");
                    Arc::new(MemoryStore::new())
                }
            }
        }
    };

    let mut session = ConversionSession::start(provider, store).await;

    match command {
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&mut session, &amount, &from, &to).await
        }
        AppCommand::History => cli::history::run(&session),
        AppCommand::Currencies => cli::currencies::run(&session),
        AppCommand::ClearHistory { yes } => cli::clear::run(&mut session, yes).await,
        AppCommand::Theme { .. } => unreachable!("Theme is handled before session start"),
    }
}
