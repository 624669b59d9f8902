use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxc::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxc::AppCommand {
    fn from(cmd: Commands) -> fxc::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                fxc::AppCommand::Convert { amount, from, to }
            }
            Commands::History => fxc::AppCommand::History,
            Commands::Currencies => fxc::AppCommand::Currencies,
            Commands::ClearHistory { yes } => fxc::AppCommand::ClearHistory { yes },
            Commands::Theme { mode } => fxc::AppCommand::Theme { mode },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in source-currency units
        amount: String,
        /// Source currency code, e.g. USD
        from: String,
        /// Target currency code, e.g. EUR
        to: String,
    },
    /// Show the most recent conversions
    History,
    /// List supported currencies
    Currencies,
    /// Clear the conversion history
    ClearHistory {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set the theme preference
    Theme {
        /// "dark" or "light"; omit to show the current preference
        mode: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxc::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
provider:
  base_url: "http://127.0.0.1:5000"

# Where the conversion history lives: "remote" (the backend keeps it)
# or "local" (a snapshot in the app data directory).
history: remote
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
