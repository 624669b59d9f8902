pub mod disk;
pub mod memory;

use std::fmt;
use std::str::FromStr;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Persisted display preference. Owned by the view layer; it lives here
/// because it shares the keyspace with the history snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("Unknown theme: {other} (expected \"dark\" or \"light\")"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}
