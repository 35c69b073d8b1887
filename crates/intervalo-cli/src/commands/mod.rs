pub mod config;
pub mod history;
pub mod preset;
pub mod run;
pub mod settings;

use intervalo_core::storage::{self, SqliteStore};
use intervalo_core::Config;

pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the settings database named by config.toml.
pub fn open_store() -> CmdResult<SqliteStore> {
    let config = Config::load_or_default();
    Ok(storage::open_store(&config)?)
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_secs(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_clock() {
        assert_eq!(format_secs(0), "00:00");
        assert_eq!(format_secs(240), "04:00");
        assert_eq!(format_secs(3_725), "1:02:05");
    }
}
