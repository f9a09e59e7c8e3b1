use dirs::data_dir;
use std::path::PathBuf;

const APP_DIR: &str = "meeting-scrape";

pub fn data_root() -> PathBuf {
    data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}
