use std::path::PathBuf;

/// Get the watcher data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("NEPSEWATCH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("nepsewatch_data"))
}
