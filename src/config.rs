use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medbook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "medbook=info,tower_http=warn".to_string()
}

/// Get the application data directory
/// ~/Medbook/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medbook")
}

/// Database file path. MEDBOOK_DB overrides the default location.
pub fn database_path() -> PathBuf {
    match std::env::var("MEDBOOK_DB") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("medbook.db"),
    }
}

/// Listen address. MEDBOOK_ADDR overrides the default loopback binding.
pub fn bind_addr() -> SocketAddr {
    std::env::var("MEDBOOK_ADDR")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)))
}
