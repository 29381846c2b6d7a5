use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Wardflow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// LAN port the ward terminals are configured against.
pub const DEFAULT_PORT: u16 = 3000;

/// Get the application data directory:
/// `$WARDFLOW_DATA_DIR`, or ~/Wardflow (user-visible on purpose, so the
/// unit can copy the database file for backups).
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("WARDFLOW_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Wardflow")
}

/// The SQLite file holding every record table.
pub fn db_path() -> PathBuf {
    app_data_dir().join("wardflow.db")
}

/// Address to serve on: `$WARDFLOW_ADDR` (host:port), falling back to
/// 0.0.0.0 on the default port so tablets reach it over the LAN.
pub fn bind_addr() -> SocketAddr {
    std::env::var("WARDFLOW_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
}

/// Tracing filter used when `RUST_LOG` is absent.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
