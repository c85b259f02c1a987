use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_host: String,
    pub bind_port: u16,
    /// Completed entries older than this many hours are eligible for cleanup.
    pub retention_hours: i64,
    /// Seed the default doctor roster at startup when the store is empty.
    pub seed_doctors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            bind_port: env::var("BIND_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("BIND_PORT not set or invalid, using 3000");
                    3000
                }),
            retention_hours: env::var("QUEUE_RETENTION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("QUEUE_RETENTION_HOURS not set or invalid, using 24");
                    24
                }),
            seed_doctors: env::var("SEED_DOCTORS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3000,
            retention_hours: 24,
            seed_doctors: true,
        }
    }
}
