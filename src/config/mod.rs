//! Configuration module for Warden.
//!
//! Loads configuration from environment variables. Required values that are
//! missing abort startup; moderation tunables fall back to sane defaults.

use std::env;

/// Bot running mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Global admin user IDs (comma-separated).
    /// These users pass every admin check in every tenant.
    pub global_admin_ids: Vec<u64>,

    // Moderation defaults applied to newly created tenants / runtime limits
    pub default_max_warnings: u32,
    pub flood_limit: u32,
    pub flood_window_secs: u64,
    pub verification_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set or malformed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = env::var("BOT_MODE")
            .unwrap_or_else(|_| "polling".to_string())
            .to_lowercase();

        let bot_mode = match bot_mode.as_str() {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = env::var("WEBHOOK_URL").ok();

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = env::var("WEBHOOK_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8443);

        let global_admin_ids = env::var("GLOBAL_ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        let default_max_warnings = env_or("DEFAULT_MAX_WARNINGS", 3);
        let flood_limit = env_or("FLOOD_LIMIT", 5);
        let flood_window_secs = env_or("FLOOD_TIME", 10);
        let verification_timeout_secs = env_or("VERIFICATION_TIMEOUT", 120);

        assert!(default_max_warnings >= 1, "DEFAULT_MAX_WARNINGS must be at least 1");
        assert!(flood_limit >= 1, "FLOOD_LIMIT must be at least 1");
        assert!(flood_window_secs >= 1, "FLOOD_TIME must be at least 1");

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: env::var("WEBHOOK_SECRET").ok(),
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "warden".to_string()),
            global_admin_ids,
            default_max_warnings,
            flood_limit,
            flood_window_secs,
            verification_timeout_secs,
        }
    }
}

/// Parse an env var into any FromStr type, falling back to a default.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
