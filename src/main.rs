//! Warden - Multi-Tenant Telegram Moderation Bot
//!
//! One process moderates many independent groups ("tenants"), each with its
//! own configuration, warning counters, filtered words, and transient
//! flood/verification state.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (tenants, warnings, filters, audit log)
//! - `cache` - LRU-based caching with Moka (admin lookups only)
//! - `permissions` - Admin checking with caching and global-admin override
//! - `bot` - Core bot functionality (with Throttle for API rate limiting)
//! - `moderation` - Classifier, decision engine, flood/verification trackers
//! - `events` - Message moderation and membership lifecycle handlers
//! - `plugins` - Command handlers
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod database;
mod events;
mod moderation;
mod permissions;
mod plugins;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::CacheRegistry;
use config::Config;
use database::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Initialize logging with sensible defaults
    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warden=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Warden bot...");

    // Load configuration (missing required values are fatal here, not at
    // event-handling time)
    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let db = Arc::new(db);
    info!("Database connected");

    // Initialize cache registry
    let cache = Arc::new(CacheRegistry::new());

    // Initialize bot with Throttle for automatic rate limiting
    // This respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if config.global_admin_ids.is_empty() {
        info!("No global admins configured (GLOBAL_ADMIN_IDS is empty)");
    } else {
        info!("Global admins: {:?}", config.global_admin_ids);
    }

    // Build dispatcher
    let dispatcher = bot::build_dispatcher(bot.clone(), db, cache, &config);

    // Run the bot
    bot::run(&config, dispatcher, bot).await;

    Ok(())
}
