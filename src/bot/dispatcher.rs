//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command handlers and event handlers.

use std::sync::Arc;
use std::time::Duration;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::database::{AuditRepo, Database, FilterWordRepo, TenantRepo, WarningRepo};
use crate::events;
use crate::moderation::{FloodTracker, RateLimiter, Scheduler, VerificationTracker};
use crate::permissions::Permissions;
use crate::plugins;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Moderation limits fixed at startup (per-tenant tunables live in the
/// tenant config instead).
#[derive(Debug, Clone, Copy)]
pub struct ModerationLimits {
    pub flood_limit: u32,
    pub flood_window: Duration,
    pub verification_timeout: Duration,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Permission checker with admin caching.
    pub permissions: Permissions,

    /// Tenant configuration repository (uncached by design).
    pub tenants: TenantRepo,

    /// Warning counter repository.
    pub warnings: WarningRepo,

    /// Filtered word repository.
    pub filter_words: FilterWordRepo,

    /// Moderation log + member activity repository.
    pub audit: AuditRepo,

    /// One-shot delayed task scheduler.
    pub scheduler: Scheduler,

    /// Per-command rate limiter.
    pub rate_limiter: RateLimiter,

    /// Startup-fixed moderation limits.
    pub limits: ModerationLimits,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        bot: ThrottledBot,
        db: Arc<Database>,
        cache: Arc<CacheRegistry>,
        config: &Config,
    ) -> Self {
        // Note: Permissions needs the inner Bot for API calls
        let permissions = Permissions::with_global_admins(
            bot.inner().clone(),
            cache,
            config.global_admin_ids.clone(),
        );

        let tenants = TenantRepo::new(&db, config.default_max_warnings);
        let warnings = WarningRepo::new(&db);
        let filter_words = FilterWordRepo::new(&db);
        let audit = AuditRepo::new(&db);

        let limits = ModerationLimits {
            flood_limit: config.flood_limit,
            flood_window: Duration::from_secs(config.flood_window_secs),
            verification_timeout: Duration::from_secs(config.verification_timeout_secs),
        };

        Self {
            permissions,
            tenants,
            warnings,
            filter_words,
            audit,
            scheduler: Scheduler::new(),
            rate_limiter: RateLimiter::new(),
            limits,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    db: Arc<Database>,
    cache: Arc<CacheRegistry>,
    config: &Config,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    let state = AppState::new(bot.clone(), db, cache, config);
    let flood_tracker = FloodTracker::new();
    let verification_tracker = VerificationTracker::new();

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state, flood_tracker, verification_tracker])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
///
/// Service messages (joins, leaves, housekeeping) are matched before
/// commands and moderation; the moderation pipeline sees everything that is
/// neither a service message nor a command.
fn schema() -> UpdateHandler<anyhow::Error> {
    let message_handler = Update::filter_message()
        .branch(events::membership::handler())
        .branch(plugins::command_handler())
        .branch(events::messages::handler());

    let callback_handler = plugins::callback_handler();

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}
