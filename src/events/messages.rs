//! Message moderation pipeline.
//!
//! Every group message that is not a command or service message runs
//! through here: exemptions first, then the flood gate, then content
//! classification, then enforcement of the resulting decision.
//!
//! Transport failures during enforcement are logged and swallowed; a
//! decision counts as taken even when a side effect partially failed, and
//! one message's failure never affects the next event.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, ParseMode, User};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::{ActionKind, ModerationLogEntry, TenantConfig};
use crate::moderation::FloodTracker;
use crate::moderation::classifier::{self, Violation};
use crate::moderation::engine::{self, Decision};
use crate::utils::mention;

/// Returns the moderation handler for group messages.
pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(is_moderatable).endpoint(moderate_message)
}

/// Group messages from human senders, excluding commands.
fn is_moderatable(msg: Message) -> bool {
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return false;
    }

    if let Some(text) = msg.text()
        && text.starts_with('/')
    {
        return false;
    }

    match msg.from.as_ref() {
        Some(user) => !user.is_bot,
        None => false,
    }
}

/// Run one message through the moderation pipeline.
async fn moderate_message(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    flood: FloodTracker,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let user = match msg.from.as_ref() {
        Some(u) => u,
        None => return Ok(()),
    };

    // Admins and global admins are always exempt from moderation
    if state
        .permissions
        .is_admin(chat_id, user.id)
        .await
        .unwrap_or(false)
    {
        return Ok(());
    }

    // Config is read fresh per event so settings changes apply immediately
    let tenant = state
        .tenants
        .get_or_create(
            chat_id.0,
            msg.chat.title().unwrap_or(""),
            chat_kind(&msg),
        )
        .await?;

    // Flood gate runs before classification and outside the warning ladder
    if tenant.antiflood_enabled
        && flood.record_and_check(
            chat_id.0,
            user.id.0,
            state.limits.flood_limit,
            state.limits.flood_window,
        )
    {
        debug!("User {} is flooding in tenant {}", user.id, chat_id);
        enforce_flood(&bot, &msg, &state, user).await;
        flood.reset(chat_id.0, user.id.0);
        return Ok(());
    }

    // Word list is only needed when the word filter is on
    let filter_words = if tenant.word_filter_enabled {
        state.filter_words.list(chat_id.0).await.unwrap_or_default()
    } else {
        Vec::new()
    };

    let violation = match classifier::classify(&tenant, &msg, &filter_words) {
        Some(v) => v,
        None => return Ok(()),
    };

    enforce_violation(&bot, &msg, &state, &tenant, user, violation).await;
    Ok(())
}

/// Apply the flood decision: delete, mute, log, notify.
async fn enforce_flood(bot: &ThrottledBot, msg: &Message, state: &AppState, user: &User) {
    let chat_id = msg.chat.id;
    let decision = engine::decide_flood();
    let ttl = decision.notice_ttl();
    let Decision::FloodMuted { mute } = decision else {
        return;
    };

    // Offending message goes first; failure doesn't block the mute
    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        warn!("Failed to delete flood message in {}: {}", chat_id, e);
    }

    let until = chrono::Utc::now() + chrono::Duration::seconds(mute.as_secs() as i64);
    match bot
        .restrict_chat_member(chat_id, user.id, ChatPermissions::empty())
        .until_date(until)
        .await
    {
        Ok(_) => {
            info!("Muted flooding user {} in tenant {}", user.id, chat_id);
        }
        Err(e) => {
            warn!("Failed to mute flooding user {}: {}", user.id, e);
        }
    }

    state
        .audit
        .log_action(
            ModerationLogEntry::new(
                chat_id.0,
                user.id.0,
                0,
                ActionKind::AutoMute,
                "Flooding detected",
            )
            .with_duration(mute.as_secs()),
        )
        .await;

    let text = format!(
        "🤫 {} has been muted for {} for flooding.",
        mention(user),
        crate::utils::format_duration_full(mute.as_secs())
    );
    send_notice(bot, state, chat_id, &text, ttl).await;
}

/// Apply a content-violation decision: delete, warn/escalate, log, notify.
async fn enforce_violation(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    tenant: &TenantConfig,
    user: &User,
    violation: Violation,
) {
    let chat_id = msg.chat.id;
    let reason = violation.reason();

    // Delete the offending message first, best-effort
    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        warn!("Failed to delete violating message in {}: {}", chat_id, e);
    }

    let decision = if engine::violation_warns(&violation) {
        let count = match state.warnings.increment(chat_id.0, user.id.0, &reason).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to record warning for user {}: {}", user.id, e);
                return;
            }
        };
        engine::decide(&violation, count, tenant.max_warnings)
    } else {
        engine::decide(&violation, 0, tenant.max_warnings)
    };

    let text = match &decision {
        Decision::Warned { count, max } => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    user.id.0,
                    0,
                    ActionKind::Warn,
                    reason.clone(),
                ))
                .await;

            format!(
                "⚠️ {} - that's not allowed here ({}).\nWarnings: {}/{}",
                mention(user),
                reason,
                count,
                max
            )
        }
        Decision::Escalated { max } => {
            kick_equivalent(bot, chat_id, user.id).await;

            if let Err(e) = state.warnings.reset(chat_id.0, user.id.0).await {
                warn!("Failed to reset warnings for user {}: {}", user.id, e);
            }
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    user.id.0,
                    0,
                    ActionKind::AutoKick,
                    format!("Reached {} warnings ({})", max, reason),
                ))
                .await;

            format!(
                "🚫 {} reached {} warnings and has been removed from the group.",
                mention(user),
                max
            )
        }
        Decision::WordDeleted { .. } => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    user.id.0,
                    0,
                    ActionKind::Filter,
                    reason.clone(),
                ))
                .await;

            format!("🧹 {}'s message was removed (filtered word).", mention(user))
        }
        Decision::FloodMuted { .. } => return,
    };

    info!(
        "Enforced {:?} against user {} in tenant {}",
        decision, user.id, chat_id
    );

    send_notice(bot, state, chat_id, &text, decision.notice_ttl()).await;
}

/// Ban immediately followed by unban: removal that permits rejoin.
pub async fn kick_equivalent(bot: &ThrottledBot, chat_id: ChatId, user_id: UserId) {
    match bot.ban_chat_member(chat_id, user_id).await {
        Ok(_) => {
            if let Err(e) = bot.unban_chat_member(chat_id, user_id).await {
                warn!("Failed to unban {} after kick-ban: {}", user_id, e);
            }
        }
        Err(e) => {
            warn!("Failed to kick user {} from {}: {}", user_id, chat_id, e);
        }
    }
}

/// Post an enforcement notice and schedule its deletion.
///
/// The chat stays clean; the moderation log, not the chat, is the durable
/// record.
async fn send_notice(
    bot: &ThrottledBot,
    state: &AppState,
    chat_id: ChatId,
    text: &str,
    ttl: std::time::Duration,
) {
    match bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(notice) => {
            state
                .scheduler
                .delete_after(bot.clone(), chat_id, notice.id, ttl);
        }
        Err(e) => {
            warn!("Failed to send moderation notice in {}: {}", chat_id, e);
        }
    }
}

/// The tenant's chat type, for the config record.
pub fn chat_kind(msg: &Message) -> &'static str {
    if msg.chat.is_supergroup() {
        "supergroup"
    } else {
        "group"
    }
}
