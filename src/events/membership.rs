//! Membership lifecycle handler.
//!
//! Reacts to join/leave service messages: drives the join-verification
//! state machine, sends welcome messages, records member activity, and
//! cleans up service messages per tenant config.
//!
//! Verification flow per joining user: mute, post a prompt with a
//! confirmation button, record a pending entry, schedule a timeout. The
//! pending entry is the single source of truth - whichever of confirmation
//! and timeout consumes it first wins, the other becomes a no-op.

use std::time::Duration;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{
    ChatPermissions, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, MessageKind,
    ParseMode, User,
};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::{ActionKind, MemberEventKind, ModerationLogEntry, TenantConfig};
use crate::events::messages::{chat_kind, kick_equivalent};
use crate::moderation::VerificationTracker;
use crate::moderation::verification::PendingVerification;
use crate::utils::{apply_fillings, mention};

/// How long a verification success message lingers when the tenant has no
/// welcome display duration but wants join messages cleaned up.
const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Returns the handler for membership/service messages.
pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(is_service_message).endpoint(service_message_handler)
}

/// Any service message this module cares about.
fn is_service_message(msg: Message) -> bool {
    msg.new_chat_members().is_some() || msg.left_chat_member().is_some() || is_housekeeping(&msg)
}

/// Title changes, photo changes, pins, chat-created markers.
fn is_housekeeping(msg: &Message) -> bool {
    matches!(
        msg.kind,
        MessageKind::NewChatTitle(_)
            | MessageKind::NewChatPhoto(_)
            | MessageKind::DeleteChatPhoto(_)
            | MessageKind::GroupChatCreated(_)
            | MessageKind::SupergroupChatCreated(_)
            | MessageKind::ChannelChatCreated(_)
            | MessageKind::Pinned(_)
    )
}

/// Route a service message to the join/leave/housekeeping path.
async fn service_message_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    verification: VerificationTracker,
) -> anyhow::Result<()> {
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let tenant = state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), chat_kind(&msg))
        .await?;

    if let Some(members) = msg.new_chat_members() {
        handle_joins(&bot, &msg, &state, &verification, &tenant, members).await;

        if tenant.delete_join_messages {
            let _ = bot.delete_message(chat_id, msg.id).await;
        }
        return Ok(());
    }

    if let Some(user) = msg.left_chat_member() {
        if !user.is_bot {
            state
                .audit
                .log_member_event(chat_id.0, user.id.0, MemberEventKind::Left)
                .await;
        }

        if tenant.delete_leave_messages {
            let _ = bot.delete_message(chat_id, msg.id).await;
        }
        return Ok(());
    }

    // Remaining housekeeping service messages
    if tenant.delete_service_messages {
        let _ = bot.delete_message(chat_id, msg.id).await;
    }

    Ok(())
}

/// Handle every joining member of one join service message.
async fn handle_joins(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    verification: &VerificationTracker,
    tenant: &TenantConfig,
    members: &[User],
) {
    let chat_id = msg.chat.id;
    let chat_title = msg.chat.title().unwrap_or("the group");

    for member in members {
        if member.is_bot {
            continue;
        }

        debug!("Member {} joined tenant {}", member.id, chat_id);
        state
            .audit
            .log_member_event(chat_id.0, member.id.0, MemberEventKind::Joined)
            .await;

        if tenant.verification_enabled {
            begin_verification(bot, state, verification, chat_id, member, msg.id).await;
        } else if tenant.welcome_enabled {
            send_welcome(bot, state, tenant, chat_id, member, chat_title).await;
        }
    }
}

/// Start the verification flow for one joined member.
async fn begin_verification(
    bot: &ThrottledBot,
    state: &AppState,
    verification: &VerificationTracker,
    chat_id: ChatId,
    member: &User,
    join_msg_id: MessageId,
) {
    // Mute until verified; no until_date means indefinitely
    if let Err(e) = bot
        .restrict_chat_member(chat_id, member.id, ChatPermissions::empty())
        .await
    {
        warn!("Failed to mute joining user {}: {}", member.id, e);
        return;
    }

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "✅ I'm human",
        format!("verify:{}", member.id.0),
    )]]);

    let timeout = state.limits.verification_timeout;
    let prompt_text = format!(
        "🛡 Welcome {}! Press the button below within {} seconds to unlock the chat.",
        mention(member),
        timeout.as_secs()
    );

    let prompt = match bot
        .send_message(chat_id, prompt_text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await
    {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to send verification prompt in {}: {}", chat_id, e);
            return;
        }
    };

    // Overwrites any stale entry from an earlier join
    verification.insert(
        chat_id.0,
        member.id.0,
        PendingVerification {
            prompt_msg_id: prompt.id,
            join_msg_id,
        },
    );

    let bot = bot.clone();
    let audit = state.audit.clone();
    let verification = verification.clone();
    let user_id = member.id;
    state.scheduler.run_after(timeout, async move {
        verification_timeout(bot, audit, verification, chat_id, user_id).await;
    });

    info!(
        "Verification pending for user {} in tenant {} ({}s timeout)",
        user_id, chat_id, timeout.as_secs()
    );
}

/// Timeout callback: kick the user if they never verified.
///
/// Consuming the pending entry up front makes a duplicate firing (or a
/// firing after manual verification) a no-op.
async fn verification_timeout(
    bot: ThrottledBot,
    audit: crate::database::AuditRepo,
    verification: VerificationTracker,
    chat_id: ChatId,
    user_id: UserId,
) {
    let Some(pending) = verification.take(chat_id.0, user_id.0) else {
        return;
    };

    kick_equivalent(&bot, chat_id, user_id).await;

    // The prompt goes, and so does the join record of a user who never made
    // it in ("already deleted" is a non-error when join cleanup got there
    // first).
    let _ = bot.delete_message(chat_id, pending.prompt_msg_id).await;
    let _ = bot.delete_message(chat_id, pending.join_msg_id).await;

    audit
        .log_action(ModerationLogEntry::new(
            chat_id.0,
            user_id.0,
            0,
            ActionKind::AutoKick,
            "Failed to verify within timeout",
        ))
        .await;

    info!(
        "Auto-kicked unverified user {} from tenant {}",
        user_id, chat_id
    );
}

/// Handle a press of the verification button.
pub async fn verify_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
    verification: VerificationTracker,
) -> anyhow::Result<()> {
    let data = match &q.data {
        Some(d) => d,
        None => return Ok(()),
    };

    let target_id: u64 = match data.strip_prefix("verify:").and_then(|s| s.parse().ok()) {
        Some(id) => id,
        None => return Ok(()),
    };

    // The button belongs to exactly one user; everyone else bounces off
    if q.from.id.0 != target_id {
        bot.answer_callback_query(&q.id)
            .text("❌ This button is not for you!")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let message = match &q.message {
        Some(m) => m,
        None => {
            bot.answer_callback_query(&q.id).await?;
            return Ok(());
        }
    };
    let chat_id = message.chat().id;
    let chat_title = message.chat().title().unwrap_or("the group").to_string();

    let tenant = state
        .tenants
        .get_or_create(chat_id.0, &chat_title, "group")
        .await?;

    // Restore full permissions
    if let Err(e) = bot
        .restrict_chat_member(chat_id, q.from.id, crate::utils::full_permissions())
        .await
    {
        warn!("Failed to unmute verified user {}: {}", q.from.id, e);
    }

    let mut success = format!("✅ {} verified - welcome!", mention(&q.from));
    if tenant.welcome_enabled && !tenant.welcome_message.is_empty() {
        let welcome = apply_fillings(&tenant.welcome_message, &q.from, &chat_title);
        success = format!("{}\n\n{}", success, welcome);
    }

    if let Err(e) = bot
        .edit_message_text(chat_id, message.id(), success)
        .parse_mode(ParseMode::Html)
        .await
    {
        debug!("Failed to edit verification prompt: {}", e);
    }

    verification.take(chat_id.0, q.from.id.0);

    // Success message lifetime follows the welcome display duration
    if tenant.welcome_duration_secs > 0 {
        state.scheduler.delete_after(
            bot.clone(),
            chat_id,
            message.id(),
            Duration::from_secs(tenant.welcome_duration_secs),
        );
    } else if tenant.delete_join_messages {
        state
            .scheduler
            .delete_after(bot.clone(), chat_id, message.id(), SUCCESS_NOTICE_TTL);
    }

    bot.answer_callback_query(&q.id).text("✅ Verified!").await?;

    info!("User {} verified in tenant {}", q.from.id, chat_id);
    Ok(())
}

/// Send the welcome message for a tenant without verification.
async fn send_welcome(
    bot: &ThrottledBot,
    state: &AppState,
    tenant: &TenantConfig,
    chat_id: ChatId,
    member: &User,
    chat_title: &str,
) {
    let template = if tenant.welcome_message.is_empty() {
        "👋 Welcome {first} to {chatname}!"
    } else {
        tenant.welcome_message.as_str()
    };

    let text = apply_fillings(template, member, chat_title);

    match bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        Ok(welcome) => {
            if tenant.welcome_duration_secs > 0 {
                state.scheduler.delete_after(
                    bot.clone(),
                    chat_id,
                    welcome.id,
                    Duration::from_secs(tenant.welcome_duration_secs),
                );
            }
            info!("Sent welcome to {} in tenant {}", member.id, chat_id);
        }
        Err(e) => {
            warn!("Failed to send welcome in {}: {}", chat_id, e);
        }
    }
}
