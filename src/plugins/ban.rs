//! Ban management commands.
//!
//! /ban, /unban, and /kick. Kick is ban-then-unban so the user may rejoin.

use std::time::Duration;

use teloxide::prelude::*;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::{ActionKind, ModerationLogEntry};
use crate::events::messages::kick_equivalent;
use crate::moderation::guards::RequiredRight;
use crate::utils::mention;

use super::{admin_command_allowed, command_args, reply_html, reply_target};

const COOLDOWN: Duration = Duration::from_secs(3);

/// Handle /ban command - permanent ban, reply required.
pub async fn ban_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "ban", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user you want to ban.".into()).await;
        }
    };

    // Admins don't ban admins
    if state
        .permissions
        .is_admin(chat_id, target.id)
        .await
        .unwrap_or(false)
    {
        return reply_html(&bot, &msg, "❌ I won't ban an admin.".into()).await;
    }

    let reason = command_args(&msg).join(" ");

    match bot.ban_chat_member(chat_id, target.id).await {
        Ok(_) => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    target.id.0,
                    admin_id,
                    ActionKind::Ban,
                    if reason.is_empty() {
                        "No reason provided".to_string()
                    } else {
                        reason.clone()
                    },
                ))
                .await;

            let text = if reason.is_empty() {
                format!("🔨 {} has been banned.", mention(&target))
            } else {
                format!("🔨 {} has been banned.\nReason: {}", mention(&target), reason)
            };
            reply_html(&bot, &msg, text).await?;
            info!("User {} banned from tenant {} by {}", target.id, chat_id, admin_id);
        }
        Err(e) => {
            reply_html(&bot, &msg, format!("❌ Could not ban: {}", e)).await?;
        }
    }

    Ok(())
}

/// Handle /unban command - reply or numeric user id.
pub async fn unban_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "unban", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let (target_id, target_label) = if let Some(user) = reply_target(&msg) {
        (user.id, mention(user))
    } else if let Some(id) = command_args(&msg).first().and_then(|a| a.parse::<u64>().ok()) {
        (UserId(id), format!("User {}", id))
    } else {
        return reply_html(
            &bot,
            &msg,
            "❌ Reply to the user or pass their id: /unban 123456".into(),
        )
        .await;
    };

    // only_if_banned: unbanning a present member would otherwise kick them
    match bot
        .unban_chat_member(chat_id, target_id)
        .only_if_banned(true)
        .await
    {
        Ok(_) => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    target_id.0,
                    admin_id,
                    ActionKind::Unban,
                    "Unbanned by admin",
                ))
                .await;

            reply_html(&bot, &msg, format!("✅ {} has been unbanned.", target_label)).await?;
            info!("User {} unbanned in tenant {}", target_id, chat_id);
        }
        Err(e) => {
            reply_html(&bot, &msg, format!("❌ Could not unban: {}", e)).await?;
        }
    }

    Ok(())
}

/// Handle /kick command - remove but allow rejoin.
pub async fn kick_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "kick", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user you want to kick.".into()).await;
        }
    };

    if state
        .permissions
        .is_admin(chat_id, target.id)
        .await
        .unwrap_or(false)
    {
        return reply_html(&bot, &msg, "❌ I won't kick an admin.".into()).await;
    }

    kick_equivalent(&bot, chat_id, target.id).await;

    state
        .audit
        .log_action(ModerationLogEntry::new(
            chat_id.0,
            target.id.0,
            admin_id,
            ActionKind::Kick,
            "Kicked from group",
        ))
        .await;

    reply_html(&bot, &msg, format!("👢 {} has been kicked.", mention(&target))).await?;
    info!("User {} kicked from tenant {}", target.id, chat_id);

    Ok(())
}
