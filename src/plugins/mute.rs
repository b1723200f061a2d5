//! Mute management commands.
//!
//! /mute with an optional duration in minutes (default 60), and /unmute.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatPermissions;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::{ActionKind, ModerationLogEntry};
use crate::moderation::guards::RequiredRight;
use crate::utils::{full_permissions, mention, parse_duration};

use super::{admin_command_allowed, command_args, reply_html, reply_target};

const COOLDOWN: Duration = Duration::from_secs(2);

/// Default mute length when no duration is given.
const DEFAULT_MUTE_MINUTES: u64 = 60;

/// Handle /mute command - `/mute [minutes]` on a reply.
pub async fn mute_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "mute", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user you want to mute.".into()).await;
        }
    };

    if state
        .permissions
        .is_admin(chat_id, target.id)
        .await
        .unwrap_or(false)
    {
        return reply_html(&bot, &msg, "❌ I won't mute an admin.".into()).await;
    }

    // Duration is either bare minutes ("30") or suffixed ("2h", "1d")
    let minutes = match command_args(&msg).first() {
        Some(arg) => match arg.parse::<u64>() {
            Ok(m) if m > 0 => m,
            _ => match parse_duration(arg) {
                Some(d) => d.as_secs().div_ceil(60),
                None => {
                    return reply_html(
                        &bot,
                        &msg,
                        "❌ Give a duration in minutes or like 30m, 2h, 1d.".into(),
                    )
                    .await;
                }
            },
        },
        None => DEFAULT_MUTE_MINUTES,
    };

    let until = chrono::Utc::now() + chrono::Duration::minutes(minutes as i64);

    match bot
        .restrict_chat_member(chat_id, target.id, ChatPermissions::empty())
        .until_date(until)
        .await
    {
        Ok(_) => {
            state
                .audit
                .log_action(
                    ModerationLogEntry::new(
                        chat_id.0,
                        target.id.0,
                        admin_id,
                        ActionKind::Mute,
                        format!("Muted for {} minutes", minutes),
                    )
                    .with_duration(minutes * 60),
                )
                .await;

            reply_html(
                &bot,
                &msg,
                format!("🔇 {} has been muted for {} minutes.", mention(&target), minutes),
            )
            .await?;
            info!(
                "User {} muted in tenant {} for {} minutes",
                target.id, chat_id, minutes
            );
        }
        Err(e) => {
            reply_html(&bot, &msg, format!("❌ Could not mute: {}", e)).await?;
        }
    }

    Ok(())
}

/// Handle /unmute command.
pub async fn unmute_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "unmute", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user you want to unmute.".into()).await;
        }
    };

    match bot
        .restrict_chat_member(chat_id, target.id, full_permissions())
        .await
    {
        Ok(_) => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    target.id.0,
                    admin_id,
                    ActionKind::Unmute,
                    "Unmuted by admin",
                ))
                .await;

            reply_html(&bot, &msg, format!("🔊 {} has been unmuted.", mention(&target))).await?;
        }
        Err(e) => {
            reply_html(&bot, &msg, format!("❌ Could not unmute: {}", e)).await?;
        }
    }

    Ok(())
}
