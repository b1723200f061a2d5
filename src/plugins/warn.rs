//! Warning command handlers.
//!
//! Explicit /warn and /unwarn share the escalation arithmetic with the
//! automatic content filters: the counter lives in the store, reaching the
//! tenant's limit kicks and resets.

use std::time::Duration;

use teloxide::prelude::*;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::{ActionKind, ModerationLogEntry};
use crate::events::messages::kick_equivalent;
use crate::moderation::engine::{self, Decision};
use crate::moderation::guards::{self, RequiredRight};
use crate::utils::mention;

use super::{admin_command_allowed, command_args, reply_deny, reply_html, reply_target};

const COOLDOWN: Duration = Duration::from_secs(2);

/// Handle /warn command - `/warn [reason]` on a reply.
pub async fn warn_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "warn", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user you want to warn.".into()).await;
        }
    };

    if state
        .permissions
        .is_admin(chat_id, target.id)
        .await
        .unwrap_or(false)
    {
        return reply_html(&bot, &msg, "❌ I won't warn an admin.".into()).await;
    }

    let reason = {
        let r = command_args(&msg).join(" ");
        if r.is_empty() {
            "No reason provided".to_string()
        } else {
            r
        }
    };

    let tenant = state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;

    let count = state
        .warnings
        .increment(chat_id.0, target.id.0, &reason)
        .await?;

    match engine::warn_outcome(count, tenant.max_warnings) {
        Decision::Escalated { max } => {
            kick_equivalent(&bot, chat_id, target.id).await;
            state.warnings.reset(chat_id.0, target.id.0).await?;

            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    target.id.0,
                    admin_id,
                    ActionKind::AutoKick,
                    format!("Reached {} warnings", max),
                ))
                .await;

            reply_html(
                &bot,
                &msg,
                format!(
                    "🚫 {} reached {} warnings and has been removed from the group.",
                    mention(&target),
                    max
                ),
            )
            .await?;
            info!(
                "User {} reached warn limit in tenant {}, kicked",
                target.id, chat_id
            );
        }
        Decision::Warned { count, max } => {
            state
                .audit
                .log_action(ModerationLogEntry::new(
                    chat_id.0,
                    target.id.0,
                    admin_id,
                    ActionKind::Warn,
                    reason.clone(),
                ))
                .await;

            reply_html(
                &bot,
                &msg,
                format!(
                    "⚠️ {} has been warned ({}/{}).\nReason: {}",
                    mention(&target),
                    count,
                    max,
                    crate::utils::html_escape(&reason)
                ),
            )
            .await?;
            info!("User {} warned in tenant {} ({}/{})", target.id, chat_id, count, max);
        }
        _ => {}
    }

    Ok(())
}

/// Handle /unwarn command - remove one warning, floored at zero.
pub async fn unwarn_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "unwarn", COOLDOWN, RequiredRight::RestrictMembers).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let target = match reply_target(&msg) {
        Some(u) => u.clone(),
        None => {
            return reply_html(&bot, &msg, "❌ Reply to the user to remove a warning.".into())
                .await;
        }
    };

    let current = state.warnings.get(chat_id.0, target.id.0).await?;
    if current == 0 {
        return reply_html(&bot, &msg, format!("ℹ️ {} has no warnings.", mention(&target))).await;
    }

    let tenant = state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    let new_count = state.warnings.decrement(chat_id.0, target.id.0).await?;

    state
        .audit
        .log_action(ModerationLogEntry::new(
            chat_id.0,
            target.id.0,
            admin_id,
            ActionKind::Unwarn,
            "Warning removed by admin",
        ))
        .await;

    reply_html(
        &bot,
        &msg,
        format!(
            "✅ Removed one warning from {} ({}/{}).",
            mention(&target),
            new_count,
            tenant.max_warnings
        ),
    )
    .await?;

    Ok(())
}

/// Handle /warns command - anyone may look up warnings (reply or self).
pub async fn warns_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if let Err(deny) = guards::require_group(&msg) {
        return reply_deny(&bot, &msg, &deny).await;
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if let Err(deny) = state
        .rate_limiter
        .check("warns", user.id, Duration::from_secs(5))
    {
        return reply_deny(&bot, &msg, &deny).await;
    }

    let chat_id = msg.chat.id;
    let target = reply_target(&msg).unwrap_or(user).clone();

    let tenant = state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    let count = state.warnings.get(chat_id.0, target.id.0).await?;

    reply_html(
        &bot,
        &msg,
        format!(
            "⚠️ {} has {}/{} warnings.",
            mention(&target),
            count,
            tenant.max_warnings
        ),
    )
    .await?;

    Ok(())
}
