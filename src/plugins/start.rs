//! Start, help, and info commands.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::mention;

use super::{Command, reply_html, reply_target};

/// Handle /start command.
pub async fn start_command(bot: ThrottledBot, msg: Message, _state: AppState) -> anyhow::Result<()> {
    let text = "👮 <b>Warden</b> - group moderation bot\n\n\
        Add me to a group and promote me to admin, and I'll handle flood \
        control, content filtering, warnings, and join verification.\n\n\
        Use /help to see the available commands and /settings (as a group \
        admin) to configure moderation per group.";

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle /help command.
pub async fn help_command(bot: ThrottledBot, msg: Message, _state: AppState) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Handle /info command - show a user's standing in this tenant.
pub async fn info_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !msg.chat.is_group() && !msg.chat.is_supergroup() {
        return Ok(());
    }
    if state
        .rate_limiter
        .check("info", user.id, Duration::from_secs(5))
        .is_err()
    {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let target = reply_target(&msg).unwrap_or(user).clone();

    let status = state.permissions.member_status(chat_id, target.id).await;
    let warnings = state.warnings.get(chat_id.0, target.id.0).await?;
    let tenant = state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;

    let username = target
        .username
        .as_ref()
        .map(|u| format!("@{}", u))
        .unwrap_or_else(|| "none".to_string());

    let text = format!(
        "👤 <b>User info</b>\n\n\
        Name: {}\n\
        ID: <code>{}</code>\n\
        Username: {}\n\
        Status: {}\n\
        Warnings: {}/{}\n\
        Bot: {}",
        mention(&target),
        target.id,
        username,
        status.as_str(),
        warnings,
        tenant.max_warnings,
        if target.is_bot { "yes" } else { "no" },
    );

    reply_html(&bot, &msg, text).await?;
    Ok(())
}
