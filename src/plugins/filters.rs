//! Filtered word management commands.
//!
//! /addfilter, /rmfilter, /filters. Words are case-folded and unique per
//! tenant; the message pipeline matches them as substrings.

use std::time::Duration;

use teloxide::prelude::*;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::guards::RequiredRight;
use crate::utils::html_escape;

use super::{admin_command_allowed, command_args, reply_html};

const COOLDOWN: Duration = Duration::from_secs(3);

/// Handle /addfilter command.
pub async fn addfilter_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "addfilter", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);

    let word = match command_args(&msg).first() {
        Some(w) => w.to_lowercase(),
        None => {
            return reply_html(&bot, &msg, "❌ Usage: /addfilter <word>".into()).await;
        }
    };

    if state.filter_words.add(chat_id.0, &word, admin_id).await? {
        reply_html(
            &bot,
            &msg,
            format!("✅ Added <b>{}</b> to the word filter.", html_escape(&word)),
        )
        .await?;
        info!("Filter word '{}' added in tenant {}", word, chat_id);
    } else {
        reply_html(
            &bot,
            &msg,
            format!("ℹ️ <b>{}</b> is already filtered.", html_escape(&word)),
        )
        .await?;
    }

    Ok(())
}

/// Handle /rmfilter command.
pub async fn rmfilter_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "rmfilter", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let word = match command_args(&msg).first() {
        Some(w) => w.to_lowercase(),
        None => {
            return reply_html(&bot, &msg, "❌ Usage: /rmfilter <word>".into()).await;
        }
    };

    if state.filter_words.remove(chat_id.0, &word).await? {
        reply_html(
            &bot,
            &msg,
            format!("✅ Removed <b>{}</b> from the word filter.", html_escape(&word)),
        )
        .await?;
        info!("Filter word '{}' removed in tenant {}", word, chat_id);
    } else {
        reply_html(
            &bot,
            &msg,
            format!("ℹ️ <b>{}</b> was not in the filter.", html_escape(&word)),
        )
        .await?;
    }

    Ok(())
}

/// Handle /filters command - list the tenant's filtered words.
pub async fn filters_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "filters", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let words = state.filter_words.list(chat_id.0).await?;

    let text = if words.is_empty() {
        "ℹ️ No filtered words in this group.".to_string()
    } else {
        let mut text = format!("🚯 <b>Filtered words</b> ({}):\n\n", words.len());
        for word in words {
            text.push_str(&format!("• {}\n", html_escape(&word)));
        }
        text
    };

    reply_html(&bot, &msg, text).await?;
    Ok(())
}
