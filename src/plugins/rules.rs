//! Group rules commands.
//!
//! /rules shows the tenant's rules text; /setrules replaces it.

use std::time::Duration;

use mongodb::bson::Bson;
use teloxide::prelude::*;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::guards::{self, RequiredRight};
use crate::utils::html_escape;

use super::{admin_command_allowed, reply_deny, reply_html};

const DEFAULT_RULES: &str = "📋 <b>Group rules</b>\n\n\
    1. Be respectful to other members\n\
    2. No spam or flooding\n\
    3. No links or dangerous files\n\
    4. Follow the admins' instructions";

/// Handle /rules command - anyone may read the rules.
pub async fn rules_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if let Err(deny) = guards::require_group(&msg) {
        return reply_deny(&bot, &msg, &deny).await;
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if let Err(deny) = state
        .rate_limiter
        .check("rules", user.id, Duration::from_secs(10))
    {
        return reply_deny(&bot, &msg, &deny).await;
    }

    let tenant = state
        .tenants
        .get_or_create(msg.chat.id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;

    let text = if tenant.rules_text.is_empty() {
        DEFAULT_RULES.to_string()
    } else {
        format!("📋 <b>Group rules</b>\n\n{}", html_escape(&tenant.rules_text))
    };

    reply_html(&bot, &msg, text).await?;
    Ok(())
}

/// Handle /setrules command - replace the rules text.
pub async fn setrules_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "setrules", Duration::from_secs(5), RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let text = msg.text().unwrap_or("");
    let rules = text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");

    if rules.is_empty() {
        return reply_html(&bot, &msg, "❌ Usage: /setrules <rules text>".into()).await;
    }

    // Tenant must exist before a field update can land
    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(chat_id.0, "rules_text", Bson::String(rules.to_string()))
        .await?;

    reply_html(&bot, &msg, "✅ Group rules updated.".into()).await?;
    Ok(())
}
