//! Tenant settings commands.
//!
//! /settings shows the current configuration; /enable and /disable flip
//! feature toggles by name; the remaining commands set individual tunables.
//! All writes go through the repository's whitelisted field update.

use std::time::Duration;

use mongodb::bson::Bson;
use teloxide::prelude::*;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::TenantConfig;
use crate::moderation::guards::RequiredRight;
use crate::utils::{format_duration_full, html_escape};

use super::{admin_command_allowed, command_args, reply_html};

const COOLDOWN: Duration = Duration::from_secs(3);

/// Feature names accepted by /enable and /disable, mapped to their config
/// fields.
const FEATURES: &[(&str, &str)] = &[
    ("welcome", "welcome_enabled"),
    ("antiflood", "antiflood_enabled"),
    ("wordfilter", "word_filter_enabled"),
    ("verification", "verification_enabled"),
    ("antilink", "antilink_enabled"),
    ("antifile", "antifile_enabled"),
    ("photo", "media_filters.photo"),
    ("video", "media_filters.video"),
    ("audio", "media_filters.audio"),
    ("voice", "media_filters.voice"),
    ("sticker", "media_filters.sticker"),
    ("animation", "media_filters.animation"),
    ("videonote", "media_filters.video_note"),
    ("cleanjoin", "delete_join_messages"),
    ("cleanleave", "delete_leave_messages"),
    ("cleanservice", "delete_service_messages"),
];

fn status_icon(enabled: bool) -> &'static str {
    if enabled { "✅" } else { "❌" }
}

/// Handle /settings command - show the tenant configuration.
pub async fn settings_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "settings", Duration::from_secs(10), RequiredRight::Admin).await? {
        return Ok(());
    }

    let tenant = state
        .tenants
        .get_or_create(msg.chat.id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;

    reply_html(&bot, &msg, render_settings(&tenant)).await?;
    Ok(())
}

fn render_settings(t: &TenantConfig) -> String {
    format!(
        "⚙️ <b>Settings for {}</b>\n\n\
        {} Welcome messages\n\
        {} Antiflood\n\
        {} Word filter\n\
        {} Join verification\n\
        {} Antilink\n\
        {} Antifile\n\
        {} Photo / {} Video / {} Audio filters\n\
        {} Voice / {} Sticker / {} Animation / {} Video note filters\n\
        {} Delete join messages\n\
        {} Delete leave messages\n\
        {} Delete service messages\n\n\
        Max warnings: <b>{}</b>\n\
        Welcome display: <b>{}</b>\n\
        Language: <b>{}</b>\n\n\
        Toggle with /enable &lt;feature&gt; and /disable &lt;feature&gt;.",
        html_escape(&t.title),
        status_icon(t.welcome_enabled),
        status_icon(t.antiflood_enabled),
        status_icon(t.word_filter_enabled),
        status_icon(t.verification_enabled),
        status_icon(t.antilink_enabled),
        status_icon(t.antifile_enabled),
        status_icon(t.media_filters.photo),
        status_icon(t.media_filters.video),
        status_icon(t.media_filters.audio),
        status_icon(t.media_filters.voice),
        status_icon(t.media_filters.sticker),
        status_icon(t.media_filters.animation),
        status_icon(t.media_filters.video_note),
        status_icon(t.delete_join_messages),
        status_icon(t.delete_leave_messages),
        status_icon(t.delete_service_messages),
        t.max_warnings,
        if t.welcome_duration_secs == 0 {
            "keep forever".to_string()
        } else {
            format_duration_full(t.welcome_duration_secs)
        },
        html_escape(&t.language),
    )
}

/// Handle /enable command.
pub async fn enable_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    set_feature(bot, msg, state, true).await
}

/// Handle /disable command.
pub async fn disable_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    set_feature(bot, msg, state, false).await
}

async fn set_feature(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    value: bool,
) -> anyhow::Result<()> {
    let command = if value { "enable" } else { "disable" };
    if !admin_command_allowed(&bot, &msg, &state, command, COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let feature = match command_args(&msg).first() {
        Some(f) => f.to_lowercase(),
        None => {
            let names: Vec<&str> = FEATURES.iter().map(|(name, _)| *name).collect();
            return reply_html(
                &bot,
                &msg,
                format!("❌ Usage: /{} <feature>\n\nFeatures: {}", command, names.join(", ")),
            )
            .await;
        }
    };

    let field = match FEATURES.iter().find(|(name, _)| *name == feature) {
        Some((_, field)) => *field,
        None => {
            return reply_html(&bot, &msg, format!("❌ Unknown feature: {}", feature)).await;
        }
    };

    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(chat_id.0, field, Bson::Boolean(value))
        .await?;

    reply_html(
        &bot,
        &msg,
        format!(
            "{} <b>{}</b> is now {}.",
            status_icon(value),
            feature,
            if value { "enabled" } else { "disabled" }
        ),
    )
    .await?;
    info!("Feature {} set to {} in tenant {}", feature, value, chat_id);
    Ok(())
}

/// Handle /setmaxwarn command.
pub async fn setmaxwarn_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "setmaxwarn", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let limit = match command_args(&msg).first().and_then(|a| a.parse::<u32>().ok()) {
        Some(n) if (1..=100).contains(&n) => n,
        _ => {
            return reply_html(&bot, &msg, "❌ Usage: /setmaxwarn <1-100>".into()).await;
        }
    };

    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(chat_id.0, "max_warnings", Bson::Int32(limit as i32))
        .await?;

    reply_html(&bot, &msg, format!("✅ Warning limit set to <b>{}</b>.", limit)).await?;
    Ok(())
}

/// Handle /setwelcome command.
pub async fn setwelcome_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "setwelcome", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let text = msg.text().unwrap_or("");
    let template = text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");

    if template.is_empty() {
        return reply_html(
            &bot,
            &msg,
            "❌ Usage: /setwelcome <text>\n\n\
            Placeholders: {first}, {mention}, {chatname}, {time}"
                .into(),
        )
        .await;
    }

    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(
            chat_id.0,
            "welcome_message",
            Bson::String(template.to_string()),
        )
        .await?;

    reply_html(&bot, &msg, "✅ Welcome message updated.".into()).await?;
    Ok(())
}

/// Handle /welcomeduration command.
pub async fn welcomeduration_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "welcomeduration", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let secs = match command_args(&msg).first().and_then(|a| a.parse::<u64>().ok()) {
        Some(n) => n,
        None => {
            return reply_html(
                &bot,
                &msg,
                "❌ Usage: /welcomeduration <seconds> (0 = keep forever)".into(),
            )
            .await;
        }
    };

    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(
            chat_id.0,
            "welcome_duration_secs",
            Bson::Int64(secs as i64),
        )
        .await?;

    let text = if secs == 0 {
        "✅ Welcome messages are now kept forever.".to_string()
    } else {
        format!("✅ Welcome messages are now deleted after {} seconds.", secs)
    };
    reply_html(&bot, &msg, text).await?;
    Ok(())
}

/// Handle /setlang command.
pub async fn setlang_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "setlang", COOLDOWN, RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let lang = match command_args(&msg).first() {
        Some(l) => l.to_lowercase(),
        None => {
            return reply_html(&bot, &msg, "❌ Usage: /setlang <code> (e.g. en)".into()).await;
        }
    };

    state
        .tenants
        .get_or_create(chat_id.0, msg.chat.title().unwrap_or(""), "group")
        .await?;
    state
        .tenants
        .update_field(chat_id.0, "language", Bson::String(lang.clone()))
        .await?;

    reply_html(&bot, &msg, format!("✅ Language set to <b>{}</b>.", html_escape(&lang))).await?;
    Ok(())
}

/// Handle /stats command - moderation and member-activity statistics.
pub async fn stats_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "stats", Duration::from_secs(10), RequiredRight::Admin).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let stats = state.audit.tenant_stats(chat_id.0).await?;
    let activity = state.audit.member_activity_stats(chat_id.0).await?;

    let text = format!(
        "📊 <b>Moderation statistics</b>\n\n\
        Total actions: <b>{}</b>\n\n\
        <b>Last 24 hours</b>\n\
        Bans: {}\nKicks: {}\nMutes: {}\nWarnings: {}\n\n\
        <b>Members</b>\n\
        Joined (7d): {} · Left (7d): {} · Net: {:+}\n\
        Joined (30d): {} · Left (30d): {} · Net: {:+}",
        stats.total_actions,
        stats.recent_bans,
        stats.recent_kicks,
        stats.recent_mutes,
        stats.recent_warns,
        activity.joined_7d,
        activity.left_7d,
        activity.net_growth_7d(),
        activity.joined_30d,
        activity.left_30d,
        activity.net_growth_30d(),
    );

    reply_html(&bot, &msg, text).await?;
    Ok(())
}
