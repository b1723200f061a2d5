//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()`

pub mod ban;
pub mod filters;
pub mod mute;
pub mod purge;
pub mod rules;
pub mod settings;
pub mod start;
pub mod warn;

use std::time::Duration;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, User};
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::events::membership;
use crate::moderation::guards::{self, Deny, RequiredRight};

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show help")]
    Help,

    // Moderation
    #[command(description = "Ban user (reply)")]
    Ban,

    #[command(description = "Unban user (reply or id)")]
    Unban,

    #[command(description = "Kick user (reply, can rejoin)")]
    Kick,

    #[command(description = "Mute user (reply, optional minutes)")]
    Mute,

    #[command(description = "Unmute user (reply)")]
    Unmute,

    // Warnings
    #[command(description = "Warn user (reply, optional reason)")]
    Warn,

    #[command(description = "Remove one warning (reply)")]
    Unwarn,

    #[command(description = "Show warnings (reply or self)")]
    Warns,

    // Filters
    #[command(description = "Add a filtered word")]
    Addfilter,

    #[command(description = "Remove a filtered word")]
    Rmfilter,

    #[command(description = "List filtered words")]
    Filters,

    // Cleanup
    #[command(description = "Delete the last N messages")]
    Purge,

    // Rules
    #[command(description = "Show group rules")]
    Rules,

    #[command(description = "Set group rules")]
    Setrules,

    // Settings
    #[command(description = "Show tenant settings")]
    Settings,

    #[command(description = "Enable a feature")]
    Enable,

    #[command(description = "Disable a feature")]
    Disable,

    #[command(description = "Set the warning limit")]
    Setmaxwarn,

    #[command(description = "Set the welcome message")]
    Setwelcome,

    #[command(description = "Set welcome display seconds (0 = keep)")]
    Welcomeduration,

    #[command(description = "Set the tenant language")]
    Setlang,

    // Info
    #[command(description = "Show user info (reply or self)")]
    Info,

    #[command(description = "Show moderation statistics")]
    Stats,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(start::help_command))
        // Moderation
        .branch(case![Command::Ban].endpoint(ban::ban_command))
        .branch(case![Command::Unban].endpoint(ban::unban_command))
        .branch(case![Command::Kick].endpoint(ban::kick_command))
        .branch(case![Command::Mute].endpoint(mute::mute_command))
        .branch(case![Command::Unmute].endpoint(mute::unmute_command))
        // Warnings
        .branch(case![Command::Warn].endpoint(warn::warn_command))
        .branch(case![Command::Unwarn].endpoint(warn::unwarn_command))
        .branch(case![Command::Warns].endpoint(warn::warns_command))
        // Filters
        .branch(case![Command::Addfilter].endpoint(filters::addfilter_command))
        .branch(case![Command::Rmfilter].endpoint(filters::rmfilter_command))
        .branch(case![Command::Filters].endpoint(filters::filters_command))
        // Cleanup
        .branch(case![Command::Purge].endpoint(purge::purge_command))
        // Rules
        .branch(case![Command::Rules].endpoint(rules::rules_command))
        .branch(case![Command::Setrules].endpoint(rules::setrules_command))
        // Settings
        .branch(case![Command::Settings].endpoint(settings::settings_command))
        .branch(case![Command::Enable].endpoint(settings::enable_command))
        .branch(case![Command::Disable].endpoint(settings::disable_command))
        .branch(case![Command::Setmaxwarn].endpoint(settings::setmaxwarn_command))
        .branch(case![Command::Setwelcome].endpoint(settings::setwelcome_command))
        .branch(case![Command::Welcomeduration].endpoint(settings::welcomeduration_command))
        .branch(case![Command::Setlang].endpoint(settings::setlang_command))
        // Info
        .branch(case![Command::Info].endpoint(start::info_command))
        .branch(case![Command::Stats].endpoint(settings::stats_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query().branch(
        dptree::filter(|q: CallbackQuery| {
            q.data
                .as_ref()
                .map(|d| d.starts_with("verify:"))
                .unwrap_or(false)
        })
        .endpoint(membership::verify_callback),
    )
}

/// Reply with the denial reason for a refused command.
pub async fn reply_deny(bot: &ThrottledBot, msg: &Message, deny: &Deny) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, deny.to_string())
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

/// Guard composition for admin commands: group-only, then the per-command
/// rate limit, then the admin-right check. Replies with the denial and
/// returns false when any guard refuses.
pub async fn admin_command_allowed(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    command: &'static str,
    cooldown: Duration,
    right: RequiredRight,
) -> anyhow::Result<bool> {
    let user = match msg.from.as_ref() {
        Some(u) => u,
        None => return Ok(false),
    };

    let guard_result = match guards::require_group(msg) {
        Err(deny) => Err(deny),
        Ok(()) => match state.rate_limiter.check(command, user.id, cooldown) {
            Err(deny) => Err(deny),
            Ok(()) => {
                guards::require_right(&state.permissions, msg.chat.id, user.id, right).await
            }
        },
    };

    match guard_result {
        Ok(()) => Ok(true),
        Err(deny) => {
            reply_deny(bot, msg, &deny).await?;
            Ok(false)
        }
    }
}

/// Target of a moderation command: the sender of the replied-to message.
pub fn reply_target(msg: &Message) -> Option<&User> {
    msg.reply_to_message().and_then(|m| m.from.as_ref())
}

/// Arguments after the command itself.
pub fn command_args(msg: &Message) -> Vec<&str> {
    msg.text()
        .unwrap_or("")
        .split_whitespace()
        .skip(1)
        .collect()
}

/// Send an HTML-formatted reply to the command message.
pub async fn reply_html(bot: &ThrottledBot, msg: &Message, text: String) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}
