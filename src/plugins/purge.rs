//! Purge command.
//!
//! Deletes the last N messages by walking message ids backwards from the
//! command. Gaps (already-deleted or service-only ids) are skipped silently.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::guards::RequiredRight;
use crate::moderation::engine::NOTICE_TTL;

use super::{admin_command_allowed, command_args, reply_html};

const COOLDOWN: Duration = Duration::from_secs(10);

/// Maximum messages deletable per purge.
const MAX_PURGE: i32 = 100;

/// Handle /purge command - `/purge <n>`.
pub async fn purge_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !admin_command_allowed(&bot, &msg, &state, "purge", COOLDOWN, RequiredRight::DeleteMessages).await? {
        return Ok(());
    }
    let chat_id = msg.chat.id;

    let count = match command_args(&msg).first().and_then(|a| a.parse::<i32>().ok()) {
        Some(n) if (1..=MAX_PURGE).contains(&n) => n,
        Some(_) => {
            return reply_html(
                &bot,
                &msg,
                format!("❌ Count must be between 1 and {}.", MAX_PURGE),
            )
            .await;
        }
        None => {
            return reply_html(&bot, &msg, "❌ Usage: /purge <count>".into()).await;
        }
    };

    let mut deleted = 0;
    for i in 1..=count {
        let target = MessageId(msg.id.0 - i);
        if bot.delete_message(chat_id, target).await.is_ok() {
            deleted += 1;
        }
    }

    // The command itself goes too
    let _ = bot.delete_message(chat_id, msg.id).await;

    if let Ok(notice) = bot
        .send_message(chat_id, format!("🗑 Deleted {} messages.", deleted))
        .await
    {
        state
            .scheduler
            .delete_after(bot.clone(), chat_id, notice.id, NOTICE_TTL);
    }

    info!("Purged {} messages in tenant {}", deleted, chat_id);
    Ok(())
}
