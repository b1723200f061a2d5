//! One-shot delayed tasks.
//!
//! A single abstraction for everything the bot does "later": verification
//! timeouts, enforcement-notice cleanup, welcome-message cleanup. Tasks are
//! fire-and-forget; whatever they do at fire time must be idempotent, and
//! failures are logged, never retried. A process restart simply drops
//! anything still scheduled.

use std::future::Future;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::debug;

use crate::bot::dispatcher::ThrottledBot;

/// Handle for scheduling one-shot delayed tasks on the runtime.
#[derive(Clone, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run `task` after `delay`, detached from the calling handler.
    pub fn run_after<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }

    /// Delete a message after `delay`, best-effort.
    ///
    /// "Already deleted" is not an error worth surfacing; the attempt is
    /// logged at debug and dropped.
    pub fn delete_after(
        &self,
        bot: ThrottledBot,
        chat_id: ChatId,
        msg_id: MessageId,
        delay: Duration,
    ) {
        self.run_after(delay, async move {
            if let Err(e) = bot.delete_message(chat_id, msg_id).await {
                debug!(
                    "Scheduled deletion of message {} in chat {} failed: {}",
                    msg_id.0, chat_id, e
                );
            }
        });
    }
}
