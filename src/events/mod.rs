//! Event handler system.
//!
//! - `messages` - the moderation pipeline for regular group messages
//! - `membership` - join/leave service messages, verification, welcome

pub mod membership;
pub mod messages;
