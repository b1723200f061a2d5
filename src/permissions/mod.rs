//! Permission system for checking user roles.
//!
//! This module provides utilities for checking if a user is an admin in a
//! tenant, or holds a specific admin right. Lookups go to the Telegram API
//! and are cached with a short TTL; global admins configured at startup pass
//! every check in every tenant.
//!
//! ## Usage
//!
//! ```rust
//! let perms = Permissions::with_global_admins(bot.clone(), cache, admin_ids);
//!
//! // Check if user is admin
//! if perms.is_admin(chat_id, user_id).await? {
//!     // ...
//! }
//! ```

mod checker;

pub use checker::{MemberStatus, Permissions};
