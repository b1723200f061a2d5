//! Database model exports.

mod moderation;
mod tenant;

pub use moderation::{
    ActionKind, FilterWord, MemberEvent, MemberEventKind, ModerationLogEntry, WarningRecord,
};
pub use tenant::{MediaFilters, MediaKind, TenantConfig};
