//! Utility functions.
//!
//! HTML escaping, user mentions, welcome-template fillings, and duration
//! parsing/formatting used across handlers.

use teloxide::types::{ChatPermissions, User};

/// The permission set restored when a user is unmuted.
pub fn full_permissions() -> ChatPermissions {
    ChatPermissions::empty()
        | ChatPermissions::SEND_MESSAGES
        | ChatPermissions::SEND_AUDIOS
        | ChatPermissions::SEND_DOCUMENTS
        | ChatPermissions::SEND_PHOTOS
        | ChatPermissions::SEND_VIDEOS
        | ChatPermissions::SEND_VIDEO_NOTES
        | ChatPermissions::SEND_VOICE_NOTES
        | ChatPermissions::SEND_POLLS
        | ChatPermissions::SEND_OTHER_MESSAGES
        | ChatPermissions::ADD_WEB_PAGE_PREVIEWS
        | ChatPermissions::CHANGE_INFO
        | ChatPermissions::INVITE_USERS
        | ChatPermissions::PIN_MESSAGES
        | ChatPermissions::MANAGE_TOPICS
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// HTML mention link for a user.
pub fn mention(user: &User) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user.id,
        html_escape(&user.first_name)
    )
}

/// Apply fillings (placeholders) to a message template.
///
/// Fillings:
/// - `{first}` - First name
/// - `{last}` - Last name
/// - `{fullname}` - Full name
/// - `{username}` - @username, or a mention when the user has none
/// - `{mention}` - Mention with name
/// - `{id}` - User ID
/// - `{chatname}` / `{group}` - Chat name
/// - `{time}` - Current local time (HH:MM)
pub fn apply_fillings(template: &str, user: &User, chat_name: &str) -> String {
    let time = chrono::Local::now().format("%H:%M").to_string();
    apply_fillings_at(template, user, chat_name, &time)
}

/// Same as [`apply_fillings`] with an explicit time string for tests.
pub fn apply_fillings_at(template: &str, user: &User, chat_name: &str, time: &str) -> String {
    let first = &user.first_name;
    let last = user.last_name.as_deref().unwrap_or("");
    let fullname = if last.is_empty() {
        first.clone()
    } else {
        format!("{} {}", first, last)
    };
    let username = user
        .username
        .as_ref()
        .map(|u| format!("@{}", u))
        .unwrap_or_else(|| mention(user));

    template
        .replace("{first}", &html_escape(first))
        .replace("{last}", &html_escape(last))
        .replace("{fullname}", &html_escape(&fullname))
        .replace("{username}", &username)
        .replace("{mention}", &mention(user))
        .replace("{id}", &user.id.to_string())
        .replace("{chatname}", &html_escape(chat_name))
        .replace("{group}", &html_escape(chat_name))
        .replace("{time}", time)
}

/// Format a duration in seconds for display (e.g. "2 hours 30 minutes").
pub fn format_duration_full(secs: u64) -> String {
    if secs < 60 {
        format!("{} seconds", secs)
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{} hours {} minutes", hours, mins)
        } else {
            format!("{} hours", hours)
        }
    } else {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{} days {} hours", days, hours)
        } else {
            format!("{} days", days)
        }
    }
}

/// Parse a duration string (e.g. "1h", "30m", "1d").
///
/// Supported units: m (minutes), h (hours), d (days), w (weeks).
pub fn parse_duration(input: &str) -> Option<std::time::Duration> {
    let input = input.trim();
    if input.len() < 2 {
        return None;
    }

    let (digits, unit) = input.split_at(input.len() - 1);
    let amount: u64 = digits.parse().ok()?;

    let seconds = match unit {
        "m" => amount * 60,
        "h" => amount * 3600,
        "d" => amount * 86400,
        "w" => amount * 604800,
        _ => return None,
    };

    Some(std::time::Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn user() -> User {
        User {
            id: UserId(42),
            is_bot: false,
            first_name: "Alice".to_string(),
            last_name: None,
            username: None,
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_fillings() {
        let text = apply_fillings_at(
            "Hi {first}, welcome to {chatname} at {time}!",
            &user(),
            "My Group",
            "12:34",
        );
        assert_eq!(text, "Hi Alice, welcome to My Group at 12:34!");
    }

    #[test]
    fn fillings_escape_names() {
        let mut u = user();
        u.first_name = "<Alice>".to_string();
        let text = apply_fillings_at("{first}", &u, "G", "00:00");
        assert_eq!(text, "&lt;Alice&gt;");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30m"), Some(std::time::Duration::from_secs(1800)));
        assert_eq!(parse_duration("1h"), Some(std::time::Duration::from_secs(3600)));
        assert_eq!(parse_duration("1d"), Some(std::time::Duration::from_secs(86400)));
        assert_eq!(parse_duration("1w"), Some(std::time::Duration::from_secs(604800)));
        assert_eq!(parse_duration("invalid"), None);
        assert_eq!(parse_duration("m"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_full(45), "45 seconds");
        assert_eq!(format_duration_full(300), "5 minutes");
        assert_eq!(format_duration_full(9000), "2 hours 30 minutes");
        assert_eq!(format_duration_full(86400), "1 days");
    }
}
