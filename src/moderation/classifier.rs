//! Content classifier.
//!
//! Maps an incoming message to at most one violation category, evaluated in
//! a fixed priority order: link, then dangerous file, then media subtype,
//! then banned word. Link and file removal are security-priority; the word
//! check is cheapest and runs last since any earlier match already deletes
//! the message.
//!
//! The classifier never sees messages from admins or bots; callers filter
//! those out first.

use std::sync::LazyLock;

use regex::Regex;
use teloxide::types::{Message, MessageEntityKind};

use crate::database::{MediaKind, TenantConfig};

/// Fallback for clients that omit url entities for auto-detected links.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://|www\.|t\.me/)\S+").unwrap());

/// File extensions blocked by the file filter: executables, archives,
/// mobile packages, shell scripts. An extension denylist, not a content
/// inspection - deliberate simplification, not a security boundary.
const DANGEROUS_EXTENSIONS: &[&str] = &[
    "exe", "msi", "bat", "cmd", "com", "scr", "vbs", "js", "jar", // Windows
    "apk", "xapk", "apks", // Android
    "ipa",  // iOS
    "deb", "rpm", // Linux packages
    "dmg", "pkg", "app", // macOS
    "sh", "run", // Shell scripts
    "dll", "sys", "drv", // System files
    "zip", "rar", "7z", "tar", "gz", "bz2", "xz", // Archives
];

/// A single violation category. A message maps to at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Message contains a hyperlink.
    Link,
    /// Message carries a document with a blocked extension.
    File(String),
    /// Message carries filtered media of the given subtype.
    Media(MediaKind),
    /// Message text contains a filtered word.
    BannedWord(String),
}

impl Violation {
    /// Short reason string for notices and the audit log.
    pub fn reason(&self) -> String {
        match self {
            Self::Link => "Link detected (antilink)".to_string(),
            Self::File(ext) => format!("Blocked file type: .{}", ext),
            Self::Media(kind) => format!("Filtered media: {}", kind.as_str()),
            Self::BannedWord(word) => format!("Filtered word: {}", word),
        }
    }
}

/// The classifier-relevant facts of a message, extracted from the platform
/// type so classification itself stays a pure function.
#[derive(Debug, Clone, Default)]
pub struct MessageFacts<'a> {
    pub text: Option<&'a str>,
    /// Message carries an explicit url or text_link entity.
    pub has_link_entity: bool,
    /// File name of an attached document, if any.
    pub document_name: Option<&'a str>,
    /// Media subtype carried by the message, if any.
    pub media: Option<MediaKind>,
}

impl<'a> MessageFacts<'a> {
    pub fn from_message(msg: &'a Message) -> Self {
        let has_link_entity = msg
            .entities()
            .map(|entities| {
                entities.iter().any(|e| {
                    matches!(
                        e.kind,
                        MessageEntityKind::Url | MessageEntityKind::TextLink { .. }
                    )
                })
            })
            .unwrap_or(false);

        let media = if msg.photo().is_some() {
            Some(MediaKind::Photo)
        } else if msg.video().is_some() {
            Some(MediaKind::Video)
        } else if msg.audio().is_some() {
            Some(MediaKind::Audio)
        } else if msg.voice().is_some() {
            Some(MediaKind::Voice)
        } else if msg.sticker().is_some() {
            Some(MediaKind::Sticker)
        } else if msg.animation().is_some() {
            Some(MediaKind::Animation)
        } else if msg.video_note().is_some() {
            Some(MediaKind::VideoNote)
        } else {
            None
        };

        Self {
            text: msg.text(),
            has_link_entity,
            document_name: msg.document().and_then(|d| d.file_name.as_deref()),
            media,
        }
    }
}

/// Classify a message against a tenant's content filters.
pub fn classify(
    tenant: &TenantConfig,
    msg: &Message,
    filter_words: &[String],
) -> Option<Violation> {
    classify_facts(tenant, &MessageFacts::from_message(msg), filter_words)
}

/// Classify extracted message facts. Priority order is fixed:
/// LINK > FILE > MEDIA > BANNED_WORD, first match wins.
pub fn classify_facts(
    tenant: &TenantConfig,
    facts: &MessageFacts<'_>,
    filter_words: &[String],
) -> Option<Violation> {
    if tenant.antilink_enabled
        && let Some(text) = facts.text
        && (facts.has_link_entity || URL_PATTERN.is_match(text))
    {
        return Some(Violation::Link);
    }

    if tenant.antifile_enabled
        && let Some(name) = facts.document_name
        && let Some(ext) = dangerous_extension(name)
    {
        return Some(Violation::File(ext));
    }

    if let Some(kind) = facts.media
        && tenant.media_filters.is_enabled(kind)
    {
        return Some(Violation::Media(kind));
    }

    if tenant.word_filter_enabled
        && let Some(text) = facts.text
    {
        let text_lower = text.to_lowercase();
        for word in filter_words {
            if text_lower.contains(word.as_str()) {
                return Some(Violation::BannedWord(word.clone()));
            }
        }
    }

    None
}

/// Extract the extension if the file name ends in a blocked one.
fn dangerous_extension(file_name: &str) -> Option<String> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    DANGEROUS_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantConfig {
        TenantConfig::new(-100123, "Test", "supergroup", 3)
    }

    fn text_facts(text: &str) -> MessageFacts<'_> {
        MessageFacts {
            text: Some(text),
            ..Default::default()
        }
    }

    #[test]
    fn link_beats_banned_word() {
        let t = tenant();
        let words = vec!["spam".to_string()];
        let facts = text_facts("spam here: https://example.com");

        assert_eq!(classify_facts(&t, &facts, &words), Some(Violation::Link));
    }

    #[test]
    fn link_via_entity_without_url_text() {
        let t = tenant();
        let facts = MessageFacts {
            text: Some("click here"),
            has_link_entity: true,
            ..Default::default()
        };

        assert_eq!(classify_facts(&t, &facts, &[]), Some(Violation::Link));
    }

    #[test]
    fn link_regex_fallback_catches_bare_domains() {
        let t = tenant();
        for text in ["visit www.example.com now", "t.me/somechannel", "HTTPS://UPPER.CASE"] {
            assert_eq!(
                classify_facts(&t, &text_facts(text), &[]),
                Some(Violation::Link),
                "should flag '{}'",
                text
            );
        }
        assert_eq!(classify_facts(&t, &text_facts("no links here"), &[]), None);
    }

    #[test]
    fn disabled_antilink_ignores_links() {
        let mut t = tenant();
        t.antilink_enabled = false;

        let facts = text_facts("https://example.com");
        assert_eq!(classify_facts(&t, &facts, &[]), None);
    }

    #[test]
    fn dangerous_file_extensions() {
        let t = tenant();
        let facts = MessageFacts {
            document_name: Some("Setup.EXE"),
            ..Default::default()
        };

        assert_eq!(
            classify_facts(&t, &facts, &[]),
            Some(Violation::File("exe".to_string()))
        );

        let safe = MessageFacts {
            document_name: Some("notes.txt"),
            ..Default::default()
        };
        assert_eq!(classify_facts(&t, &safe, &[]), None);

        let no_ext = MessageFacts {
            document_name: Some("README"),
            ..Default::default()
        };
        assert_eq!(classify_facts(&t, &no_ext, &[]), None);
    }

    #[test]
    fn media_respects_per_kind_toggle() {
        let mut t = tenant();
        let facts = MessageFacts {
            media: Some(MediaKind::Sticker),
            ..Default::default()
        };

        assert_eq!(
            classify_facts(&t, &facts, &[]),
            Some(Violation::Media(MediaKind::Sticker))
        );

        t.media_filters.sticker = false;
        assert_eq!(classify_facts(&t, &facts, &[]), None);
    }

    #[test]
    fn banned_word_is_case_insensitive_substring() {
        let t = tenant();
        let words = vec!["casino".to_string()];

        assert_eq!(
            classify_facts(&t, &text_facts("Best CASINO bonuses"), &words),
            Some(Violation::BannedWord("casino".to_string()))
        );
        assert_eq!(classify_facts(&t, &text_facts("nothing here"), &words), None);
    }

    #[test]
    fn clean_message_classifies_to_none() {
        let t = tenant();
        assert_eq!(classify_facts(&t, &text_facts("hello world"), &[]), None);
    }
}
