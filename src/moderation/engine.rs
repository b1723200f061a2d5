//! Moderation decision engine.
//!
//! A single decision function turns classifier output plus the user's
//! warning state into a structured enforcement decision. The executor in
//! `events::messages` performs the side effects; nothing here touches the
//! transport, so the transition logic is fully testable.
//!
//! Escalation is a kick-equivalent: ban immediately followed by unban,
//! permitting rejoin. The platform has no direct "remove without blocking"
//! primitive, so kick semantics are layered on ban/unban.

use std::time::Duration;

use super::classifier::Violation;

/// Flood penalty: fixed-duration mute. Flooding is a rate problem, not a
/// content problem, so it bypasses the warning ladder entirely.
pub const FLOOD_MUTE: Duration = Duration::from_secs(300);

/// How long enforcement notices stay in the chat before scheduled deletion.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Word-filter notices are the least interesting; they go away faster.
pub const WORD_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Structured enforcement decision for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Delete the message and mute the sender for `mute`.
    FloodMuted { mute: Duration },
    /// Delete the message; the sender now has `count` of `max` warnings.
    Warned { count: u32, max: u32 },
    /// Delete the message; the warning limit is reached - kick-equivalent
    /// and reset the counter.
    Escalated { max: u32 },
    /// Delete the message and post a short-lived notice; no warning issued.
    WordDeleted { word: String },
}

impl Decision {
    /// How long the notice for this decision should stay visible.
    pub fn notice_ttl(&self) -> Duration {
        match self {
            Self::WordDeleted { .. } => WORD_NOTICE_TTL,
            _ => NOTICE_TTL,
        }
    }
}

/// Decision for a flood violation.
pub fn decide_flood() -> Decision {
    Decision::FloodMuted { mute: FLOOD_MUTE }
}

/// Whether a violation category participates in the warning ladder.
///
/// Link, file, and media violations escalate; filtered words only delete.
pub fn violation_warns(violation: &Violation) -> bool {
    !matches!(violation, Violation::BannedWord(_))
}

/// Decision for a content violation, given the warning count *after* the
/// increment for this violation.
///
/// Reaching the limit escalates and implies a counter reset, so a user is
/// never left sitting at `max` warnings.
pub fn decide(violation: &Violation, new_count: u32, max_warnings: u32) -> Decision {
    match violation {
        Violation::BannedWord(word) => Decision::WordDeleted { word: word.clone() },
        Violation::Link | Violation::File(_) | Violation::Media(_) => {
            if new_count >= max_warnings {
                Decision::Escalated { max: max_warnings }
            } else {
                Decision::Warned {
                    count: new_count,
                    max: max_warnings,
                }
            }
        }
    }
}

/// Outcome of an explicit `/warn`, sharing the escalation arithmetic with
/// automatic violations.
pub fn warn_outcome(new_count: u32, max_warnings: u32) -> Decision {
    if new_count >= max_warnings {
        Decision::Escalated { max: max_warnings }
    } else {
        Decision::Warned {
            count: new_count,
            max: max_warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MediaKind;

    #[test]
    fn warns_below_limit() {
        for n in 1..3 {
            assert_eq!(
                decide(&Violation::Link, n, 3),
                Decision::Warned { count: n, max: 3 }
            );
        }
    }

    #[test]
    fn escalates_exactly_at_limit() {
        assert_eq!(decide(&Violation::Link, 3, 3), Decision::Escalated { max: 3 });
        // Defensive: a count that somehow overshoots still escalates
        assert_eq!(decide(&Violation::Link, 4, 3), Decision::Escalated { max: 3 });
    }

    #[test]
    fn custom_limit_escalates_once_at_k() {
        let k = 5;
        let mut escalations = 0;
        for n in 1..=k {
            if matches!(decide(&Violation::File("exe".into()), n, k), Decision::Escalated { .. }) {
                escalations += 1;
            }
        }
        assert_eq!(escalations, 1);
    }

    #[test]
    fn banned_word_never_escalates() {
        let v = Violation::BannedWord("spam".to_string());
        assert!(!violation_warns(&v));
        assert_eq!(
            decide(&v, 99, 3),
            Decision::WordDeleted {
                word: "spam".to_string()
            }
        );
    }

    #[test]
    fn media_violations_warn() {
        let v = Violation::Media(MediaKind::Voice);
        assert!(violation_warns(&v));
        assert_eq!(decide(&v, 1, 3), Decision::Warned { count: 1, max: 3 });
    }

    #[test]
    fn flood_is_a_fixed_mute() {
        assert_eq!(
            decide_flood(),
            Decision::FloodMuted {
                mute: Duration::from_secs(300)
            }
        );
    }

    #[test]
    fn word_notices_expire_faster() {
        let word = Decision::WordDeleted {
            word: "x".to_string(),
        };
        assert_eq!(word.notice_ttl(), WORD_NOTICE_TTL);
        assert_eq!(decide_flood().notice_ttl(), NOTICE_TTL);
    }

    #[test]
    fn explicit_warn_shares_escalation_arithmetic() {
        assert_eq!(warn_outcome(2, 3), Decision::Warned { count: 2, max: 3 });
        assert_eq!(warn_outcome(3, 3), Decision::Escalated { max: 3 });
    }
}
