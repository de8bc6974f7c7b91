//! Transient, auto-expiring status notices.
//!
//! Both engines report terminal outcomes here ("played via fallback",
//! "operation failed"). A notice attaches to a context (one card or
//! exercise area); re-notifying the same context replaces the notice and
//! resets its deadline. Notices on different contexts are independent.

use crate::types::ContextId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Default display duration for a notice.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(2000);

/// What a notice reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Served from a locally hosted clip.
    PlayedLocal,
    /// Served via speech synthesis fallback.
    PlayedSynthesized,
    /// Every playback strategy was exhausted.
    Unavailable,
    /// Playback started and then failed.
    PlaybackFailed,
    /// Free-form message from the presentation layer.
    Message(String),
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayedLocal => write!(f, "played from local clip"),
            Self::PlayedSynthesized => write!(f, "played via speech synthesis"),
            Self::Unavailable => write!(f, "audio unavailable"),
            Self::PlaybackFailed => write!(f, "playback failed"),
            Self::Message(msg) => write!(f, "{msg}"),
        }
    }
}

/// One live notice with its expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub kind: StatusKind,
    expires_at: Instant,
}

impl StatusNotice {
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

/// Tracks live notices per context.
///
/// Time is always passed in by the caller, so expiry is fully testable.
#[derive(Debug, Default)]
pub struct StatusReporter {
    notices: BTreeMap<ContextId, StatusNotice>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or replace the notice under `context`. Each call resets
    /// that context's own deadline.
    pub fn notify(&mut self, context: ContextId, kind: StatusKind, duration: Duration, now: Instant) {
        self.notices.insert(
            context,
            StatusNotice {
                kind,
                expires_at: now + duration,
            },
        );
    }

    /// `notify` with the default display duration.
    pub fn notify_default(&mut self, context: ContextId, kind: StatusKind, now: Instant) {
        self.notify(context, kind, DEFAULT_NOTICE_DURATION, now);
    }

    /// The live notice for `context`, if it has not expired by `now`.
    pub fn active(&self, context: &ContextId, now: Instant) -> Option<&StatusKind> {
        self.notices
            .get(context)
            .filter(|notice| notice.expires_at > now)
            .map(|notice| &notice.kind)
    }

    /// Drop every notice whose deadline has passed; returns the contexts
    /// that cleared, in context order.
    pub fn expire(&mut self, now: Instant) -> Vec<ContextId> {
        let expired: Vec<ContextId> = self
            .notices
            .iter()
            .filter(|(_, notice)| notice.expires_at <= now)
            .map(|(context, _)| context.clone())
            .collect();
        for context in &expired {
            self.notices.remove(context);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(id: &str) -> ContextId {
        ContextId::new(id)
    }

    #[test]
    fn notice_expires_after_duration() {
        let t0 = Instant::now();
        let mut reporter = StatusReporter::new();
        reporter.notify_default(ctx("card-1"), StatusKind::PlayedLocal, t0);

        assert_eq!(
            reporter.active(&ctx("card-1"), t0 + Duration::from_millis(1999)),
            Some(&StatusKind::PlayedLocal)
        );
        assert_eq!(
            reporter.active(&ctx("card-1"), t0 + Duration::from_millis(2000)),
            None
        );
    }

    #[test]
    fn renotify_resets_the_deadline() {
        let t0 = Instant::now();
        let mut reporter = StatusReporter::new();
        reporter.notify_default(ctx("card-1"), StatusKind::PlayedLocal, t0);
        reporter.notify_default(
            ctx("card-1"),
            StatusKind::Unavailable,
            t0 + Duration::from_millis(1500),
        );

        // Old deadline has passed, new one has not.
        assert_eq!(
            reporter.active(&ctx("card-1"), t0 + Duration::from_millis(3000)),
            Some(&StatusKind::Unavailable)
        );
    }

    #[test]
    fn contexts_expire_independently() {
        let t0 = Instant::now();
        let mut reporter = StatusReporter::new();
        reporter.notify(ctx("a"), StatusKind::PlayedLocal, Duration::from_millis(100), t0);
        reporter.notify(ctx("b"), StatusKind::PlayedSynthesized, Duration::from_millis(500), t0);

        let cleared = reporter.expire(t0 + Duration::from_millis(200));
        assert_eq!(cleared, vec![ctx("a")]);
        assert_eq!(
            reporter.active(&ctx("b"), t0 + Duration::from_millis(200)),
            Some(&StatusKind::PlayedSynthesized)
        );
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn custom_message_displays_verbatim() {
        let kind = StatusKind::Message("3 of 5 correct".to_string());
        assert_eq!(kind.to_string(), "3 of 5 correct");
    }
}
