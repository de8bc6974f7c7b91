//! Star ratings, mastery statistics, and the study timer.
//!
//! All state here round-trips through the host's opaque key→value
//! storage; nothing reads the clock itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// A fully mastered item.
pub const MAX_STARS: u8 = 5;

/// Per-item star counts, 0 through [`MAX_STARS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarBook {
    stars: BTreeMap<String, u8>,
}

impl StarBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stars for an item; unknown items have zero.
    pub fn stars(&self, id: &str) -> u8 {
        self.stars.get(id).copied().unwrap_or(0)
    }

    /// Award a star. Returns false once the item is already mastered.
    pub fn mark_correct(&mut self, id: &str) -> bool {
        let stars = self.stars.entry(id.to_string()).or_insert(0);
        if *stars >= MAX_STARS {
            return false;
        }
        *stars += 1;
        true
    }

    /// Remove a star for review. Returns false at zero.
    pub fn mark_review(&mut self, id: &str) -> bool {
        match self.stars.get_mut(id) {
            Some(stars) if *stars > 0 => {
                *stars -= 1;
                true
            }
            _ => false,
        }
    }

    /// Zero the given items (one tab's reset).
    pub fn reset_items<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.stars.insert(id.to_string(), 0);
        }
    }

    /// Zero everything.
    pub fn reset_all(&mut self) {
        self.stars.clear();
    }
}

/// Aggregated mastery for one section (words or sentences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    pub total: usize,
    pub mastered: usize,
    pub in_review: usize,
    /// Rounded percentage, 0 when the section is empty.
    pub mastery_percent: u32,
}

impl SectionStats {
    pub fn aggregate<'a>(ids: impl IntoIterator<Item = &'a str>, book: &StarBook) -> Self {
        let mut total = 0;
        let mut mastered = 0;
        for id in ids {
            total += 1;
            if book.stars(id) >= MAX_STARS {
                mastered += 1;
            }
        }
        Self {
            total,
            mastered,
            in_review: total - mastered,
            mastery_percent: percent(mastered, total),
        }
    }
}

/// Overall mastery across words and sentences combined.
pub fn overall_mastery(words: &SectionStats, sentences: &SectionStats) -> u32 {
    percent(
        words.mastered + sentences.mastered,
        words.total + sentences.total,
    )
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Persisted learning record for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Accumulated study time in minutes.
    pub total_time: f64,
    pub last_accessed: DateTime<Utc>,
    pub sessions: u32,
    pub mastery: u32,
}

impl UnitStats {
    pub fn new_session(now: DateTime<Utc>) -> Self {
        Self {
            total_time: 0.0,
            last_accessed: now,
            sessions: 1,
            mastery: 0,
        }
    }

    /// Record another visit to the unit.
    pub fn record_session(&mut self, now: DateTime<Utc>) {
        self.last_accessed = now;
        self.sessions += 1;
    }

    pub fn add_time(&mut self, minutes: f64) {
        self.total_time += minutes;
    }
}

/// Accumulates active study time. The host maps visibility changes to
/// `pause`/`start`; a hidden page does not accrue time.
#[derive(Debug, Default)]
pub struct StudyTimer {
    started: Option<Instant>,
    accumulated_minutes: f64,
}

impl StudyTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Begin accruing from `now`; no-op while already running.
    pub fn start(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
    }

    /// Stop accruing and bank the elapsed time.
    pub fn pause(&mut self, now: Instant) {
        if let Some(started) = self.started.take() {
            self.accumulated_minutes += now.duration_since(started).as_secs_f64() / 60.0;
        }
    }

    /// Bank any running time and return the accumulated minutes, leaving
    /// the timer stopped and empty.
    pub fn flush(&mut self, now: Instant) -> f64 {
        self.pause(now);
        std::mem::take(&mut self.accumulated_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn stars_clamp_at_both_ends() {
        let mut book = StarBook::new();
        assert!(!book.mark_review("w1"), "cannot go below zero");
        for _ in 0..MAX_STARS {
            assert!(book.mark_correct("w1"));
        }
        assert!(!book.mark_correct("w1"), "cannot exceed max");
        assert_eq!(book.stars("w1"), MAX_STARS);

        assert!(book.mark_review("w1"));
        assert_eq!(book.stars("w1"), MAX_STARS - 1);
    }

    #[test]
    fn section_stats_count_mastered_and_review() {
        let mut book = StarBook::new();
        for _ in 0..5 {
            book.mark_correct("w1");
        }
        book.mark_correct("w2");

        let stats = SectionStats::aggregate(["w1", "w2", "w3"], &book);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.in_review, 2);
        assert_eq!(stats.mastery_percent, 33);
    }

    #[test]
    fn empty_section_has_zero_mastery() {
        let stats = SectionStats::aggregate([], &StarBook::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.mastery_percent, 0);
    }

    #[test]
    fn overall_mastery_combines_sections() {
        let words = SectionStats {
            total: 4,
            mastered: 2,
            in_review: 2,
            mastery_percent: 50,
        };
        let sentences = SectionStats {
            total: 1,
            mastered: 1,
            in_review: 0,
            mastery_percent: 100,
        };
        assert_eq!(overall_mastery(&words, &sentences), 60);
    }

    #[test]
    fn reset_items_zeroes_only_those_items() {
        let mut book = StarBook::new();
        book.mark_correct("w1");
        book.mark_correct("s1");
        book.reset_items(["w1"]);
        assert_eq!(book.stars("w1"), 0);
        assert_eq!(book.stars("s1"), 1);
    }

    #[test]
    fn star_book_round_trips_through_json() {
        let mut book = StarBook::new();
        book.mark_correct("w1");
        book.mark_correct("w1");

        let encoded = serde_json::to_string(&book).expect("serializes");
        let decoded: StarBook = serde_json::from_str(&encoded).expect("deserializes");
        assert_eq!(book, decoded);
        assert_eq!(decoded.stars("w1"), 2);
    }

    #[test]
    fn study_timer_accrues_only_while_running() {
        let t0 = Instant::now();
        let mut timer = StudyTimer::new();

        timer.start(t0);
        timer.start(t0 + Duration::from_secs(10)); // no-op while running
        timer.pause(t0 + Duration::from_secs(60));
        timer.pause(t0 + Duration::from_secs(90)); // no-op while stopped
        timer.start(t0 + Duration::from_secs(120));

        let minutes = timer.flush(t0 + Duration::from_secs(150));
        assert!((minutes - 1.5).abs() < 1e-9);
        assert!(!timer.is_running());
        assert_eq!(timer.flush(t0 + Duration::from_secs(200)), 0.0);
    }

    #[test]
    fn unit_stats_track_sessions() {
        let now = Utc::now();
        let mut stats = UnitStats::new_session(now);
        stats.record_session(now);
        stats.add_time(2.5);
        assert_eq!(stats.sessions, 2);
        assert!((stats.total_time - 2.5).abs() < 1e-9);
    }
}
