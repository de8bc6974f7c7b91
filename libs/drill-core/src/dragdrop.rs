//! Drag-and-drop exercise engine.
//!
//! Tracks placement of draggable tokens into fixed slots with a bounded
//! undo history and an idempotent reset. All slot and token markers are
//! mutated only through the four public operations; invalid requests
//! (dragging a consumed token, dropping on an unknown slot, undoing empty
//! history) are silent no-ops, not errors.
//!
//! Invariant: a token is consumed exactly when it is the current
//! assignment of one slot in the live state. `undo` and `reset` restore
//! this precisely, including for overwritten slots.

use crate::types::{SlotId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Undo history capacity; the oldest entry is evicted first.
pub const HISTORY_CAPACITY: usize = 20;

/// Marking applied by an answer check; cleared by `undo` and `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// A slot's current content: which token and its rendered text snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub token: TokenId,
    pub text: String,
}

/// One drop target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slot {
    pub content: Option<Assignment>,
    pub verdict: Option<Verdict>,
}

impl Slot {
    pub fn is_filled(&self) -> bool {
        self.content.is_some()
    }
}

/// One draggable answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub consumed: bool,
}

/// Restoration record for one drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub slot: SlotId,
    /// Slot content before the drop, restored verbatim on undo.
    pub previous: Option<Assignment>,
    /// Token placed by the drop.
    pub token: TokenId,
}

/// Called after each successful drop, for per-exercise post-drop
/// formatting.
pub type DropCallback = Box<dyn FnMut(&SlotId, &Assignment) + Send>;

/// The drag-drop engine. One owned instance per exercise area.
pub struct DragDropEngine {
    slots: BTreeMap<SlotId, Slot>,
    tokens: BTreeMap<TokenId, Token>,
    history: VecDeque<HistoryEntry>,
    on_drop: Option<DropCallback>,
}

impl DragDropEngine {
    /// Build an engine from the exercise's slots and token texts. All
    /// slots start empty and all tokens start unconsumed.
    pub fn new<S, T>(slot_ids: S, tokens: T) -> Self
    where
        S: IntoIterator<Item = SlotId>,
        T: IntoIterator<Item = (TokenId, String)>,
    {
        Self {
            slots: slot_ids.into_iter().map(|id| (id, Slot::default())).collect(),
            tokens: tokens
                .into_iter()
                .map(|(id, text)| {
                    (
                        id,
                        Token {
                            text,
                            consumed: false,
                        },
                    )
                })
                .collect(),
            history: VecDeque::new(),
            on_drop: None,
        }
    }

    /// Register the per-exercise post-drop callback.
    pub fn with_on_drop(mut self, callback: impl FnMut(&SlotId, &Assignment) + Send + 'static) -> Self {
        self.on_drop = Some(Box::new(callback));
        self
    }

    /// Begin dragging a token. Returns false (drag suppressed) if the
    /// token is unknown or already consumed.
    pub fn start_drag(&self, token: &TokenId) -> bool {
        matches!(self.tokens.get(token), Some(t) if !t.consumed)
    }

    /// Drop `token` onto `slot`. No-op if the token is consumed or the
    /// slot is not recognized. Dropping onto a filled slot overwrites it
    /// after pushing a single history entry; the displaced token becomes
    /// draggable again.
    pub fn drop_token(&mut self, token: &TokenId, slot: &SlotId) -> bool {
        let text = match self.tokens.get(token) {
            Some(t) if !t.consumed => t.text.clone(),
            _ => return false,
        };
        if !self.slots.contains_key(slot) {
            return false;
        }

        let previous = self
            .slots
            .get(slot)
            .and_then(|s| s.content.clone());
        if let Some(displaced) = &previous {
            if let Some(t) = self.tokens.get_mut(&displaced.token) {
                t.consumed = false;
            }
        }

        self.history.push_back(HistoryEntry {
            slot: slot.clone(),
            previous,
            token: token.clone(),
        });
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        let assignment = Assignment {
            token: token.clone(),
            text,
        };
        if let Some(s) = self.slots.get_mut(slot) {
            s.content = Some(assignment.clone());
            s.verdict = None;
        }
        if let Some(t) = self.tokens.get_mut(token) {
            t.consumed = true;
        }
        if let Some(callback) = &mut self.on_drop {
            callback(slot, &assignment);
        }
        true
    }

    /// Undo the most recent drop. Strictly LIFO; restores the slot's
    /// exact prior content, clears its verdict, and reverts the placed
    /// token to draggable. No-op on empty history.
    pub fn undo(&mut self) -> bool {
        let entry = match self.history.pop_back() {
            Some(entry) => entry,
            None => return false,
        };

        if let Some(t) = self.tokens.get_mut(&entry.token) {
            t.consumed = false;
        }
        // A restored prior assignment re-consumes its token.
        if let Some(prior) = &entry.previous {
            if let Some(t) = self.tokens.get_mut(&prior.token) {
                t.consumed = true;
            }
        }
        if let Some(slot) = self.slots.get_mut(&entry.slot) {
            slot.content = entry.previous;
            slot.verdict = None;
        }
        true
    }

    /// Clear all history and restore every slot and token to the initial
    /// state. Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        for slot in self.slots.values_mut() {
            slot.content = None;
            slot.verdict = None;
        }
        for token in self.tokens.values_mut() {
            token.consumed = false;
        }
    }

    /// Mark an answer-check verdict on a filled slot.
    pub fn set_verdict(&mut self, slot: &SlotId, verdict: Verdict) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) if s.is_filled() => {
                s.verdict = Some(verdict);
                true
            }
            _ => false,
        }
    }

    pub fn slot(&self, id: &SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&SlotId, &Slot)> {
        self.slots.iter()
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&TokenId, &Token)> {
        self.tokens.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Count of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.values().filter(|s| s.is_filled()).count()
    }
}
