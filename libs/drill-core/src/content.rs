//! Unit content model.
//!
//! Serde shapes for the unit index and per-unit data files, plus the
//! unit-scoped text lookup the synthesis fallback relies on. Loading the
//! files from disk or network belongs to the host, not here.

use crate::dragdrop::DragDropEngine;
use crate::types::{AudioKey, SlotId, TokenId};
use serde::{Deserialize, Serialize};

/// Top-level `units-index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitIndex {
    pub units: Vec<UnitSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: String,
    pub title: String,
}

/// One vocabulary word or sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabItem {
    pub id: String,
    pub english: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Logical audio key for this item.
    pub audio: String,
}

/// Per-unit content file (`{unit}.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_description: Option<String>,
    #[serde(default)]
    pub words: Vec<VocabItem>,
    #[serde(default)]
    pub sentences: Vec<VocabItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Exercises>,
}

impl UnitData {
    /// Display text for a logical audio key, or the key itself if no
    /// word or sentence carries it.
    pub fn resolve_text<'a>(&'a self, key: &'a AudioKey) -> &'a str {
        self.words
            .iter()
            .chain(self.sentences.iter())
            .find(|item| item.audio == key.as_str())
            .map(|item| item.english.as_str())
            .unwrap_or_else(|| key.as_str())
    }

    /// Ids of every word and sentence, for star/progress aggregation.
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.words
            .iter()
            .chain(self.sentences.iter())
            .map(|item| item.id.as_str())
    }
}

/// Optional exercise sections of a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercises {
    #[serde(default, rename = "vocabDrag", skip_serializing_if = "Option::is_none")]
    pub vocab_drag: Option<VocabDrag>,
    #[serde(default, rename = "sevenFive", skip_serializing_if = "Option::is_none")]
    pub seven_five: Option<SevenFive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloze: Option<FillInText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar: Option<FillInText>,
}

/// Vocabulary drag exercise: tokens dropped into sentence gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabDrag {
    pub options: Vec<String>,
    /// Sentences with a `{{gap}}` placeholder each.
    pub sentences: Vec<String>,
    pub answers: Vec<String>,
}

impl VocabDrag {
    /// Token id for option `index`, matching the presentation's element
    /// ids.
    pub fn token_id(index: usize) -> TokenId {
        TokenId::new(format!("vd-{index}"))
    }

    /// Slot id for sentence gap `index`.
    pub fn slot_id(index: usize) -> SlotId {
        SlotId::new(format!("vd-drop-{index}"))
    }

    /// Build a drag-drop engine over this exercise's options and gaps.
    pub fn build_engine(&self) -> DragDropEngine {
        DragDropEngine::new(
            (0..self.sentences.len()).map(Self::slot_id),
            self.options
                .iter()
                .enumerate()
                .map(|(index, text)| (Self::token_id(index), text.clone())),
        )
    }
}

/// Phrase-ordering exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SevenFive {
    pub options: Vec<SevenFiveOption>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SevenFiveOption {
    pub text: String,
}

/// Cloze or grammar text with inline inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillInText {
    pub text: String,
}
