//! Shared identifier and context types.

use serde::{Deserialize, Serialize};

/// Logical identifier for a spoken item, resolved to zero or more
/// physical sources by the playback resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioKey(String);

impl AudioKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The UI control that triggered a playback request (e.g. one card's
/// audio button). The engine only compares and echoes these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fixed drop target expecting exactly one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A draggable answer option in an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A card or exercise area that status notices attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Presentation state the core requests for a control; the presentation
/// layer owns how these render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    Idle,
    Loading,
    Playing,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Unit scope for resolving audio clips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitContext {
    pub unit_id: String,
    /// Base path for audio assets, relative to the content root.
    pub audio_path: String,
}

impl UnitContext {
    /// Default base path used by the content layout.
    pub const DEFAULT_AUDIO_PATH: &'static str = "data/audio/";

    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            audio_path: Self::DEFAULT_AUDIO_PATH.to_string(),
        }
    }

    pub fn with_audio_path(mut self, path: impl Into<String>) -> Self {
        self.audio_path = path.into();
        self
    }
}
