//! Playback source resolution.
//!
//! Maps a logical audio key to an ordered list of physical source
//! candidates. The order is the retry order under failure: unit-scoped
//! clip in the primary format first, then the secondary format, then the
//! unit-agnostic clip in the primary format.

use crate::types::{AudioKey, UnitContext};
use serde::{Deserialize, Serialize};

/// Clip container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipFormat {
    Mp3,
    M4a,
}

impl ClipFormat {
    /// Primary format tried first at every scope.
    pub const PRIMARY: ClipFormat = ClipFormat::Mp3;

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }
}

/// Whether a clip lives under the current unit or at the shared root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipScope {
    Unit,
    Global,
}

/// One concrete playable asset location and format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    pub scope: ClipScope,
    pub format: ClipFormat,
    /// Path relative to the content root.
    pub path: String,
}

/// Enumerate candidate sources for a logical audio key, highest priority
/// first. Pure and deterministic.
pub fn resolve_candidates(key: &AudioKey, unit: &UnitContext) -> Vec<SourceCandidate> {
    let unit_path = |format: ClipFormat| {
        format!(
            "{}{}/{}.{}",
            unit.audio_path,
            unit.unit_id,
            key.as_str(),
            format.extension()
        )
    };

    vec![
        SourceCandidate {
            scope: ClipScope::Unit,
            format: ClipFormat::Mp3,
            path: unit_path(ClipFormat::Mp3),
        },
        SourceCandidate {
            scope: ClipScope::Unit,
            format: ClipFormat::M4a,
            path: unit_path(ClipFormat::M4a),
        },
        SourceCandidate {
            scope: ClipScope::Global,
            format: ClipFormat::Mp3,
            path: format!(
                "{}{}.{}",
                unit.audio_path,
                key.as_str(),
                ClipFormat::Mp3.extension()
            ),
        },
    ]
}
