//! Core engines for an interactive vocabulary/sentence drill application.
//!
//! Provides:
//! - Playback source resolution and the audio fallback engine
//! - Drag-and-drop exercise engine with bounded undo history
//! - Transient status notices for both engines
//! - Unit content model and star/progress tracking
//!
//! The engines hold pure state and never touch I/O directly: the audio
//! engine emits [`Command`]s that a host adapter executes, and every
//! time-dependent operation takes the current time as an argument.

pub mod audio;
pub mod content;
pub mod dragdrop;
pub mod error;
pub mod progress;
pub mod status;
pub mod types;

pub use audio::engine::{
    AttemptId, AudioConfig, AudioEngine, Command, OutputKind, PlaybackSession, SessionState,
    DEFAULT_READY_TIMEOUT,
};
pub use audio::resolver::{resolve_candidates, ClipFormat, ClipScope, SourceCandidate};
pub use content::{Exercises, UnitData, UnitIndex, UnitSummary, VocabDrag, VocabItem};
pub use dragdrop::{
    Assignment, DragDropEngine, HistoryEntry, Slot, Token, Verdict, HISTORY_CAPACITY,
};
pub use error::{AudioError, Result};
pub use progress::{SectionStats, StarBook, StudyTimer, UnitStats, MAX_STARS};
pub use status::{StatusKind, StatusNotice, StatusReporter, DEFAULT_NOTICE_DURATION};
pub use types::{AudioKey, ContextId, ControlId, ControlState, SlotId, TokenId, UnitContext};
