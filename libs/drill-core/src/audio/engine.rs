//! Audio fallback engine.
//!
//! Resolves a logical audio request to one of several physical sources:
//! local clips tried in priority order with a bounded per-candidate wait,
//! then synthesized speech, then a terminal "unavailable" notice.
//!
//! The engine is an explicit state machine. It owns pure state and emits
//! [`Command`]s; a host adapter executes them (start a timer, load media,
//! speak) and feeds results back through the callback methods. Every
//! callback carries the [`AttemptId`] it answers; a stale id is ignored,
//! which is the cancellation guard that keeps a late timer or media event
//! from resurrecting a torn-down session.

use crate::audio::resolver::{resolve_candidates, SourceCandidate};
use crate::error::AudioError;
use crate::status::StatusKind;
use crate::types::{AudioKey, ControlId, ControlState, UnitContext};
use std::time::Duration;

/// Bounded wait for one candidate to become playable.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Cancellation token for one candidate or synthesis try. Monotonically
/// increasing; every host callback must echo the id it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

/// Which physical output a session plays through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    None,
    Local,
    Synthesized,
}

/// The single playback session. At most one exists per engine, and the
/// engine always tears it down fully before starting another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    pub output: OutputKind,
    pub control: Option<ControlId>,
    pub active: bool,
    /// Attempt that started this session; completion and failure events
    /// must echo it.
    pub started_by: Option<AttemptId>,
}

impl PlaybackSession {
    fn idle() -> Self {
        Self {
            output: OutputKind::None,
            control: None,
            active: false,
            started_by: None,
        }
    }
}

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Active(OutputKind),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub enable_local: bool,
    pub enable_synthesis: bool,
    pub ready_timeout: Duration,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable_local: true,
            enable_synthesis: true,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

/// Effect the host adapter must execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Begin loading the candidate and play it as soon as it is ready.
    /// The host answers with `source_started` or `source_failed`.
    LoadAndPlay {
        attempt: AttemptId,
        candidate: SourceCandidate,
    },
    /// Arm the bounded wait for the candidate issued alongside. The host
    /// answers with `timer_fired` when it elapses.
    StartTimer { attempt: AttemptId, after: Duration },
    /// Synthesize the display text. The host answers with
    /// `synthesis_started` or `synthesis_failed`.
    Speak { attempt: AttemptId, text: String },
    /// Pause any local media the host holds.
    PauseLocal,
    /// Cancel any pending or speaking synthesis.
    CancelSynthesis,
    /// Presentation label for a control.
    SetControl {
        control: ControlId,
        state: ControlState,
    },
    /// Post a status notice for the context that owns the control.
    Notify {
        control: ControlId,
        status: StatusKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Source,
    Synthesis,
}

#[derive(Debug)]
struct Attempt {
    id: AttemptId,
    control: ControlId,
    text: Option<String>,
    candidates: Vec<SourceCandidate>,
    next: usize,
    phase: Phase,
}

/// The audio fallback engine. One owned instance per page/session; no
/// global state.
#[derive(Debug)]
pub struct AudioEngine {
    config: AudioConfig,
    session: PlaybackSession,
    attempt: Option<Attempt>,
    next_attempt: u64,
    last_error: Option<AudioError>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new(AudioConfig::default())
    }
}

impl AudioEngine {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            session: PlaybackSession::idle(),
            attempt: None,
            next_attempt: 0,
            last_error: None,
        }
    }

    /// Request playback of `key` on behalf of `control`.
    ///
    /// If the session is already active for the same control this toggles
    /// playback off instead. Any other outstanding session or attempt is
    /// torn down unconditionally first: at most one playback is ever
    /// active.
    pub fn play(
        &mut self,
        key: &AudioKey,
        control: &ControlId,
        unit: &UnitContext,
        display_text: Option<&str>,
    ) -> Vec<Command> {
        let mut out = Vec::new();

        if self.session.active && self.session.control.as_ref() == Some(control) {
            self.teardown(&mut out);
            return out;
        }

        self.teardown(&mut out);
        self.last_error = None;

        out.push(Command::SetControl {
            control: control.clone(),
            state: ControlState::Loading,
        });

        let candidates = if self.config.enable_local {
            resolve_candidates(key, unit)
        } else {
            Vec::new()
        };
        self.attempt = Some(Attempt {
            id: AttemptId(self.next_attempt),
            control: control.clone(),
            text: display_text.map(str::to_string),
            candidates,
            next: 0,
            phase: Phase::Source,
        });
        self.advance(&mut out);
        out
    }

    /// Explicit stop: cancels any outstanding attempt and clears the
    /// session.
    pub fn stop(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        self.teardown(&mut out);
        out
    }

    /// A candidate became ready and playback began.
    pub fn source_started(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        let current = match self.take_current(attempt) {
            Some(current) => current,
            None => return out,
        };
        self.session = PlaybackSession {
            output: OutputKind::Local,
            control: Some(current.control.clone()),
            active: true,
            started_by: Some(attempt),
        };
        out.push(Command::SetControl {
            control: current.control.clone(),
            state: ControlState::Playing,
        });
        out.push(Command::Notify {
            control: current.control,
            status: StatusKind::PlayedLocal,
        });
        out
    }

    /// A candidate failed to fetch, decode, or start.
    pub fn source_failed(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        if self.is_current(attempt) {
            self.advance(&mut out);
        }
        out
    }

    /// The bounded wait for a candidate elapsed.
    pub fn timer_fired(&mut self, attempt: AttemptId) -> Vec<Command> {
        self.source_failed(attempt)
    }

    /// Speech synthesis signalled its "started" event.
    pub fn synthesis_started(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        let current = match self.take_current(attempt) {
            Some(current) => current,
            None => return out,
        };
        self.session = PlaybackSession {
            output: OutputKind::Synthesized,
            control: Some(current.control.clone()),
            active: true,
            started_by: Some(attempt),
        };
        out.push(Command::SetControl {
            control: current.control.clone(),
            state: ControlState::Playing,
        });
        out.push(Command::Notify {
            control: current.control,
            status: StatusKind::PlayedSynthesized,
        });
        out
    }

    /// Synthesis refused to start (host error or unsupported). Synthesis
    /// is the last strategy, so this is terminal.
    pub fn synthesis_failed(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        if self.is_current(attempt) {
            self.finish_unavailable(&mut out);
        }
        out
    }

    /// The active playback completed naturally.
    pub fn playback_ended(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        if self.session.active && self.session.started_by == Some(attempt) {
            self.teardown(&mut out);
        }
        out
    }

    /// The active playback failed after it had started.
    pub fn playback_failed(&mut self, attempt: AttemptId) -> Vec<Command> {
        let mut out = Vec::new();
        if self.session.active && self.session.started_by == Some(attempt) {
            let control = self.session.control.clone();
            self.teardown(&mut out);
            self.last_error = Some(AudioError::Unavailable);
            if let Some(control) = control {
                out.push(Command::Notify {
                    control,
                    status: StatusKind::PlaybackFailed,
                });
            }
        }
        out
    }

    pub fn state(&self) -> SessionState {
        if self.session.active {
            match self.session.output {
                OutputKind::None => SessionState::Idle,
                output => SessionState::Active(output),
            }
        } else if self.attempt.is_some() {
            SessionState::Loading
        } else {
            SessionState::Idle
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Terminal error of the most recent request, cleared on the next
    /// `play`.
    pub fn last_error(&self) -> Option<AudioError> {
        self.last_error
    }

    /// Issue the next candidate, fall back to synthesis, or finish as
    /// unavailable. Bumps the attempt id so anything answering the
    /// previous try is stale from here on.
    fn advance(&mut self, out: &mut Vec<Command>) {
        self.next_attempt += 1;
        let id = AttemptId(self.next_attempt);
        let timeout = self.config.ready_timeout;
        let synthesis_enabled = self.config.enable_synthesis;

        let mut speak = None;
        let mut issued = false;

        match self.attempt.as_mut() {
            None => return,
            Some(attempt) => {
                if attempt.next < attempt.candidates.len() {
                    let candidate = attempt.candidates[attempt.next].clone();
                    attempt.next += 1;
                    attempt.id = id;
                    out.push(Command::LoadAndPlay {
                        attempt: id,
                        candidate,
                    });
                    out.push(Command::StartTimer {
                        attempt: id,
                        after: timeout,
                    });
                    issued = true;
                } else if synthesis_enabled && attempt.phase == Phase::Source {
                    if let Some(text) = attempt.text.clone() {
                        attempt.id = id;
                        attempt.phase = Phase::Synthesis;
                        speak = Some(text);
                    }
                }
            }
        }

        if let Some(text) = speak {
            out.push(Command::Speak { attempt: id, text });
            issued = true;
        }
        if !issued {
            self.finish_unavailable(out);
        }
    }

    /// Terminal failure: same cleanup as success plus the failure notice.
    fn finish_unavailable(&mut self, out: &mut Vec<Command>) {
        if let Some(attempt) = self.attempt.take() {
            out.push(Command::SetControl {
                control: attempt.control.clone(),
                state: ControlState::Idle,
            });
            out.push(Command::Notify {
                control: attempt.control,
                status: StatusKind::Unavailable,
            });
        }
        self.last_error = Some(AudioError::Unavailable);
        self.session = PlaybackSession::idle();
    }

    /// Full teardown: invalidates the outstanding attempt, silences both
    /// output paths, and clears the session.
    fn teardown(&mut self, out: &mut Vec<Command>) {
        let had_attempt = self.attempt.is_some();
        if let Some(attempt) = self.attempt.take() {
            out.push(Command::SetControl {
                control: attempt.control,
                state: ControlState::Idle,
            });
        }
        if had_attempt || self.session.active {
            out.push(Command::PauseLocal);
            out.push(Command::CancelSynthesis);
        }
        if let Some(control) = self.session.control.take() {
            out.push(Command::SetControl {
                control,
                state: ControlState::Idle,
            });
        }
        self.session = PlaybackSession::idle();
    }

    fn is_current(&self, id: AttemptId) -> bool {
        matches!(&self.attempt, Some(attempt) if attempt.id == id)
    }

    fn take_current(&mut self, id: AttemptId) -> Option<Attempt> {
        if self.is_current(id) {
            self.attempt.take()
        } else {
            None
        }
    }
}
