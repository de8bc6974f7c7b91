//! Async adapter for the audio fallback engine.
//!
//! Executes engine [`Command`]s against a [`MediaHost`], arming bounded
//! waits on tokio timers, and pumps host events back into the engine.
//! Stale events carry superseded attempt ids and the engine drops them,
//! so late timers never resurrect a torn-down session.

use drill_core::{
    AttemptId, AudioEngine, AudioError, AudioKey, Command, ContextId, ControlId, ControlState,
    SessionState, SourceCandidate, StatusKind, StatusReporter, UnitContext,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Host media capability: begin local playback or speech synthesis.
///
/// Implementations answer asynchronously through the [`HostEvent`]
/// channel; a synchronous refusal is returned as an error and converted
/// into the matching failure event by the driver.
pub trait MediaHost: Send {
    fn load_and_play(
        &mut self,
        attempt: AttemptId,
        candidate: &SourceCandidate,
    ) -> Result<(), AudioError>;

    fn speak(&mut self, attempt: AttemptId, text: &str) -> Result<(), AudioError>;

    fn pause(&mut self);

    fn cancel_speech(&mut self);
}

/// Asynchronous answers from the host (and from armed timers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    SourceStarted(AttemptId),
    SourceFailed(AttemptId),
    SynthesisStarted(AttemptId),
    SynthesisFailed(AttemptId),
    PlaybackEnded(AttemptId),
    PlaybackFailed(AttemptId),
    TimerFired(AttemptId),
}

/// Create the event channel shared by a host and its driver.
pub fn host_channel() -> (UnboundedSender<HostEvent>, UnboundedReceiver<HostEvent>) {
    mpsc::unbounded_channel()
}

/// Drives one [`AudioEngine`] against one [`MediaHost`].
pub struct AudioDriver<H: MediaHost> {
    engine: AudioEngine,
    host: H,
    events_tx: UnboundedSender<HostEvent>,
    events_rx: UnboundedReceiver<HostEvent>,
    reporter: StatusReporter,
    controls: BTreeMap<ControlId, ControlState>,
}

impl<H: MediaHost> AudioDriver<H> {
    pub fn new(
        engine: AudioEngine,
        host: H,
        events_tx: UnboundedSender<HostEvent>,
        events_rx: UnboundedReceiver<HostEvent>,
    ) -> Self {
        Self {
            engine,
            host,
            events_tx,
            events_rx,
            reporter: StatusReporter::new(),
            controls: BTreeMap::new(),
        }
    }

    /// Request playback; must run inside a tokio runtime (timers are
    /// spawned).
    pub fn play(
        &mut self,
        key: &AudioKey,
        control: &ControlId,
        unit: &UnitContext,
        display_text: Option<&str>,
    ) {
        let commands = self.engine.play(key, control, unit, display_text);
        self.execute(commands);
    }

    pub fn stop(&mut self) {
        let commands = self.engine.stop();
        self.execute(commands);
    }

    /// Pump host events until the engine leaves the loading state, then
    /// report where it settled.
    pub async fn run_until_settled(&mut self) -> SessionState {
        while self.engine.state() == SessionState::Loading {
            let event = match self.events_rx.recv().await {
                Some(event) => event,
                None => break,
            };
            self.dispatch(event);
        }
        self.engine.state()
    }

    /// Feed one host event into the engine and execute the fallout.
    pub fn dispatch(&mut self, event: HostEvent) {
        let commands = match event {
            HostEvent::SourceStarted(attempt) => self.engine.source_started(attempt),
            HostEvent::SourceFailed(attempt) => self.engine.source_failed(attempt),
            HostEvent::SynthesisStarted(attempt) => self.engine.synthesis_started(attempt),
            HostEvent::SynthesisFailed(attempt) => self.engine.synthesis_failed(attempt),
            HostEvent::PlaybackEnded(attempt) => self.engine.playback_ended(attempt),
            HostEvent::PlaybackFailed(attempt) => self.engine.playback_failed(attempt),
            HostEvent::TimerFired(attempt) => self.engine.timer_fired(attempt),
        };
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::LoadAndPlay { attempt, candidate } => {
                    debug!(path = %candidate.path, "trying candidate");
                    if let Err(error) = self.host.load_and_play(attempt, &candidate) {
                        debug!(%error, path = %candidate.path, "candidate unavailable");
                        let _ = self.events_tx.send(HostEvent::SourceFailed(attempt));
                    }
                }
                Command::StartTimer { attempt, after } => {
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(HostEvent::TimerFired(attempt));
                    });
                }
                Command::Speak { attempt, text } => {
                    if let Err(error) = self.host.speak(attempt, &text) {
                        warn!(%error, "speech synthesis refused");
                        let _ = self.events_tx.send(HostEvent::SynthesisFailed(attempt));
                    }
                }
                Command::PauseLocal => self.host.pause(),
                Command::CancelSynthesis => self.host.cancel_speech(),
                Command::SetControl { control, state } => {
                    debug!(control = control.as_str(), ?state, "control state");
                    self.controls.insert(control, state);
                }
                Command::Notify { control, status } => {
                    info!(control = control.as_str(), %status, "status notice");
                    let context = ContextId::new(control.as_str());
                    self.reporter.notify_default(context, status, Instant::now());
                }
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    pub fn control_state(&self, control: &ControlId) -> ControlState {
        self.controls.get(control).copied().unwrap_or_default()
    }
}

/// Media host that treats an on-disk clip as playable and logs playback
/// instead of producing sound. Synthesis always starts.
pub struct FsMediaHost {
    root: PathBuf,
    events: UnboundedSender<HostEvent>,
}

impl FsMediaHost {
    pub fn new(root: PathBuf, events: UnboundedSender<HostEvent>) -> Self {
        Self { root, events }
    }
}

impl MediaHost for FsMediaHost {
    fn load_and_play(
        &mut self,
        attempt: AttemptId,
        candidate: &SourceCandidate,
    ) -> Result<(), AudioError> {
        let path = self.root.join(&candidate.path);
        if path.is_file() {
            info!(path = %path.display(), "playing local clip");
            let _ = self.events.send(HostEvent::SourceStarted(attempt));
            Ok(())
        } else {
            Err(AudioError::SourceUnavailable)
        }
    }

    fn speak(&mut self, attempt: AttemptId, text: &str) -> Result<(), AudioError> {
        info!(text, "speaking");
        let _ = self.events.send(HostEvent::SynthesisStarted(attempt));
        Ok(())
    }

    fn pause(&mut self) {
        debug!("pausing local media");
    }

    fn cancel_speech(&mut self) {
        debug!("cancelling synthesis");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::{AudioError, OutputKind};
    use pretty_assertions::assert_eq;

    /// Host scripted with the set of candidate paths it can play.
    struct ScriptedHost {
        playable: Vec<String>,
        speech_ok: bool,
        acknowledge: bool,
        events: UnboundedSender<HostEvent>,
    }

    impl MediaHost for ScriptedHost {
        fn load_and_play(
            &mut self,
            attempt: AttemptId,
            candidate: &SourceCandidate,
        ) -> Result<(), AudioError> {
            if !self.playable.iter().any(|path| path == &candidate.path) {
                return Err(AudioError::SourceUnavailable);
            }
            if self.acknowledge {
                let _ = self.events.send(HostEvent::SourceStarted(attempt));
            }
            Ok(())
        }

        fn speak(&mut self, attempt: AttemptId, _text: &str) -> Result<(), AudioError> {
            if !self.speech_ok {
                return Err(AudioError::SynthesisUnsupported);
            }
            let _ = self.events.send(HostEvent::SynthesisStarted(attempt));
            Ok(())
        }

        fn pause(&mut self) {}

        fn cancel_speech(&mut self) {}
    }

    fn driver_with(playable: Vec<String>, speech_ok: bool) -> AudioDriver<ScriptedHost> {
        let (tx, rx) = host_channel();
        let host = ScriptedHost {
            playable,
            speech_ok,
            acknowledge: true,
            events: tx.clone(),
        };
        AudioDriver::new(AudioEngine::default(), host, tx, rx)
    }

    fn request(driver: &mut AudioDriver<ScriptedHost>) {
        driver.play(
            &AudioKey::new("hello"),
            &ControlId::new("btn"),
            &UnitContext::new("u1"),
            Some("hello"),
        );
    }

    #[tokio::test]
    async fn plays_the_first_available_candidate() {
        let mut driver = driver_with(vec!["data/audio/u1/hello.m4a".to_string()], true);
        request(&mut driver);
        let state = driver.run_until_settled().await;

        assert_eq!(state, SessionState::Active(OutputKind::Local));
        assert_eq!(
            driver.control_state(&ControlId::new("btn")),
            ControlState::Playing
        );
    }

    #[tokio::test]
    async fn falls_back_to_synthesis_when_no_clip_exists() {
        let mut driver = driver_with(vec![], true);
        request(&mut driver);
        let state = driver.run_until_settled().await;

        assert_eq!(state, SessionState::Active(OutputKind::Synthesized));
        assert_eq!(
            driver
                .reporter()
                .active(&ContextId::new("btn"), Instant::now()),
            Some(&StatusKind::PlayedSynthesized)
        );
    }

    #[tokio::test]
    async fn reports_unavailable_when_everything_fails() {
        let mut driver = driver_with(vec![], false);
        request(&mut driver);
        let state = driver.run_until_settled().await;

        assert_eq!(state, SessionState::Idle);
        assert_eq!(driver.engine().last_error(), Some(AudioError::Unavailable));
        assert_eq!(
            driver
                .reporter()
                .active(&ContextId::new("btn"), Instant::now()),
            Some(&StatusKind::Unavailable)
        );
        assert_eq!(
            driver.control_state(&ControlId::new("btn")),
            ControlState::Idle
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_host_times_out_into_synthesis() {
        let (tx, rx) = host_channel();
        // Claims every candidate but never reports readiness, so each
        // bounded wait must elapse before the next candidate is tried.
        let host = ScriptedHost {
            playable: vec![
                "data/audio/u1/hello.mp3".to_string(),
                "data/audio/u1/hello.m4a".to_string(),
                "data/audio/hello.mp3".to_string(),
            ],
            speech_ok: true,
            acknowledge: false,
            events: tx.clone(),
        };
        let mut driver = AudioDriver::new(AudioEngine::default(), host, tx, rx);
        request(&mut driver);
        let state = driver.run_until_settled().await;

        assert_eq!(state, SessionState::Active(OutputKind::Synthesized));
    }

    #[tokio::test]
    async fn natural_completion_event_returns_to_idle() {
        let mut driver = driver_with(vec!["data/audio/u1/hello.mp3".to_string()], true);
        request(&mut driver);
        driver.run_until_settled().await;

        let session = driver.engine().session().clone();
        let started_by = session.started_by.expect("session has a starting attempt");
        driver.dispatch(HostEvent::PlaybackEnded(started_by));

        assert_eq!(driver.state(), SessionState::Idle);
        assert_eq!(
            driver.control_state(&ControlId::new("btn")),
            ControlState::Idle
        );
    }
}
