use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Idle
    }
}

/// State of the single synthesized-audio session. Transitions are pure so
/// the machine is testable without any I/O; the controller runs the side
/// effects (network, playback, persistence) after an accepted transition.
///
/// Each request cycle carries a generation token. Response-driven
/// transitions must present the generation they were issued for; a
/// mismatch means the request was superseded and the event is discarded.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSession {
    pub status: PlaybackStatus,
    #[serde(skip)]
    pub generation: u64,
    pub text: Option<String>,
    pub voice: Option<String>,
}

impl SpeechSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request cycle, superseding whatever was live before.
    /// Must run before the caller's first suspension point so a late
    /// response for the old request can never resurrect a stale state.
    /// Returns the generation token for this request.
    pub fn begin_request(&mut self, text: String, voice: String) -> u64 {
        self.generation += 1;
        self.status = PlaybackStatus::Loading;
        self.text = Some(text);
        self.voice = Some(voice);
        self.generation
    }

    /// Synthesis response received and decoded.
    pub fn mark_ready(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != PlaybackStatus::Loading {
            return false;
        }
        self.status = PlaybackStatus::Ready;
        true
    }

    /// Autoplay into `Playing`; no user action in the success path.
    pub fn mark_playing(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != PlaybackStatus::Ready {
            return false;
        }
        self.status = PlaybackStatus::Playing;
        true
    }

    /// Request or decode failure; back to idle with nothing live.
    pub fn mark_failed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != PlaybackStatus::Loading {
            return false;
        }
        self.release();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != PlaybackStatus::Playing {
            return false;
        }
        self.status = PlaybackStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != PlaybackStatus::Paused {
            return false;
        }
        self.status = PlaybackStatus::Playing;
        true
    }

    /// Releases the active resource and resets to idle. Stopping an idle
    /// session is a no-op.
    pub fn stop(&mut self) -> bool {
        if self.status == PlaybackStatus::Idle {
            return false;
        }
        self.release();
        true
    }

    /// Natural completion of playback.
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != PlaybackStatus::Playing {
            return false;
        }
        self.status = PlaybackStatus::Ended;
        true
    }

    fn release(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.text = None;
        self.voice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_session() -> (SpeechSession, u64) {
        let mut session = SpeechSession::new();
        let generation = session.begin_request("hello".into(), "en-US-Wavenet-D".into());
        (session, generation)
    }

    #[test]
    fn successful_request_reaches_playing_without_explicit_play() {
        let (mut session, generation) = loaded_session();
        assert_eq!(session.status, PlaybackStatus::Loading);

        assert!(session.mark_ready(generation));
        assert_eq!(session.status, PlaybackStatus::Ready);

        assert!(session.mark_playing(generation));
        assert_eq!(session.status, PlaybackStatus::Playing);
    }

    #[test]
    fn stop_returns_to_idle_from_any_non_idle_state() {
        let (mut session, _) = loaded_session();
        assert!(session.stop());
        assert_eq!(session.status, PlaybackStatus::Idle);
        assert!(session.text.is_none());

        let (mut session, generation) = loaded_session();
        session.mark_ready(generation);
        session.mark_playing(generation);
        session.pause();
        assert!(session.stop());
        assert_eq!(session.status, PlaybackStatus::Idle);

        // Stopping when already idle is a no-op.
        assert!(!session.stop());
    }

    #[test]
    fn failure_returns_to_idle() {
        let (mut session, generation) = loaded_session();
        assert!(session.mark_failed(generation));
        assert_eq!(session.status, PlaybackStatus::Idle);
        assert!(session.voice.is_none());
    }

    #[test]
    fn new_request_supersedes_playing_session() {
        let (mut session, first) = loaded_session();
        session.mark_ready(first);
        session.mark_playing(first);

        let second = session.begin_request("again".into(), "en-GB-Wavenet-A".into());
        assert_eq!(session.status, PlaybackStatus::Loading);
        assert_ne!(first, second);

        // A late response for the superseded request must not apply.
        assert!(!session.mark_ready(first));
        assert!(!session.finish(first));
        assert_eq!(session.status, PlaybackStatus::Loading);

        assert!(session.mark_ready(second));
        assert!(session.mark_playing(second));
    }

    #[test]
    fn stale_failure_is_discarded() {
        let (mut session, first) = loaded_session();
        let second = session.begin_request("again".into(), "en-US-Wavenet-C".into());

        assert!(!session.mark_failed(first));
        assert_eq!(session.status, PlaybackStatus::Loading);
        assert!(session.mark_ready(second));
    }

    #[test]
    fn pause_and_resume_only_apply_in_their_states() {
        let (mut session, generation) = loaded_session();
        assert!(!session.pause());
        assert!(!session.resume());

        session.mark_ready(generation);
        session.mark_playing(generation);

        assert!(session.pause());
        assert_eq!(session.status, PlaybackStatus::Paused);
        assert!(!session.pause());

        assert!(session.resume());
        assert_eq!(session.status, PlaybackStatus::Playing);
        assert!(!session.resume());
    }

    #[test]
    fn resume_restores_the_exact_state_pause_left() {
        // The controller undoes a pause whose engine call failed by
        // resuming, so the two must be exact inverses.
        let (mut session, generation) = loaded_session();
        session.mark_ready(generation);
        session.mark_playing(generation);
        let before = session.clone();

        assert!(session.pause());
        assert!(session.resume());

        assert_eq!(session.status, before.status);
        assert_eq!(session.generation, before.generation);
        assert_eq!(session.text, before.text);
        assert_eq!(session.voice, before.voice);
    }

    #[test]
    fn natural_completion_ends_the_session() {
        let (mut session, generation) = loaded_session();
        session.mark_ready(generation);
        session.mark_playing(generation);

        assert!(session.finish(generation));
        assert_eq!(session.status, PlaybackStatus::Ended);

        // A fresh request starts a new cycle from Ended.
        let next = session.begin_request("fresh".into(), "en-US-Wavenet-D".into());
        assert_eq!(session.status, PlaybackStatus::Loading);
        assert!(session.mark_ready(next));
    }

    #[test]
    fn completion_is_ignored_when_paused_or_stopped() {
        let (mut session, generation) = loaded_session();
        session.mark_ready(generation);
        session.mark_playing(generation);
        session.pause();

        assert!(!session.finish(generation));
        assert_eq!(session.status, PlaybackStatus::Paused);

        session.stop();
        assert!(!session.finish(generation));
        assert_eq!(session.status, PlaybackStatus::Idle);
    }
}
