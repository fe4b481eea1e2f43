use std::sync::{Arc, Mutex};

use log::{debug, error};
use tauri::{AppHandle, Emitter};

use crate::{
    history::{HistoryService, NewHistoryItem, OperationKind, OperationMetadata},
    nlp::BackendClient,
};

use super::{engine::PlaybackEngine, session::SpeechSession};

/// Fixed output recorded for a successful synthesis.
pub const SYNTHESIS_SUCCESS_OUTPUT: &str = "Audio generated successfully";

const STATE_EVENT: &str = "speech-state-changed";

/// Drives the audio session: synthesis gateway in, playback engine out,
/// with the pure `SpeechSession` machine deciding which transitions apply.
/// Emits `speech-state-changed` after every accepted transition.
#[derive(Clone)]
pub struct SpeechController {
    session: Arc<Mutex<SpeechSession>>,
    engine: Arc<PlaybackEngine>,
    history: HistoryService,
    client: BackendClient,
    app_handle: AppHandle,
}

impl SpeechController {
    pub fn new(app_handle: AppHandle, client: BackendClient, history: HistoryService) -> Self {
        let session = Arc::new(Mutex::new(SpeechSession::new()));

        // The playback thread reports natural completion with the
        // generation it was playing; a superseded buffer is ignored.
        let engine = {
            let session = Arc::clone(&session);
            let app_handle = app_handle.clone();
            PlaybackEngine::new(move |generation| {
                let Ok(mut guard) = session.lock() else {
                    return;
                };
                if guard.finish(generation) {
                    let snapshot = guard.clone();
                    drop(guard);
                    if let Err(err) = app_handle.emit(STATE_EVENT, &snapshot) {
                        error!("Failed to emit {STATE_EVENT}: {err}");
                    }
                }
            })
        };

        Self {
            session,
            engine: Arc::new(engine),
            history,
            client,
            app_handle,
        }
    }

    /// Requests synthesis and autoplays the result. Supersedes any prior
    /// session before the request is sent: the generation bump happens
    /// under the lock, so a stale response can never apply afterwards.
    pub async fn speak(
        &self,
        text: String,
        voice: String,
        language_code: String,
    ) -> Result<SpeechSession, String> {
        let generation = {
            let mut guard = self.session.lock().map_err(|e| e.to_string())?;
            let generation = guard.begin_request(text.clone(), voice.clone());
            let snapshot = guard.clone();
            drop(guard);
            self.emit(&snapshot);
            generation
        };

        // Release the superseded resource and retire its generation at
        // the engine before fetching the new one, so a stale buffer still
        // in flight can never reach the sink.
        self.engine.stop(generation.saturating_sub(1))?;

        let audio = match self.client.synthesize(&text, &voice, &language_code).await {
            Ok(audio) => audio,
            Err(err) => {
                error!("Speech synthesis failed: {err:#}");
                return self.fail(generation, "Speech synthesis failed");
            }
        };

        {
            let guard = self.session.lock().map_err(|e| e.to_string())?;
            if guard.generation != generation {
                debug!("Dropping superseded synthesis response (generation {generation})");
                return Ok(guard.clone());
            }
        }

        if let Err(err) = self.engine.load(audio, generation).await {
            error!("Audio playback failed: {err}");
            return self.fail(generation, &err);
        }

        let snapshot = {
            let mut guard = self.session.lock().map_err(|e| e.to_string())?;
            if !guard.mark_ready(generation) || !guard.mark_playing(generation) {
                debug!("Session superseded while loading (generation {generation})");
                return Ok(guard.clone());
            }
            guard.clone()
        };
        self.emit(&snapshot);

        // Recorded only once playback actually started; failed synthesis
        // never reaches history.
        if let Err(err) = self.history.append(NewHistoryItem {
            kind: OperationKind::TextToSpeech,
            input: text,
            output: SYNTHESIS_SUCCESS_OUTPUT.to_string(),
            metadata: Some(OperationMetadata::voice(voice)),
        }) {
            error!("Failed to record text-to-speech history entry: {err:#}");
        }

        Ok(snapshot)
    }

    pub fn pause(&self) -> Result<SpeechSession, String> {
        let mut guard = self.session.lock().map_err(|e| e.to_string())?;
        if !guard.pause() {
            return Ok(guard.clone());
        }
        if let Err(err) = self.engine.pause() {
            // Sink untouched; undo the transition so session and engine
            // keep agreeing.
            guard.resume();
            return Err(err);
        }
        let snapshot = guard.clone();
        drop(guard);
        self.emit(&snapshot);
        Ok(snapshot)
    }

    pub fn resume(&self) -> Result<SpeechSession, String> {
        let mut guard = self.session.lock().map_err(|e| e.to_string())?;
        if !guard.resume() {
            return Ok(guard.clone());
        }
        if let Err(err) = self.engine.resume() {
            guard.pause();
            return Err(err);
        }
        let snapshot = guard.clone();
        drop(guard);
        self.emit(&snapshot);
        Ok(snapshot)
    }

    /// Stops playback, releases the audio resource, and resets to idle.
    /// The current generation is retired at the engine first, so an audio
    /// buffer still being fetched for it can never start playing.
    pub fn stop(&self) -> Result<SpeechSession, String> {
        let mut guard = self.session.lock().map_err(|e| e.to_string())?;
        self.engine.stop(guard.generation)?;
        if !guard.stop() {
            return Ok(guard.clone());
        }
        let snapshot = guard.clone();
        drop(guard);
        self.emit(&snapshot);
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Result<SpeechSession, String> {
        Ok(self.session.lock().map_err(|e| e.to_string())?.clone())
    }

    fn fail(&self, generation: u64, message: &str) -> Result<SpeechSession, String> {
        let mut guard = self.session.lock().map_err(|e| e.to_string())?;
        if !guard.mark_failed(generation) {
            // Superseded in the meantime; the failure belongs to a dead
            // request and is not surfaced.
            return Ok(guard.clone());
        }
        let snapshot = guard.clone();
        drop(guard);
        self.emit(&snapshot);
        Err(message.to_string())
    }

    fn emit(&self, snapshot: &SpeechSession) {
        if let Err(err) = self.app_handle.emit(STATE_EVENT, snapshot) {
            error!("Failed to emit {STATE_EVENT}: {err}");
        }
    }
}
