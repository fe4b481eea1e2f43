use std::io::Cursor;
use std::sync::{
    mpsc::{self, RecvTimeoutError, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

enum PlayerCommand {
    Load {
        data: Vec<u8>,
        generation: u64,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Pause,
    Resume,
    Stop {
        through: u64,
    },
}

/// Decides which load generations the playback thread may still accept.
/// Generations at or below the floor belong to superseded requests; their
/// buffers must never reach the sink, no matter when they arrive.
#[derive(Debug, Default)]
struct GenerationGate {
    floor: u64,
}

impl GenerationGate {
    /// Admits a load once; admitting also retires every older generation,
    /// so a stale buffer arriving after a newer one is refused.
    fn admit(&mut self, generation: u64) -> bool {
        if generation <= self.floor {
            return false;
        }
        self.floor = generation;
        true
    }

    /// Retires every generation up to and including `through`.
    fn retire(&mut self, through: u64) {
        self.floor = self.floor.max(through);
    }
}

/// Handle to the dedicated playback thread. The thread owns the non-Send
/// rodio output stream and sink; at most one sink is live, and loading a
/// new buffer replaces it. Natural completion is reported once per loaded
/// buffer through the `on_finished` callback with the buffer's generation.
pub struct PlaybackEngine {
    tx: Arc<Mutex<Option<Sender<PlayerCommand>>>>,
    on_finished: Arc<dyn Fn(u64) + Send + Sync>,
}

impl PlaybackEngine {
    pub fn new(on_finished: impl Fn(u64) + Send + Sync + 'static) -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            on_finished: Arc::new(on_finished),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<PlayerCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<PlayerCommand>();
        let on_finished = Arc::clone(&self.on_finished);

        // Spawn dedicated playback thread holding non-Send audio objects
        thread::Builder::new()
            .name("audio-playback".to_string())
            .spawn(move || {
                let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut sink: Option<Sink> = None;
                let mut gate = GenerationGate::default();
                // Generation of the buffer currently in the sink; cleared
                // once its completion has been reported.
                let mut live_generation: Option<u64> = None;

                fn ensure_stream(
                    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
                ) -> Result<OutputStreamHandle, String> {
                    if stream.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to open audio output: {e}"))?;
                        *stream = Some((s, handle));
                    }
                    match stream {
                        Some((_, handle)) => Ok(handle.clone()),
                        None => Err("audio output unavailable".to_string()),
                    }
                }

                loop {
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(PlayerCommand::Load {
                            data,
                            generation,
                            reply,
                        }) => {
                            if !gate.admit(generation) {
                                let _ = reply
                                    .send(Err("Superseded audio buffer discarded".to_string()));
                                continue;
                            }
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            live_generation = None;

                            let result = (|| -> Result<(), String> {
                                let source = Decoder::new(Cursor::new(data)).map_err(|e| {
                                    format!("Failed to decode synthesized audio: {e}")
                                })?;
                                let handle = ensure_stream(&mut stream)?;
                                let new_sink = Sink::try_new(&handle)
                                    .map_err(|e| format!("Failed to create audio sink: {e}"))?;
                                new_sink.append(source);
                                new_sink.play();
                                sink = Some(new_sink);
                                Ok(())
                            })();

                            if result.is_ok() {
                                live_generation = Some(generation);
                            }
                            let _ = reply.send(result);
                        }
                        Ok(PlayerCommand::Pause) => {
                            if let Some(ref s) = sink {
                                s.pause();
                            }
                        }
                        Ok(PlayerCommand::Resume) => {
                            if let Some(ref s) = sink {
                                s.play();
                            }
                        }
                        Ok(PlayerCommand::Stop { through }) => {
                            gate.retire(through);
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            stream = None;
                            live_generation = None;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            // A sink that drained while unpaused finished
                            // naturally; report it exactly once.
                            if let (Some(s), Some(generation)) = (sink.as_ref(), live_generation) {
                                if s.empty() && !s.is_paused() {
                                    live_generation = None;
                                    on_finished(generation);
                                }
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Decodes and starts playing the buffer, replacing any prior sink.
    /// Resolves once the playback thread has accepted or rejected it; a
    /// buffer for a generation already retired by `stop` or by a newer
    /// load is rejected without touching the sink.
    pub async fn load(&self, data: Vec<u8>, generation: u64) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(PlayerCommand::Load {
            data,
            generation,
            reply: reply_tx,
        })
        .map_err(|e| e.to_string())?;
        reply_rx.await.map_err(|e| e.to_string())?
    }

    pub fn pause(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(PlayerCommand::Pause).map_err(|e| e.to_string())
    }

    pub fn resume(&self) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(PlayerCommand::Resume).map_err(|e| e.to_string())
    }

    /// Stops playback and retires every generation up to and including
    /// `through`. Always reaches the playback thread, so the retirement
    /// holds even for a load that has not been sent yet.
    pub fn stop(&self, through: u64) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(PlayerCommand::Stop { through })
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationGate;

    #[test]
    fn admits_generations_in_order() {
        let mut gate = GenerationGate::default();
        assert!(gate.admit(1));
        assert!(gate.admit(2));
        assert!(gate.admit(5));
    }

    #[test]
    fn rejects_stale_load_after_newer_one() {
        let mut gate = GenerationGate::default();
        assert!(gate.admit(2));
        assert!(!gate.admit(1));
    }

    #[test]
    fn retire_blocks_at_or_below_but_admits_newer() {
        let mut gate = GenerationGate::default();
        gate.retire(3);
        assert!(!gate.admit(2));
        assert!(!gate.admit(3));
        assert!(gate.admit(4));
    }

    #[test]
    fn retire_never_lowers_the_floor() {
        let mut gate = GenerationGate::default();
        assert!(gate.admit(5));
        gate.retire(2);
        assert!(!gate.admit(3));
        assert!(gate.admit(6));
    }
}
