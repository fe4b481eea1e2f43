use tauri::State;

use crate::AppState;

use super::session::SpeechSession;

/// Default voice offered by the backend.
pub const DEFAULT_VOICE: &str = "en-US-Wavenet-D";
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

#[tauri::command]
pub async fn speak_text(
    state: State<'_, AppState>,
    text: String,
    voice: Option<String>,
    language_code: Option<String>,
) -> Result<SpeechSession, String> {
    if text.trim().is_empty() {
        return Err("Cannot synthesize empty text".to_string());
    }

    let controller = state.speech.clone();
    controller
        .speak(
            text,
            voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            language_code.unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
        )
        .await
}

#[tauri::command]
pub async fn pause_speech(state: State<'_, AppState>) -> Result<SpeechSession, String> {
    state.speech.pause()
}

#[tauri::command]
pub async fn resume_speech(state: State<'_, AppState>) -> Result<SpeechSession, String> {
    state.speech.resume()
}

#[tauri::command]
pub async fn stop_speech(state: State<'_, AppState>) -> Result<SpeechSession, String> {
    state.speech.stop()
}

#[tauri::command]
pub async fn get_speech_state(state: State<'_, AppState>) -> Result<SpeechSession, String> {
    state.speech.snapshot()
}
