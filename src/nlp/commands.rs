use log::error;
use serde::Serialize;
use tauri::State;

use crate::{
    history::{HistoryService, NewHistoryItem, OperationKind, OperationMetadata},
    AppState,
};

use super::client::{BackendClient, SummaryLength};

pub const TRANSLATE_FAILURE_MESSAGE: &str = "⚠️ Unable to translate. Please try again.";
pub const SUMMARIZE_FAILURE_MESSAGE: &str = "⚠️ Failed to generate summary. Please try again.";
pub const TRANSCRIBE_FAILURE_MESSAGE: &str = "⚠️ Unable to transcribe audio. Please try again.";

/// History input recorded for speech-to-text, where the source is audio.
pub const TRANSCRIPT_INPUT_MARKER: &str = "Audio recording";

/// Language names shown in translation metadata, keyed by request code.
const LANGUAGES: [(&str, &str); 12] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
];

fn language_name(code: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// What the UI displays for one operation. A gateway failure is recovered
/// here: the fixed sentinel replaces the output, `failed` is set, and
/// nothing reaches the history log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub output: String,
    pub failed: bool,
}

fn ensure_non_empty(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Input text must not be empty".to_string());
    }
    Ok(())
}

pub(crate) async fn run_translation(
    client: &BackendClient,
    history: &HistoryService,
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<OperationOutcome, String> {
    ensure_non_empty(text)?;

    match client.translate(text, source_lang, target_lang).await {
        Ok(translation) => {
            history
                .append(NewHistoryItem {
                    kind: OperationKind::Translation,
                    input: text.to_string(),
                    output: translation.clone(),
                    metadata: Some(OperationMetadata::translation(
                        language_name(source_lang),
                        language_name(target_lang),
                    )),
                })
                .map_err(|e| e.to_string())?;
            Ok(OperationOutcome {
                output: translation,
                failed: false,
            })
        }
        Err(err) => {
            error!("Translation failed: {err:#}");
            Ok(OperationOutcome {
                output: TRANSLATE_FAILURE_MESSAGE.to_string(),
                failed: true,
            })
        }
    }
}

pub(crate) async fn run_summarization(
    client: &BackendClient,
    history: &HistoryService,
    text: &str,
    length: SummaryLength,
) -> Result<OperationOutcome, String> {
    ensure_non_empty(text)?;

    match client.summarize(text, length).await {
        Ok(summary) => {
            history
                .append(NewHistoryItem {
                    kind: OperationKind::Summarization,
                    input: text.to_string(),
                    output: summary.clone(),
                    metadata: Some(OperationMetadata::summarization(
                        length.as_str().to_string(),
                    )),
                })
                .map_err(|e| e.to_string())?;
            Ok(OperationOutcome {
                output: summary,
                failed: false,
            })
        }
        Err(err) => {
            error!("Summarization failed: {err:#}");
            Ok(OperationOutcome {
                output: SUMMARIZE_FAILURE_MESSAGE.to_string(),
                failed: true,
            })
        }
    }
}

pub(crate) async fn run_transcription(
    client: &BackendClient,
    history: &HistoryService,
    audio_content: &str,
) -> Result<OperationOutcome, String> {
    if audio_content.trim().is_empty() {
        return Err("Audio content must not be empty".to_string());
    }

    match client.transcribe(audio_content).await {
        Ok(transcript) => {
            history
                .append(NewHistoryItem {
                    kind: OperationKind::SpeechToText,
                    input: TRANSCRIPT_INPUT_MARKER.to_string(),
                    output: transcript.transcription.clone(),
                    metadata: transcript.confidence.map(OperationMetadata::confidence),
                })
                .map_err(|e| e.to_string())?;
            Ok(OperationOutcome {
                output: transcript.transcription,
                failed: false,
            })
        }
        Err(err) => {
            error!("Transcription failed: {err:#}");
            Ok(OperationOutcome {
                output: TRANSCRIBE_FAILURE_MESSAGE.to_string(),
                failed: true,
            })
        }
    }
}

#[tauri::command]
pub async fn translate_text(
    state: State<'_, AppState>,
    text: String,
    source_lang: String,
    target_lang: String,
) -> Result<OperationOutcome, String> {
    run_translation(&state.client, &state.history, &text, &source_lang, &target_lang).await
}

#[tauri::command]
pub async fn summarize_text(
    state: State<'_, AppState>,
    text: String,
    length: Option<SummaryLength>,
) -> Result<OperationOutcome, String> {
    run_summarization(
        &state.client,
        &state.history,
        &text,
        length.unwrap_or_default(),
    )
    .await
}

#[tauri::command]
pub async fn transcribe_audio(
    state: State<'_, AppState>,
    audio_content: String,
) -> Result<OperationOutcome, String> {
    run_transcription(&state.client, &state.history, &audio_content).await
}
