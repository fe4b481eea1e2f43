mod export;
mod history;
mod nlp;
mod speech;
mod store;
mod theme;

use std::path::PathBuf;

use log::info;
use tauri::{Manager, State};

use history::commands::{clear_history, export_history, history_counts, list_history};
use history::HistoryService;
use nlp::commands::{summarize_text, transcribe_audio, translate_text};
use nlp::BackendClient;
use speech::commands::{get_speech_state, pause_speech, resume_speech, speak_text, stop_speech};
use speech::SpeechController;
use store::Store;
use theme::{ThemePreference, ThemeStore};

pub(crate) struct AppState {
    pub(crate) history: HistoryService,
    pub(crate) client: BackendClient,
    pub(crate) speech: SpeechController,
    pub(crate) theme: ThemeStore,
    pub(crate) export_dir: PathBuf,
}

#[tauri::command]
fn get_theme(state: State<AppState>) -> Result<ThemePreference, String> {
    Ok(state.theme.current())
}

#[tauri::command]
fn toggle_theme(state: State<AppState>) -> Result<ThemePreference, String> {
    state.theme.toggle().map_err(|e| e.to_string())
}

#[tauri::command]
fn set_theme(state: State<AppState>, theme: ThemePreference) -> Result<ThemePreference, String> {
    state.theme.set(theme).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("NLP Desk starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let store = Store::new(app_data_dir.clone())?;
                let history = HistoryService::new(store.clone());
                let theme = ThemeStore::new(store);
                let client = BackendClient::from_env();
                let speech =
                    SpeechController::new(app.handle().clone(), client.clone(), history.clone());

                app.manage(AppState {
                    history,
                    client,
                    speech,
                    theme,
                    export_dir: app_data_dir,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            translate_text,
            summarize_text,
            transcribe_audio,
            speak_text,
            pause_speech,
            resume_speech,
            stop_speech,
            get_speech_state,
            list_history,
            clear_history,
            history_counts,
            export_history,
            get_theme,
            toggle_theme,
            set_theme,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
