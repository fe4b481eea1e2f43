use chrono::Utc;
use tauri::State;

use crate::{export, AppState};

use super::types::{HistoryCounts, HistoryFilter, HistoryItem};

#[tauri::command]
pub async fn list_history(
    state: State<'_, AppState>,
    filter: Option<HistoryFilter>,
) -> Result<Vec<HistoryItem>, String> {
    Ok(state.history.filter(&filter.unwrap_or_default()))
}

#[tauri::command]
pub async fn clear_history(state: State<'_, AppState>) -> Result<(), String> {
    state.history.clear().map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn history_counts(state: State<'_, AppState>) -> Result<HistoryCounts, String> {
    Ok(state.history.counts())
}

/// Renders the filtered history view to a PDF in the app data directory
/// and returns its path. The export has a fixed filename, so repeated
/// exports overwrite the previous artifact.
#[tauri::command]
pub async fn export_history(
    state: State<'_, AppState>,
    filter: Option<HistoryFilter>,
) -> Result<String, String> {
    let items = state.history.filter(&filter.unwrap_or_default());
    if items.is_empty() {
        return Err("No history entries match the current filter".to_string());
    }

    let bytes = export::export_pdf(&items, Utc::now()).map_err(|e| e.to_string())?;
    let path = state.export_dir.join(export::EXPORT_FILENAME);
    std::fs::write(&path, bytes).map_err(|e| e.to_string())?;

    Ok(path.display().to_string())
}
