// ABOUTME: Light/dark theme switching applied across all open product windows.

use tauri::{AppHandle, Emitter, Manager, Theme};

use atlas_shell_core::diagnostics;

fn current_theme(app: &AppHandle) -> Theme {
    app.webview_windows()
        .values()
        .next()
        .and_then(|w| w.theme().ok())
        .unwrap_or(Theme::Light)
}

/// Flips between light and dark for every window and notifies pages via the
/// `theme-changed` event.
pub fn toggle_theme(app: &AppHandle) -> Result<(), String> {
    let next = match current_theme(app) {
        Theme::Dark => Theme::Light,
        _ => Theme::Dark,
    };
    app.set_theme(Some(next));
    diagnostics::log(format!("theme_changed dark={}", next == Theme::Dark));
    app.emit("theme-changed", next == Theme::Dark)
        .map_err(|e| format!("failed to emit: {}", e))
}

#[tauri::command(rename_all = "camelCase")]
pub fn get_theme(app: AppHandle) -> String {
    match current_theme(&app) {
        Theme::Dark => "dark".to_string(),
        _ => "light".to_string(),
    }
}

#[tauri::command(rename_all = "camelCase")]
pub fn set_dark_mode(app: AppHandle, dark: bool) -> Result<(), String> {
    let theme = if dark { Theme::Dark } else { Theme::Light };
    app.set_theme(Some(theme));
    app.emit("theme-changed", dark)
        .map_err(|e| format!("failed to emit: {}", e))
}
