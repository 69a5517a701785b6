// ABOUTME: Application menu bar shared by every product window.
// ABOUTME: Custom items carry menu-* ids and are dispatched from lib.rs.

use tauri::menu::{Menu, SubmenuBuilder};
use tauri::{AppHandle, Manager, Wry};

use atlas_shell_core::diagnostics;

use crate::settings::SettingsManager;
use crate::window::{open_entry_window, WindowManager};
use crate::{theme, update};

pub const ID_NEW_WINDOW: &str = "menu-new-window";
pub const ID_CHANGE_WORKSPACE: &str = "menu-change-workspace";
pub const ID_CLOSE_ALL: &str = "menu-close-all";
pub const ID_RELOAD: &str = "menu-reload";
pub const ID_TOGGLE_THEME: &str = "menu-toggle-theme";
pub const ID_CHECK_UPDATES: &str = "menu-check-updates";

pub fn build_app_menu(app: &AppHandle) -> Result<Menu<Wry>, String> {
    let app_menu = SubmenuBuilder::new(app, "Atlas Desktop")
        .about(None)
        .separator()
        .text(ID_CHECK_UPDATES, "Check for Updates…")
        .text(ID_TOGGLE_THEME, "Toggle Dark Mode")
        .text(ID_CHANGE_WORKSPACE, "Change Workspace URL…")
        .separator()
        .hide()
        .hide_others()
        .separator()
        .quit()
        .build()
        .map_err(|e| format!("failed to build app menu: {}", e))?;

    let edit_menu = SubmenuBuilder::new(app, "Edit")
        .undo()
        .redo()
        .separator()
        .cut()
        .copy()
        .paste()
        .select_all()
        .build()
        .map_err(|e| format!("failed to build edit menu: {}", e))?;

    let view_menu = SubmenuBuilder::new(app, "View")
        .text(ID_RELOAD, "Reload")
        .separator()
        .fullscreen()
        .build()
        .map_err(|e| format!("failed to build view menu: {}", e))?;

    let window_menu = SubmenuBuilder::new(app, "Window")
        .text(ID_NEW_WINDOW, "New Workspace Window")
        .separator()
        .minimize()
        .close_window()
        .text(ID_CLOSE_ALL, "Close All Windows")
        .build()
        .map_err(|e| format!("failed to build window menu: {}", e))?;

    Menu::with_items(app, &[&app_menu, &edit_menu, &view_menu, &window_menu])
        .map_err(|e| format!("failed to build menu bar: {}", e))
}

/// Dispatches a fired app-menu item. Returns false for ids this module does
/// not own.
pub fn handle_app_menu_event(app: &AppHandle, menu_id: &str) -> bool {
    match menu_id {
        ID_NEW_WINDOW => {
            let manager = app.state::<WindowManager>();
            let settings = app.state::<SettingsManager>();
            if let Err(e) = open_entry_window(app, &manager, &settings) {
                diagnostics::log(format!("menu_new_window_failed error={}", e));
            }
            true
        }
        ID_CLOSE_ALL => {
            let manager = app.state::<WindowManager>();
            if let Err(e) = manager.close_all(app) {
                diagnostics::log(format!("menu_close_all_failed error={}", e));
            }
            true
        }
        ID_RELOAD => {
            if let Some(window) = app
                .webview_windows()
                .values()
                .find(|w| w.is_focused().unwrap_or(false))
                .cloned()
            {
                if let Err(e) = window.eval("window.location.reload()") {
                    diagnostics::log(format!("menu_reload_failed error={}", e));
                }
            }
            true
        }
        ID_CHANGE_WORKSPACE => {
            // The hosted pages carry no shell UI, so the prompt runs in the
            // focused window and calls back over IPC.
            if let Some(window) = app
                .webview_windows()
                .values()
                .find(|w| w.is_focused().unwrap_or(false))
                .cloned()
            {
                let script = "(() => { \
                    const url = window.prompt('Workspace URL', window.location.origin); \
                    if (url) { window.__TAURI_INTERNALS__.invoke('set_entry_url', { url }); } \
                })();";
                if let Err(e) = window.eval(script) {
                    diagnostics::log(format!("menu_change_workspace_failed error={}", e));
                }
            }
            true
        }
        ID_TOGGLE_THEME => {
            if let Err(e) = theme::toggle_theme(app) {
                diagnostics::log(format!("menu_toggle_theme_failed error={}", e));
            }
            true
        }
        ID_CHECK_UPDATES => {
            let handle = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = update::run_check(handle).await {
                    diagnostics::log(format!("menu_update_check_failed error={}", e));
                }
            });
            true
        }
        _ => false,
    }
}
