// ABOUTME: Builds and pops native context menus from the policy's action list.
// ABOUTME: Menu events are resolved against the pending right-click context.

use parking_lot::Mutex;
use tauri::menu::{MenuBuilder, MenuItemBuilder};
use tauri::{AppHandle, Manager, State};

use atlas_shell_core::context_menu::{build_context_actions, ContextAction, ContextMenuRequest};
use atlas_shell_core::diagnostics;

use crate::settings::SettingsManager;
use crate::window::{WindowConfig, WindowManager};

const ID_OPEN_WINDOW: &str = "ctx-open-window";
const ID_OPEN_BACKGROUND: &str = "ctx-open-background";
const ID_BACK: &str = "ctx-back";
const ID_FORWARD: &str = "ctx-forward";
const ID_RELOAD: &str = "ctx-reload";
const ID_INSPECT: &str = "ctx-inspect";

/// Context captured when the menu was shown, consumed when an item fires.
struct PendingContext {
    window_label: String,
    link_url: String,
    product_id: String,
}

#[derive(Default)]
pub struct ContextMenuState {
    pending: Mutex<Option<PendingContext>>,
}

pub fn build_context_menu_state() -> ContextMenuState {
    ContextMenuState::default()
}

/// Pops the native context menu for a right-click forwarded by the bridge.
#[tauri::command(rename_all = "camelCase")]
pub fn show_context_menu(
    app: AppHandle,
    window: tauri::WebviewWindow,
    manager: State<'_, WindowManager>,
    settings: State<'_, SettingsManager>,
    menu_state: State<'_, ContextMenuState>,
    request: ContextMenuRequest,
) -> Result<(), String> {
    let dev_tools = cfg!(debug_assertions);
    let actions = build_context_actions(
        manager.catalog(),
        &settings.entry_url(),
        &request,
        dev_tools,
    );

    let mut builder = MenuBuilder::new(&app);
    let mut product_id = String::new();
    for action in &actions {
        builder = match action {
            ContextAction::Copy => builder.copy(),
            ContextAction::Cut => builder.cut(),
            ContextAction::Paste => builder.paste(),
            ContextAction::Separator => builder.separator(),
            ContextAction::OpenInNewWindow {
                title,
                product_id: pid,
                ..
            } => {
                product_id = pid.clone();
                let item = MenuItemBuilder::with_id(ID_OPEN_WINDOW, title)
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
            ContextAction::OpenInBackground { title, .. } => {
                let item = MenuItemBuilder::with_id(ID_OPEN_BACKGROUND, title)
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
            ContextAction::Back { enabled } => {
                let item = MenuItemBuilder::with_id(ID_BACK, "Back")
                    .enabled(*enabled)
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
            ContextAction::Forward { enabled } => {
                let item = MenuItemBuilder::with_id(ID_FORWARD, "Forward")
                    .enabled(*enabled)
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
            ContextAction::Reload => {
                let item = MenuItemBuilder::with_id(ID_RELOAD, "Reload")
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
            ContextAction::InspectElement { .. } => {
                let item = MenuItemBuilder::with_id(ID_INSPECT, "Inspect Element")
                    .build(&app)
                    .map_err(|e| format!("failed to build menu item: {}", e))?;
                builder.item(&item)
            }
        };
    }

    let menu = builder
        .build()
        .map_err(|e| format!("failed to build context menu: {}", e))?;

    *menu_state.pending.lock() = Some(PendingContext {
        window_label: window.label().to_string(),
        link_url: request.link_url.clone(),
        product_id,
    });

    window
        .popup_menu(&menu)
        .map_err(|e| format!("failed to show context menu: {}", e))
}

/// Dispatches a fired context-menu item. Returns false for ids this module
/// does not own so the app menu handler can take them.
pub fn handle_menu_event(app: &AppHandle, menu_id: &str) -> bool {
    if !menu_id.starts_with("ctx-") {
        return false;
    }

    let pending = app
        .state::<ContextMenuState>()
        .pending
        .lock()
        .take();
    let Some(context) = pending else {
        return true;
    };

    match menu_id {
        ID_OPEN_WINDOW | ID_OPEN_BACKGROUND => {
            let manager = app.state::<WindowManager>();
            let product = manager
                .catalog()
                .product_by_id(&context.product_id)
                .unwrap_or_else(|| manager.catalog().generic_product());
            let mut config = WindowConfig::for_product(context.link_url.clone(), product);
            config.focused = menu_id == ID_OPEN_WINDOW;
            if let Err(e) = manager.create_or_reuse(app, config) {
                diagnostics::log(format!("context_open_failed error={}", e));
            }
        }
        ID_BACK => eval_in_window(app, &context.window_label, "window.history.back()"),
        ID_FORWARD => eval_in_window(app, &context.window_label, "window.history.forward()"),
        ID_RELOAD => eval_in_window(app, &context.window_label, "window.location.reload()"),
        ID_INSPECT => {
            #[cfg(debug_assertions)]
            if let Some(window) = app.get_webview_window(&context.window_label) {
                window.open_devtools();
            }
        }
        _ => {}
    }

    true
}

fn eval_in_window(app: &AppHandle, label: &str, script: &str) {
    if let Some(window) = app.get_webview_window(label) {
        if let Err(e) = window.eval(script) {
            diagnostics::log(format!("context_eval_error label={} error={}", label, e));
        }
    }
}
