// ABOUTME: Application entry wiring: managers, IPC commands, menu, run loop.
// ABOUTME: The first product window opens at startup from the configured entry URL.

use tauri::{Manager, RunEvent};

use atlas_shell_core::diagnostics;

mod bridge;
mod context_menu;
mod menu;
mod settings;
mod theme;
mod update;
mod window;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let settings_manager = settings::build_settings_manager();

    let window_manager = window::build_window_manager();

    let update_manager = update::build_update_manager();

    let context_menu_state = context_menu::build_context_menu_state();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_updater::Builder::new().build())
        .manage(settings_manager)
        .manage(window_manager)
        .manage(update_manager)
        .manage(context_menu_state)
        .invoke_handler(tauri::generate_handler![
            settings::get_settings,
            settings::get_entry_url,
            settings::set_entry_url,
            window::open_from_page,
            window::open_product_window,
            window::window_count,
            window::close_all_windows,
            context_menu::show_context_menu,
            theme::get_theme,
            theme::set_dark_mode,
            update::update_check,
            update::update_download,
            update::update_install,
            update::update_get_status,
        ])
        .on_menu_event(|app, event| {
            let id = event.id().as_ref();
            if !context_menu::handle_menu_event(app, id) {
                menu::handle_app_menu_event(app, id);
            }
        })
        .setup(|app| {
            let handle = app.handle();
            let app_menu = menu::build_app_menu(handle)?;
            app.set_menu(app_menu)?;

            let manager = app.state::<window::WindowManager>();
            let settings = app.state::<settings::SettingsManager>();
            window::open_entry_window(handle, &manager, &settings)?;

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if matches!(event, RunEvent::ExitRequested { .. } | RunEvent::Exit) {
            let manager = app_handle.state::<window::WindowManager>();
            if let Err(e) = manager.flush() {
                diagnostics::log(format!("exit_flush_error error={}", e));
            }
        }
    });
}
