// Prevents console window from appearing with GUI app in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    atlas_desktop_lib::run()
}
