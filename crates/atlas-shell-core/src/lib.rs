// ABOUTME: Routing, window identity, and persistence policy for Atlas Desktop.
// ABOUTME: Pure logic shared by the Tauri app; nothing here touches a webview.

pub mod catalog;
pub mod context_menu;
pub mod diagnostics;
pub mod error;
pub mod identity;
pub mod navigation;
pub mod registry;
pub mod state;
