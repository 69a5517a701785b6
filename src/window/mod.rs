// ABOUTME: Creates, reuses, and tracks product windows keyed by stable identity.
// ABOUTME: Wires navigation routing and geometry persistence into every webview it builds.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tauri::{AppHandle, Manager, PageLoadEvent, State, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;
use url::Url;

use atlas_shell_core::catalog::{parse_hex_color, Product, ProductCatalog};
use atlas_shell_core::diagnostics;
use atlas_shell_core::identity::derive_identity;
use atlas_shell_core::navigation::{
    route_navigation, route_new_window, NavigationDisposition, NewWindowDisposition,
};
use atlas_shell_core::registry::WindowRegistry;
use atlas_shell_core::state::{
    default_storage_root, DebouncedStateStore, WindowBounds, WindowState, WindowStateSnapshot,
    WindowStateStore, SAVE_DEBOUNCE_MS,
};

use crate::bridge;
use crate::settings::SettingsManager;

const MIN_WIDTH: u32 = 800;
const MIN_HEIGHT: u32 = 600;

/// Parameters for a window spawn request. Everything not specified falls back
/// to persisted state, then to the product defaults.
pub struct WindowConfig {
    pub url: String,
    pub product: &'static Product,
    pub title: Option<String>,
    pub size: Option<(u32, u32)>,
    pub position: Option<(i32, i32)>,
    pub focused: bool,
}

impl WindowConfig {
    pub fn for_product(url: String, product: &'static Product) -> Self {
        Self {
            url,
            product,
            title: None,
            size: None,
            position: None,
            focused: true,
        }
    }
}

/// WindowManager coordinates the live window registry and persisted geometry.
///
/// Example:
/// ```rust,ignore
/// let manager = build_window_manager();
/// let window = manager.create_or_reuse(&app, WindowConfig::for_product(url, product))?;
/// ```
pub struct WindowManager {
    store: DebouncedStateStore,
    snapshot: Mutex<WindowStateSnapshot>,
    registry: Mutex<WindowRegistry>,
    catalog: ProductCatalog,
}

impl WindowManager {
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn saved_state(&self, identity: &str) -> Option<WindowState> {
        self.snapshot.lock().windows.get(identity).cloned()
    }

    /// Records the latest geometry for a window and queues a debounced save.
    /// Records for windows that no longer exist are kept; they seed geometry
    /// if the same identity is ever opened again.
    pub fn record_window_state(&self, state: WindowState) -> Result<(), String> {
        let mut snapshot = self.snapshot.lock();
        snapshot.windows.insert(state.id.clone(), state);
        self.store.save(&snapshot).map_err(String::from)
    }

    /// Flushes any pending debounced write synchronously.
    pub fn flush(&self) -> Result<(), String> {
        self.store.flush().map_err(String::from)
    }

    pub fn count(&self, app: &AppHandle) -> usize {
        self.registry
            .lock()
            .count(|label| app.get_webview_window(label).is_some())
    }

    /// Closes every tracked window. Geometry is flushed first so a quit right
    /// after a resize still lands on disk.
    pub fn close_all(&self, app: &AppHandle) -> Result<(), String> {
        self.flush()?;
        let labels = self.registry.lock().labels();
        for label in labels {
            if let Some(window) = app.get_webview_window(&label) {
                if let Err(e) = window.close() {
                    diagnostics::log(format!("window_close_error label={} error={}", label, e));
                }
            }
        }
        self.registry.lock().clear();
        Ok(())
    }

    pub fn forget_window(&self, label: &str) {
        self.registry.lock().remove_label(label);
    }

    /// Returns the window for this (product, url) identity, creating it if no
    /// live one exists. An existing window is focused instead of duplicated.
    pub fn create_or_reuse(
        &self,
        app: &AppHandle,
        config: WindowConfig,
    ) -> Result<tauri::WebviewWindow, String> {
        let identity = derive_identity(config.product.id, &config.url);

        let existing = self
            .registry
            .lock()
            .live_label(&identity, |label| app.get_webview_window(label).is_some());
        if let Some(label) = existing {
            if let Some(window) = app.get_webview_window(&label) {
                if config.focused {
                    let _ = window.unminimize();
                    let _ = window.set_focus();
                }
                diagnostics::log(format!("window_reused identity={}", identity));
                return Ok(window);
            }
        }

        let saved = self.saved_state(&identity);
        match self.spawn_window(app, &config, &identity, saved) {
            Ok(window) => {
                self.registry
                    .lock()
                    .insert(identity.clone(), identity.clone());
                diagnostics::log(format!(
                    "window_spawned identity={} product={} count={}",
                    identity,
                    config.product.id,
                    self.count(app)
                ));
                Ok(window)
            }
            Err(e) => {
                diagnostics::log(format!(
                    "window_spawn_failed identity={} error={}",
                    identity, e
                ));
                Err(e)
            }
        }
    }

    fn spawn_window(
        &self,
        app: &AppHandle,
        config: &WindowConfig,
        identity: &str,
        saved: Option<WindowState>,
    ) -> Result<tauri::WebviewWindow, String> {
        let url = Url::parse(&config.url).map_err(|e| format!("invalid window url: {}", e))?;
        let (width, height) = resolve_initial_size(config, saved.as_ref());
        let restore_maximized = saved.as_ref().map(|s| s.is_maximized).unwrap_or(false);

        let page_url: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let shown = Arc::new(AtomicBool::new(false));
        let focused = config.focused;

        let nav_app = app.clone();
        let nav_page = page_url.clone();
        let load_page = page_url.clone();
        let load_shown = shown.clone();

        let mut builder = WebviewWindowBuilder::new(app, identity, WebviewUrl::External(url))
            .title(config.title.as_deref().unwrap_or(config.product.name))
            .inner_size(width as f64, height as f64)
            .min_inner_size(MIN_WIDTH as f64, MIN_HEIGHT as f64)
            .visible(false)
            .initialization_script(bridge::INIT_SCRIPT)
            .on_navigation(move |target| {
                let entry = match nav_app.try_state::<SettingsManager>() {
                    Some(settings) => settings.entry_url(),
                    None => return true,
                };
                let page = nav_page.lock().clone();
                match route_navigation(&entry, page.as_deref(), target.as_str()) {
                    NavigationDisposition::Allow => true,
                    NavigationDisposition::OpenExternal => {
                        diagnostics::log(format!("navigation_externalized url={}", target));
                        if let Err(e) = nav_app.opener().open_url(target.as_str(), None::<&str>) {
                            diagnostics::log(format!("external_open_error error={}", e));
                        }
                        false
                    }
                }
            })
            .on_page_load(move |window, payload| match payload.event() {
                PageLoadEvent::Started => {
                    *load_page.lock() = Some(payload.url().to_string());
                }
                PageLoadEvent::Finished => {
                    // Show only after first paint is plausible; avoids the
                    // white flash on slow tenants.
                    if !load_shown.swap(true, Ordering::SeqCst) {
                        if restore_maximized {
                            let _ = window.maximize();
                        }
                        let _ = window.show();
                        if focused {
                            let _ = window.set_focus();
                        }
                    }
                }
            });

        if let Some((r, g, b)) = parse_hex_color(config.product.background_color) {
            builder = builder.background_color(tauri::window::Color(r, g, b, 255));
        }
        if let Some((x, y)) = config
            .position
            .or_else(|| saved.as_ref().map(|s| (s.bounds.x, s.bounds.y)))
        {
            builder = builder.position(x as f64, y as f64);
        }

        let window = builder
            .build()
            .map_err(|e| format!("failed to create window: {}", e))?;

        install_window_event_handlers(app, &window, identity, config.product.id, &config.url);

        Ok(window)
    }
}

/// Saved geometry wins over the caller's size, which wins over the product
/// default.
fn resolve_initial_size(config: &WindowConfig, saved: Option<&WindowState>) -> (u32, u32) {
    let (width, height) = saved
        .map(|s| (s.bounds.width, s.bounds.height))
        .or(config.size)
        .unwrap_or(config.product.default_size);
    (width.max(MIN_WIDTH), height.max(MIN_HEIGHT))
}

fn install_window_event_handlers(
    app: &AppHandle,
    window: &tauri::WebviewWindow,
    identity: &str,
    product_id: &str,
    url: &str,
) {
    let event_app = app.clone();
    let event_window = window.clone();
    let identity = identity.to_string();
    let product_id = product_id.to_string();
    let url = url.to_string();

    window.on_window_event(move |event| match event {
        tauri::WindowEvent::Resized(_) | tauri::WindowEvent::Moved(_) => {
            if let Some(manager) = event_app.try_state::<WindowManager>() {
                if let Some(state) =
                    capture_window_state(&event_window, &identity, &product_id, &url)
                {
                    let _ = manager.record_window_state(state);
                }
            }
        }
        tauri::WindowEvent::Destroyed => {
            if let Some(manager) = event_app.try_state::<WindowManager>() {
                manager.forget_window(&identity);
            }
            diagnostics::log(format!("window_destroyed identity={}", identity));
        }
        _ => {}
    });
}

fn capture_window_state(
    window: &tauri::WebviewWindow,
    identity: &str,
    product_id: &str,
    url: &str,
) -> Option<WindowState> {
    let position = window.outer_position().ok()?;
    let size = window.inner_size().ok()?;
    Some(WindowState {
        id: identity.to_string(),
        product_id: product_id.to_string(),
        url: url.to_string(),
        bounds: WindowBounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        },
        is_maximized: window.is_maximized().unwrap_or(false),
        is_minimized: window.is_minimized().unwrap_or(false),
    })
}

/// A snapshot that cannot be read degrades to an empty one; geometry loss is
/// acceptable, refusing to start is not.
fn load_snapshot_or_default(store: &WindowStateStore) -> WindowStateSnapshot {
    match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            diagnostics::log(format!("window_state_load_error error={}", e));
            WindowStateSnapshot::default()
        }
    }
}

pub fn build_window_manager() -> WindowManager {
    let store = WindowStateStore::new(default_storage_root());
    let snapshot = load_snapshot_or_default(&store);
    let debounced = DebouncedStateStore::new(store, SAVE_DEBOUNCE_MS);

    WindowManager {
        store: debounced,
        snapshot: Mutex::new(snapshot),
        registry: Mutex::new(WindowRegistry::new()),
        catalog: ProductCatalog::new(),
    }
}

/// Opens (or focuses) the window for the configured entry URL. The product is
/// classified from the URL; unknown hosts get the default product.
pub fn open_entry_window(
    app: &AppHandle,
    manager: &WindowManager,
    settings: &SettingsManager,
) -> Result<tauri::WebviewWindow, String> {
    let entry = settings.entry_url();
    let product = manager
        .catalog
        .identify_product(&entry)
        .unwrap_or_else(|| manager.catalog.default_product());
    manager.create_or_reuse(app, WindowConfig::for_product(entry, product))
}

/// Routes a page-initiated request for a new browsing context. The target
/// alone decides: in-workspace targets navigate the requesting window in
/// place, everything else goes to the default browser.
#[tauri::command(rename_all = "camelCase")]
pub fn open_from_page(
    app: AppHandle,
    mut window: tauri::WebviewWindow,
    settings: State<'_, SettingsManager>,
    url: String,
) -> Result<(), String> {
    let entry = settings.entry_url();
    match route_new_window(&entry, &url) {
        NewWindowDisposition::NavigateInPlace => {
            let target = Url::parse(&url).map_err(|e| format!("invalid url: {}", e))?;
            window
                .navigate(target)
                .map_err(|e| format!("failed to navigate: {}", e))
        }
        NewWindowDisposition::OpenExternal => {
            diagnostics::log(format!("new_window_externalized url={}", url));
            app.opener()
                .open_url(&url, None::<&str>)
                .map_err(|e| format!("failed to open externally: {}", e))
        }
    }
}

/// Opens (or focuses) a product window for an explicit URL, classifying the
/// product from the catalog.
#[tauri::command(rename_all = "camelCase")]
pub fn open_product_window(
    app: AppHandle,
    manager: State<'_, WindowManager>,
    url: String,
    focused: Option<bool>,
) -> Result<String, String> {
    let product = manager
        .catalog
        .identify_product(&url)
        .unwrap_or_else(|| manager.catalog.generic_product());
    let mut config = WindowConfig::for_product(url, product);
    config.focused = focused.unwrap_or(true);
    let window = manager.create_or_reuse(&app, config)?;
    Ok(window.label().to_string())
}

#[tauri::command(rename_all = "camelCase")]
pub fn window_count(app: AppHandle, manager: State<'_, WindowManager>) -> usize {
    manager.count(&app)
}

#[tauri::command(rename_all = "camelCase")]
pub fn close_all_windows(app: AppHandle, manager: State<'_, WindowManager>) -> Result<(), String> {
    manager.close_all(&app)
}
