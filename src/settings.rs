// ABOUTME: Persisted shell settings, most importantly the workspace entry URL.
// ABOUTME: Stored as JSON under the app data root with atomic tmp+rename writes.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tauri::{Emitter, State};
use url::Url;

use atlas_shell_core::catalog::DEFAULT_ENTRY_URL;
use atlas_shell_core::diagnostics;
use atlas_shell_core::state::default_storage_root;

const SETTINGS_FILE: &str = "settings.json";

/// User-adjustable shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShellSettings {
    #[serde(default = "default_entry_url")]
    pub entry_url: String,
    #[serde(default)]
    pub last_update_check: Option<String>,
}

fn default_entry_url() -> String {
    DEFAULT_ENTRY_URL.to_string()
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            entry_url: default_entry_url(),
            last_update_check: None,
        }
    }
}

/// Normalizes a user-supplied entry URL: a missing scheme defaults to https,
/// and bare Atlassian Cloud hosts land on the Jira projects page instead of
/// the tenant root.
///
/// Example:
/// ```rust,ignore
/// let url = normalize_entry_url("acme.atlassian.net");
/// assert_eq!(url, "https://acme.atlassian.net/jira/projects");
/// ```
pub fn normalize_entry_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_ENTRY_URL.to_string();
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("").to_lowercase();
            let is_cloud_host = host == "atlassian.net" || host.ends_with(".atlassian.net");
            if is_cloud_host && !parsed.path().contains("/jira") {
                let mut base = with_scheme.trim_end_matches('/').to_string();
                base.push_str("/jira/projects");
                base
            } else {
                with_scheme
            }
        }
        Err(_) => DEFAULT_ENTRY_URL.to_string(),
    }
}

/// SettingsManager owns the settings file and the in-memory copy.
///
/// Example:
/// ```rust,ignore
/// let manager = build_settings_manager();
/// let entry = manager.entry_url();
/// ```
pub struct SettingsManager {
    root: PathBuf,
    settings: Mutex<ShellSettings>,
}

impl SettingsManager {
    pub fn new(root: PathBuf) -> Self {
        let settings = Self::load_from(&root);
        Self {
            root,
            settings: Mutex::new(settings),
        }
    }

    /// A settings file that cannot be read or parsed degrades to defaults;
    /// startup never fails on it.
    fn load_from(root: &Path) -> ShellSettings {
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            return ShellSettings::default();
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                diagnostics::log(format!("settings_read_error error={}", e));
                return ShellSettings::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                diagnostics::log(format!("settings_parse_error error={}", e));
                ShellSettings::default()
            }
        }
    }

    pub fn entry_url(&self) -> String {
        self.settings.lock().entry_url.clone()
    }

    pub fn get(&self) -> ShellSettings {
        self.settings.lock().clone()
    }

    pub fn set_entry_url(&self, raw: &str) -> Result<String, String> {
        let normalized = normalize_entry_url(raw);
        {
            let mut settings = self.settings.lock();
            settings.entry_url = normalized.clone();
            self.persist(&settings)?;
        }
        diagnostics::log(format!("entry_url_changed url={}", normalized));
        Ok(normalized)
    }

    pub fn set_last_update_check(&self, timestamp: String) -> Result<(), String> {
        let mut settings = self.settings.lock();
        settings.last_update_check = Some(timestamp);
        self.persist(&settings)
    }

    fn persist(&self, settings: &ShellSettings) -> Result<(), String> {
        fs::create_dir_all(&self.root)
            .map_err(|e| format!("failed to create settings dir: {}", e))?;
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("failed to serialize settings: {}", e))?;
        let path = self.root.join(SETTINGS_FILE);
        let tmp = self.root.join(format!("{}.tmp", SETTINGS_FILE));
        fs::write(&tmp, json).map_err(|e| format!("failed to write settings: {}", e))?;
        fs::rename(&tmp, &path).map_err(|e| format!("failed to commit settings: {}", e))?;
        Ok(())
    }
}

pub fn build_settings_manager() -> SettingsManager {
    SettingsManager::new(default_storage_root())
}

#[tauri::command(rename_all = "camelCase")]
pub fn get_settings(state: State<'_, SettingsManager>) -> ShellSettings {
    state.get()
}

#[tauri::command(rename_all = "camelCase")]
pub fn get_entry_url(state: State<'_, SettingsManager>) -> String {
    state.entry_url()
}

/// Changes the workspace entry URL. Open windows are told to re-anchor via
/// the `entry-url-changed` event rather than being torn down.
#[tauri::command(rename_all = "camelCase")]
pub fn set_entry_url(
    app: tauri::AppHandle,
    state: State<'_, SettingsManager>,
    url: String,
) -> Result<String, String> {
    let normalized = state.set_entry_url(&url)?;
    app.emit("entry-url-changed", normalized.clone())
        .map_err(|e| format!("failed to emit: {}", e))?;
    Ok(normalized)
}
