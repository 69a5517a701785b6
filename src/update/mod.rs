// ABOUTME: Handles application auto-updates using tauri-plugin-updater.
// ABOUTME: Provides commands for checking, downloading, and installing updates.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_updater::{Update, UpdaterExt};

use atlas_shell_core::diagnostics;

use crate::settings::SettingsManager;

/// Updater lifecycle as surfaced to pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum UpdateStatus {
    Idle,
    Checking,
    Available,
    Downloading,
    Ready,
    Error,
}

/// Release metadata attached to check results and the `update-available` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    pub body: Option<String>,
    pub date: Option<String>,
}

pub struct UpdateState {
    pub status: UpdateStatus,
    pub update_info: Option<UpdateInfo>,
    pub download_progress: f64,
    pub error: Option<String>,
    pub pending_update: Option<Update>,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            status: UpdateStatus::Idle,
            update_info: None,
            download_progress: 0.0,
            error: None,
            pending_update: None,
        }
    }
}

/// Cloneable handle to the shared updater state.
#[derive(Clone)]
pub struct UpdateManager {
    state: Arc<Mutex<UpdateState>>,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(UpdateState::default())),
        }
    }

    pub fn get_status(&self) -> UpdateStatus {
        self.state.lock().status.clone()
    }

    pub fn set_status(&self, status: UpdateStatus) {
        self.state.lock().status = status;
    }

    pub fn set_error(&self, error: Option<String>) {
        let mut state = self.state.lock();
        state.error = error;
        state.status = UpdateStatus::Error;
    }

    pub fn set_update_info(&self, info: Option<UpdateInfo>) {
        self.state.lock().update_info = info;
    }

    pub fn set_progress(&self, progress: f64) {
        self.state.lock().download_progress = progress;
    }

    pub fn set_pending_update(&self, update: Option<Update>) {
        self.state.lock().pending_update = update;
    }

    pub fn take_pending_update(&self) -> Option<Update> {
        self.state.lock().pending_update.take()
    }
}

/// Aggregate snapshot returned by `update_get_status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub status: UpdateStatus,
    pub update_info: Option<UpdateInfo>,
    pub download_progress: f64,
    pub error: Option<String>,
}

/// Menu-driven check: runs the same flow as the command and surfaces the
/// result to pages via `update-available`.
pub async fn run_check(app: AppHandle) -> Result<(), String> {
    let manager = app.state::<UpdateManager>().inner().clone();
    let info = check_inner(&app, &manager).await?;
    if let Some(info) = info {
        app.emit("update-available", info)
            .map_err(|e| format!("failed to emit: {}", e))?;
    }
    Ok(())
}

/// Checks the release endpoint and stages any update it finds.
#[tauri::command(rename_all = "camelCase")]
pub async fn update_check(
    app: AppHandle,
    update_manager: tauri::State<'_, UpdateManager>,
) -> Result<Option<UpdateInfo>, String> {
    check_inner(&app, &update_manager).await
}

async fn check_inner(
    app: &AppHandle,
    update_manager: &UpdateManager,
) -> Result<Option<UpdateInfo>, String> {
    update_manager.set_status(UpdateStatus::Checking);

    diagnostics::log("update_check started".to_string());

    let updater = app
        .updater()
        .map_err(|e| {
            let err_msg = format!("Updater not available: {}", e);
            diagnostics::log(format!("update_check error={}", err_msg));
            update_manager.set_error(Some(err_msg.clone()));
            err_msg
        })?;

    match updater.check().await {
        Ok(Some(update)) => {
            let info = UpdateInfo {
                version: update.version.clone(),
                body: update.body.clone(),
                date: update.date.map(|d| d.to_string()),
            };

            diagnostics::log(format!("update_check found version={}", info.version));

            update_manager.set_update_info(Some(info.clone()));
            update_manager.set_pending_update(Some(update));
            update_manager.set_status(UpdateStatus::Available);
            record_check_time(app);

            Ok(Some(info))
        }
        Ok(None) => {
            diagnostics::log("update_check no_update_available".to_string());
            update_manager.set_status(UpdateStatus::Idle);
            update_manager.set_update_info(None);
            record_check_time(app);

            Ok(None)
        }
        Err(e) => {
            let err_msg = format!("Failed to check for updates: {}", e);
            diagnostics::log(format!("update_check error={}", err_msg));
            update_manager.set_error(Some(err_msg.clone()));
            Err(err_msg)
        }
    }
}

fn record_check_time(app: &AppHandle) {
    if let Some(settings) = app.try_state::<SettingsManager>() {
        let _ = settings.set_last_update_check(now_iso());
    }
}

/// Downloads the staged update, streaming progress to pages.
#[tauri::command(rename_all = "camelCase")]
pub async fn update_download(
    app: AppHandle,
    update_manager: tauri::State<'_, UpdateManager>,
) -> Result<(), String> {
    let update = update_manager
        .take_pending_update()
        .ok_or_else(|| "No pending update to download".to_string())?;

    update_manager.set_status(UpdateStatus::Downloading);
    update_manager.set_progress(0.0);

    diagnostics::log(format!("update_download started version={}", update.version));

    let manager = update_manager.inner().clone();
    let app_handle = app.clone();

    match update
        .download(
            move |chunk_length, content_length| {
                if let Some(total) = content_length {
                    let progress = (chunk_length as f64 / total as f64) * 100.0;
                    manager.set_progress(progress);
                    let _ = app_handle.emit("update-download-progress", progress);
                }
            },
            || {},
        )
        .await
    {
        Ok(bytes) => {
            diagnostics::log(format!("update_download completed bytes={}", bytes.len()));
            update_manager.set_status(UpdateStatus::Ready);
            update_manager.set_progress(100.0);
            Ok(())
        }
        Err(e) => {
            let err_msg = format!("Failed to download update: {}", e);
            diagnostics::log(format!("update_download error={}", err_msg));
            update_manager.set_error(Some(err_msg.clone()));
            Err(err_msg)
        }
    }
}

/// Restarts into the downloaded update.
#[tauri::command(rename_all = "camelCase")]
pub async fn update_install(
    app: AppHandle,
    update_manager: tauri::State<'_, UpdateManager>,
) -> Result<(), String> {
    diagnostics::log("update_install starting".to_string());

    if update_manager.get_status() != UpdateStatus::Ready {
        return Err("No update ready to install".to_string());
    }

    diagnostics::log("update_install triggering restart".to_string());

    // restart() never returns
    app.restart();
}

#[tauri::command(rename_all = "camelCase")]
pub fn update_get_status(update_manager: tauri::State<'_, UpdateManager>) -> UpdateStatusResponse {
    let state = update_manager.state.lock();
    UpdateStatusResponse {
        status: state.status.clone(),
        update_info: state.update_info.clone(),
        download_progress: state.download_progress,
        error: state.error.clone(),
    }
}

fn now_iso() -> String {
    use time::format_description::well_known::Iso8601;
    use time::OffsetDateTime;
    OffsetDateTime::now_utc()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_else(|_| String::new())
}

pub fn build_update_manager() -> UpdateManager {
    UpdateManager::new()
}
