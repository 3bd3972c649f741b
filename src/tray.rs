//! System tray front end.

use crate::db::Database;
use crate::models::{SettingKey, Settings};
use crate::service::{ReplayService, ServiceCommand};
use crate::{get_db_path, open_database, safe_lock, InitError};
use log::{error, info, warn};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tauri::{
    menu::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem},
    tray::TrayIconBuilder,
    AppHandle, Manager, RunEvent, Wry,
};

/// Holds the service thread handle for graceful shutdown
pub struct ServiceHandle(Mutex<Option<JoinHandle<()>>>);

/// Sends commands to the service thread
pub struct CommandSender(Mutex<Sender<ServiceCommand>>);

/// Check items whose state mirrors stored settings
pub struct ToggleItems {
    enabled: CheckMenuItem<Wry>,
    notify_on_save: CheckMenuItem<Wry>,
}

fn send_command(app: &AppHandle, command: ServiceCommand) {
    if let Some(sender) = app.try_state::<CommandSender>() {
        if let Err(e) = safe_lock(&sender.0, "Command sender").send(command) {
            error!("Replay service is gone, dropping {command:?}: {e}");
        }
    }
}

/// Flip a boolean setting, persist it and tell the service.
fn toggle_setting(app: &AppHandle, key: SettingKey) {
    let Some(db) = app.try_state::<Arc<Mutex<Database>>>() else {
        return;
    };

    let result = {
        let db = safe_lock(&db, "Database");
        Settings::load(db.connection())
            .map_err(crate::error::AppError::from)
            .and_then(|current| {
                let value = match key {
                    SettingKey::Enabled => !current.enabled,
                    SettingKey::EnableNotif => !current.notify_on_save,
                    SettingKey::Scene
                    | SettingKey::Profile
                    | SettingKey::RefreshInterval
                    | SettingKey::ToastDuration
                    | SettingKey::SanitizePolicy
                    | SettingKey::ObsUrl
                    | SettingKey::ObsPassword => return Ok(current),
                };
                Settings::set(db.connection(), key, &value.to_string())
            })
    };

    match result {
        Ok(settings) => {
            info!("{key} set to {}", settings.stored_value(key));
            if let Some(items) = app.try_state::<ToggleItems>() {
                let synced = items
                    .enabled
                    .set_checked(settings.enabled)
                    .and_then(|()| items.notify_on_save.set_checked(settings.notify_on_save));
                if let Err(e) = synced {
                    warn!("Failed to update tray menu: {e}");
                }
            }
            send_command(app, ServiceCommand::ReloadSettings);
        }
        Err(e) => error!("Failed to toggle {key}: {e}"),
    }
}

fn shutdown(app: &AppHandle) {
    if let Some(service) = app.try_state::<Arc<ReplayService>>() {
        service.stop();
    }
    if let Some(handle_state) = app.try_state::<ServiceHandle>() {
        if let Some(handle) = safe_lock(&handle_state.0, "Service handle").take() {
            if handle.join().is_err() {
                error!("Replay service thread panicked");
            }
        }
    }
    app.exit(0);
}

pub fn run() {
    let app = tauri::Builder::default()
        .setup(|app| {
            let db_path = get_db_path()?;
            let db = open_database(&db_path)?;
            let settings = Settings::load(db.connection()).map_err(InitError::Settings)?;
            info!("Using database at {}", db_path.display());

            let db = Arc::new(Mutex::new(db));
            let service = ReplayService::new(Arc::clone(&db), settings.clone());
            let sender = service.sender();
            let handle = service.start();

            app.manage(db);
            app.manage(Arc::new(service));
            app.manage(ServiceHandle(Mutex::new(Some(handle))));
            app.manage(CommandSender(Mutex::new(sender)));

            let enabled = CheckMenuItem::with_id(app, "enabled", "Enable Clipping", true, settings.enabled, None::<&str>)?;
            let notify_on_save = CheckMenuItem::with_id(
                app,
                "enable_notif",
                "Notification On Save",
                true,
                settings.notify_on_save,
                None::<&str>,
            )?;
            let check = MenuItem::with_id(app, "check_status", "Check Replay Buffer", true, None::<&str>)?;
            let update = MenuItem::with_id(app, "update_game", "Update Current Game", true, None::<&str>)?;
            let separator = PredefinedMenuItem::separator(app)?;
            let quit = MenuItem::with_id(app, "quit", "Quit AutoReplay", true, None::<&str>)?;
            let menu = Menu::with_items(
                app,
                &[&enabled, &notify_on_save, &separator, &check, &update, &separator, &quit],
            )?;

            app.manage(ToggleItems {
                enabled,
                notify_on_save,
            });

            let mut tray = TrayIconBuilder::new()
                .menu(&menu)
                .show_menu_on_left_click(true)
                .tooltip("AutoReplay");
            if let Some(icon) = app.default_window_icon() {
                tray = tray.icon(icon.clone());
            }
            tray.on_menu_event(|app, event| match event.id.0.as_str() {
                "enabled" => toggle_setting(app, SettingKey::Enabled),
                "enable_notif" => toggle_setting(app, SettingKey::EnableNotif),
                "check_status" => send_command(app, ServiceCommand::CheckStatus),
                "update_game" => send_command(app, ServiceCommand::UpdateGame),
                "quit" => shutdown(app),
                other => warn!("Unknown tray menu item '{other}'"),
            })
            .build(app)?;

            Ok(())
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start AutoReplay: {e}");
            return;
        }
    };

    app.run(|_app, event| {
        // Tray-only app: keep running with no windows open
        if let RunEvent::ExitRequested { api, code, .. } = event {
            if code.is_none() {
                api.prevent_exit();
            }
        }
    });
}
