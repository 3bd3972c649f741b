use crate::constants::{EVENT_WAIT_SLICE, RECONNECT_DELAY};
use crate::controller::AutoReplayController;
use crate::db::Database;
use crate::host::obs::ObsClient;
use crate::host::HostEvent;
use crate::models::Settings;
use crate::notify::{DesktopNotifier, LogNotifier, NotificationSink};
use crate::platform::{AppNameResolver, NativeProbe};
use crate::relocator::FsMover;
use crate::safe_lock;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Actions requested from outside the service thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    CheckStatus,
    UpdateGame,
    /// Re-read settings from the database. Reconnects if the host address changed.
    ReloadSettings,
}

/// Why a connected session ended.
enum SessionEnd {
    Stopped,
    Disconnected,
    Reconnect,
}

/// Owns the host connection and the controller on a background thread.
pub struct ReplayService {
    running: Arc<AtomicBool>,
    db: Arc<Mutex<Database>>,
    settings: Settings,
    quiet_toasts: bool,
    sender: Sender<ServiceCommand>,
    receiver: Mutex<Option<Receiver<ServiceCommand>>>,
}

impl ReplayService {
    pub fn new(db: Arc<Mutex<Database>>, settings: Settings) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(false)),
            db,
            settings,
            quiet_toasts: false,
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Log toasts instead of showing them on the desktop.
    pub fn quiet_toasts(mut self, quiet: bool) -> Self {
        self.quiet_toasts = quiet;
        self
    }

    pub fn sender(&self) -> Sender<ServiceCommand> {
        self.sender.clone()
    }

    pub fn start(&self) -> thread::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let db = Arc::clone(&self.db);
        let settings = self.settings.clone();
        let quiet_toasts = self.quiet_toasts;
        let commands = safe_lock(&self.receiver, "Service commands")
            .take()
            .unwrap_or_else(|| {
                warn!("Replay service already started once, commands will not be delivered");
                mpsc::channel().1
            });

        thread::spawn(move || {
            let notifier: Box<dyn NotificationSink> = if quiet_toasts {
                Box::new(LogNotifier)
            } else {
                Box::new(DesktopNotifier::new())
            };
            let controller = AutoReplayController::new(
                settings,
                notifier,
                Box::new(FsMover),
                Box::new(AppNameResolver::new(NativeProbe::new())),
            );

            let mut worker = Worker {
                running,
                db,
                commands,
                controller,
            };
            worker.run();
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// State living on the service thread.
struct Worker {
    running: Arc<AtomicBool>,
    db: Arc<Mutex<Database>>,
    commands: Receiver<ServiceCommand>,
    controller: AutoReplayController,
}

impl Worker {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn run(&mut self) {
        while self.is_running() {
            self.reload_settings();
            let url = self.controller.settings().obs_url.clone();
            let password = self.controller.settings().obs_password.clone();

            let mut client = match ObsClient::connect(&url, password.as_deref()) {
                Ok(client) => client,
                Err(e) => {
                    warn!("Could not connect to OBS at {url}: {e}. Retrying in {}s", RECONNECT_DELAY.as_secs());
                    self.wait_disconnected(RECONNECT_DELAY);
                    continue;
                }
            };
            let end = self.serve(&mut client);
            self.controller.disconnected();
            client.close();

            match end {
                SessionEnd::Stopped => break,
                SessionEnd::Reconnect => info!("Host settings changed, reconnecting"),
                SessionEnd::Disconnected => {
                    warn!("Lost connection to OBS");
                    self.wait_disconnected(RECONNECT_DELAY);
                }
            }
        }
        info!("Replay service stopped");
    }

    /// Poll on the refresh interval and handle events in between.
    fn serve(&mut self, client: &mut ObsClient) -> SessionEnd {
        let mut next_tick = Instant::now();

        while self.is_running() {
            while let Ok(command) = self.commands.try_recv() {
                if self.run_command(client, command) {
                    return SessionEnd::Reconnect;
                }
            }

            if Instant::now() >= next_tick {
                if self.reload_settings() {
                    return SessionEnd::Reconnect;
                }
                self.controller.tick(client);
                next_tick = Instant::now() + self.controller.settings().refresh_interval();
            }

            match client.next_event() {
                Ok(Some(HostEvent::Exiting)) => {
                    info!("OBS is exiting");
                    return SessionEnd::Disconnected;
                }
                Ok(Some(event)) => {
                    if let Err(e) = self.controller.handle_event(client, event) {
                        error!("Failed to handle host event: {e}");
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_disconnect() => {
                    warn!("{e}");
                    return SessionEnd::Disconnected;
                }
                Err(e) => warn!("Ignoring bad host message: {e}"),
            }
        }
        SessionEnd::Stopped
    }

    /// Returns true when the connection must be re-established.
    fn run_command(&mut self, client: &mut ObsClient, command: ServiceCommand) -> bool {
        let result = match command {
            ServiceCommand::CheckStatus => self.controller.check_status(client).map(|_| ()),
            ServiceCommand::UpdateGame => self.controller.update_game(client).map(|_| ()),
            ServiceCommand::ReloadSettings => return self.reload_settings(),
        };
        if let Err(e) = result {
            warn!("{command:?} failed: {e}");
        }
        false
    }

    /// Pick up changes written to the database by other processes.
    ///
    /// Returns true when the host address or password changed.
    fn reload_settings(&mut self) -> bool {
        let loaded = {
            let db = safe_lock(&self.db, "Database");
            Settings::load(db.connection())
        };
        match loaded {
            Ok(settings) => {
                let current = self.controller.settings();
                if *current == settings {
                    return false;
                }
                let reconnect = current.obs_url != settings.obs_url
                    || current.obs_password != settings.obs_password;
                info!("Settings reloaded");
                self.controller.set_settings(settings);
                reconnect
            }
            Err(e) => {
                error!("Failed to reload settings: {e}");
                false
            }
        }
    }

    /// Sleep while disconnected, still applying settings and dropping host-bound commands.
    fn wait_disconnected(&mut self, delay: Duration) {
        let deadline = Instant::now() + delay;
        while self.is_running() && Instant::now() < deadline {
            while let Ok(command) = self.commands.try_recv() {
                match command {
                    ServiceCommand::ReloadSettings => {
                        self.reload_settings();
                    }
                    ServiceCommand::CheckStatus | ServiceCommand::UpdateGame => {
                        warn!("Not connected to OBS, ignoring {command:?}");
                    }
                }
            }
            thread::sleep(EVENT_WAIT_SLICE);
        }
    }
}
