use std::path::PathBuf;

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::engine::models::{Registry, Version};
use crate::engine::state::{AppState, EngineUpdate, Mode, Notice, UserAction};
use crate::env::{LauncherConfig, safe_component};
use crate::networking::NetworkClient;
use crate::process::{self, ProcessError, ProcessLauncher};
use crate::storage::StorageManager;
use crate::util::progress_percent;

pub mod models;
pub mod state;

const NO_SELECTION: &str = "Please select a SuperTux version.";
const NOT_AN_EXECUTABLE: &str = "Could not detect SuperTux version. Is this a SuperTux executable?";
const FALLBACK_FILE_NAME: &str = "supertux";

type Updates = mpsc::UnboundedSender<EngineUpdate>;

/// Owns the install registry and catalog; every user action goes through `handle_action`.
pub struct LauncherEngine {
    pub state: AppState,
    mode: Mode,
    registry: Registry,
    catalog: Registry,
    catalog_url: String,
    crash_url: String,
    networking: NetworkClient,
    storage: StorageManager,
    process: ProcessLauncher,
}

impl LauncherEngine {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            state: AppState::Idle,
            mode: Mode::Main,
            registry: Registry::default(),
            catalog: Registry::default(),
            catalog_url: config.catalog_url.clone(),
            crash_url: config.crash_url.clone(),
            networking: NetworkClient::new(config.insecure_tls),
            storage: StorageManager::new(config.paths.clone()),
            process: ProcessLauncher::new(),
        }
    }

    pub async fn load_installs(&mut self, updates: &Updates) {
        info!(
            "load_installs: reading {}",
            self.storage.paths().installs_file().display()
        );
        self.registry = self.storage.load_registry().await;
        if self.registry.is_empty() {
            info!("load_installs: no versions registered yet");
        }
        debug!(
            "load_installs: {} versions in {} categories",
            self.registry.versions().count(),
            self.registry.categories().len()
        );
        self.publish_installed(updates);
        self.set_mode(Mode::Main, updates);
        self.set_state(AppState::Idle, updates);
    }

    pub async fn handle_action(&mut self, action: UserAction, updates: &Updates) {
        match action {
            UserAction::ShowMain => {
                info!("action: ShowMain");
                self.set_mode(Mode::Main, updates);
            }
            UserAction::ShowAddExisting => {
                info!("action: ShowAddExisting");
                self.set_mode(Mode::AddExisting, updates);
            }
            UserAction::AddExisting { label, path } => {
                info!("action: AddExisting");
                self.add_existing(label, path, updates).await;
            }
            UserAction::CheckForNewVersions => {
                info!("action: CheckForNewVersions");
                self.check_for_new_versions(updates).await;
            }
            UserAction::DownloadSelected { selection } => {
                info!("action: DownloadSelected");
                if let Some(version) = self.require_selection(selection, updates) {
                    self.download(version, updates).await;
                }
            }
            UserAction::Detach { selection } => {
                info!("action: Detach");
                if let Some(version) = self.require_selection(selection, updates) {
                    self.remove_entry(&version, updates).await;
                }
            }
            UserAction::Delete { selection } => {
                info!("action: Delete");
                if let Some(version) = self.require_selection(selection, updates) {
                    self.delete(version, updates).await;
                }
            }
            UserAction::Launch { selection } => {
                info!("action: Launch");
                if let Some(version) = self.require_selection(selection, updates) {
                    self.launch(version, updates).await;
                }
            }
            UserAction::OpenLog => {
                info!("action: OpenLog");
                self.open_log(updates);
            }
            UserAction::SendCrashReport => {
                info!("action: SendCrashReport");
                self.send_crash_report(updates).await;
            }
            UserAction::DismissCrash => {
                info!("action: DismissCrash");
                self.set_state(AppState::Idle, updates);
            }
        }
    }

    async fn add_existing(&mut self, label: String, path: String, updates: &Updates) {
        if label.is_empty() || path.is_empty() {
            debug!("add_existing: label or path missing; ignoring");
            return;
        }
        if let Some(problem) = unstorable_entry(&label, &path) {
            self.notify(Notice::error(problem), updates);
            return;
        }

        info!("add_existing: {label} -> {path}");
        self.registry.push_custom(Version::new(label, path));
        debug!(
            "add_existing: Custom holds {} versions",
            self.registry.custom().map_or(0, |c| c.versions.len())
        );
        self.persist(updates).await;
        self.publish_installed(updates);
        self.set_mode(Mode::Main, updates);
    }

    async fn check_for_new_versions(&mut self, updates: &Updates) {
        self.set_state(AppState::FetchingCatalog, updates);
        let dest = self.storage.paths().catalog_file();
        let result = self
            .networking
            .fetch_catalog(&self.catalog_url, &dest, |downloaded, total, _| {
                debug!("catalog progress: {downloaded} of {total:?} bytes");
            })
            .await;

        match result {
            Ok(_) => {
                self.catalog = self.storage.load_catalog().await;
                info!(
                    "check_for_new_versions: {} versions available",
                    self.catalog.versions().count()
                );
                self.publish_catalog(updates);
                self.set_mode(Mode::Download, updates);
            }
            Err(err) => {
                error!("Could not fetch versions from '{}': {err}", self.catalog_url);
                self.notify(
                    Notice::error(format!("Could not fetch list of versions: {err}")),
                    updates,
                );
            }
        }
        self.set_state(AppState::Idle, updates);
    }

    async fn download(&mut self, version: Version, updates: &Updates) {
        let file_name = install_file_name(&version.path);
        let install_dir = self.storage.paths().install_dir(&version.label);
        let dest = install_dir.join(&file_name);
        info!("download: {} -> {}", version.path, dest.display());

        if let Err(err) = tokio::fs::create_dir_all(&install_dir).await {
            error!("download: cannot create {}: {err}", install_dir.display());
            self.notify(
                Notice::error(format!(
                    "Could not create folder {}: {err}",
                    install_dir.display()
                )),
                updates,
            );
            return;
        }

        self.set_state(
            AppState::Downloading {
                file: file_name.clone(),
                progress: 0.0,
                downloaded: 0,
                total: None,
                speed: "starting".into(),
            },
            updates,
        );
        let result = self
            .networking
            .download_to_path(&version.path, &dest, |downloaded, total, speed| {
                let state = AppState::Downloading {
                    file: file_name.clone(),
                    progress: progress_percent(downloaded, total),
                    downloaded,
                    total,
                    speed: speed.to_owned(),
                };
                updates.send(EngineUpdate::State(state)).ok();
            })
            .await;

        match result {
            Ok(summary) => {
                info!(
                    "download: {} finished ({} bytes, announced {:?})",
                    version.label, summary.downloaded, summary.total
                );
            }
            Err(err) => {
                error!("download: {} failed: {err}", version.label);
                self.notify(
                    Notice::error(format!("Could not download {}: {err}", version.label)),
                    updates,
                );
                self.set_state(AppState::Idle, updates);
                return;
            }
        }

        self.registry.push_custom(Version::new(
            version.label,
            dest.to_string_lossy().into_owned(),
        ));
        self.persist(updates).await;
        if let Err(err) = process::mark_executable(&dest) {
            warn!("download: could not mark {} executable: {err}", dest.display());
        }
        self.publish_installed(updates);
        self.set_mode(Mode::Main, updates);
        self.set_state(AppState::Idle, updates);
    }

    async fn delete(&mut self, version: Version, updates: &Updates) {
        if let Err(err) = self.storage.remove_version_dirs(&version.label).await {
            error!("delete: {err}");
            self.notify(
                Notice::error(format!("Could not delete {}: {err}", version.label)),
                updates,
            );
            return;
        }
        self.remove_entry(&version, updates).await;
    }

    async fn remove_entry(&mut self, version: &Version, updates: &Updates) {
        match self.registry.remove_first(&version.label, &version.path) {
            Some(_) => info!("removed {} ({}) from the list", version.label, version.path),
            None => warn!(
                "{} ({}) was not in the list; nothing removed",
                version.label, version.path
            ),
        }
        self.persist(updates).await;
        self.publish_installed(updates);
    }

    async fn launch(&mut self, version: Version, updates: &Updates) {
        let program = PathBuf::from(&version.path);
        let log = self.storage.paths().console_log();

        self.set_state(AppState::Validating, updates);
        match self.process.probe_version(&program, &log).await {
            Ok(status) if status.success() => {
                debug!("launch: {} answered the version probe", program.display());
            }
            Ok(status) => {
                warn!("launch: version probe exited with {status}");
                self.notify(Notice::error(NOT_AN_EXECUTABLE), updates);
                self.set_state(AppState::Idle, updates);
                return;
            }
            Err(err @ ProcessError::Log { .. }) => {
                error!("launch: {err}");
                self.notify(
                    Notice::error(format!("Could not write the game log: {err}")),
                    updates,
                );
                self.set_state(AppState::Idle, updates);
                return;
            }
            Err(err) => {
                warn!("launch: version probe failed: {err}");
                self.notify(Notice::error(NOT_AN_EXECUTABLE), updates);
                self.set_state(AppState::Idle, updates);
                return;
            }
        }

        let user_dir = self.storage.paths().user_dir(&version.label);
        if let Err(err) = tokio::fs::create_dir_all(&user_dir).await {
            error!("launch: cannot create {}: {err}", user_dir.display());
            self.notify(
                Notice::error(format!(
                    "Could not create user folder {}: {err}",
                    user_dir.display()
                )),
                updates,
            );
            self.set_state(AppState::Idle, updates);
            return;
        }

        self.set_state(
            AppState::Playing {
                label: version.label.clone(),
            },
            updates,
        );
        match self
            .process
            .run_game(&program, &version.label, &user_dir, &log)
            .await
        {
            Ok(status) if status.success() => {
                info!("launch: {} exited normally", version.label);
                self.set_state(AppState::Exited, updates);
            }
            Ok(status) => {
                warn!("launch: {} crashed ({status})", version.label);
                self.set_state(AppState::Crashed { log }, updates);
            }
            Err(err) => {
                error!("launch: {err}");
                self.notify(
                    Notice::error(format!("Could not start SuperTux: {err}")),
                    updates,
                );
                self.set_state(AppState::Idle, updates);
            }
        }
    }

    fn open_log(&mut self, updates: &Updates) {
        let log = self.crash_log();
        if let Err(err) = open::that_detached(&log) {
            warn!("open_log: {}: {err}", log.display());
            self.notify(
                Notice::error(format!("Could not open {}: {err}", log.display())),
                updates,
            );
        }
        self.set_state(AppState::Idle, updates);
    }

    async fn send_crash_report(&mut self, updates: &Updates) {
        let log = self.crash_log();
        self.set_state(AppState::UploadingReport, updates);
        match self.networking.upload_crash(&self.crash_url, &log).await {
            Ok(()) => {
                info!("crash report uploaded");
                self.notify(
                    Notice::info(
                        "Report uploaded",
                        "The crash logs have successfully been uploaded. Please notify the \
                         developers about the crash.",
                    ),
                    updates,
                );
            }
            Err(err) => {
                error!("crash report upload failed: {err}");
                self.notify(
                    Notice::error(format!(
                        "The crash logs could not be uploaded. The error is: {err}"
                    )),
                    updates,
                );
            }
        }
        self.set_state(AppState::Idle, updates);
    }

    fn crash_log(&self) -> PathBuf {
        match &self.state {
            AppState::Crashed { log } => log.clone(),
            _ => self.storage.paths().console_log(),
        }
    }

    fn require_selection(&self, selection: Option<Version>, updates: &Updates) -> Option<Version> {
        let selected = selection.filter(Version::is_complete);
        if selected.is_none() {
            warn!("action needs a selected version");
            self.notify(Notice::error(NO_SELECTION), updates);
        }
        selected
    }

    async fn persist(&self, updates: &Updates) {
        if let Err(err) = self.storage.save_registry(&self.registry).await {
            error!("persist: {err}");
            self.notify(
                Notice::error(format!("Could not save the list of versions: {err}")),
                updates,
            );
        }
    }

    fn set_state(&mut self, state: AppState, updates: &Updates) {
        self.state = state.clone();
        updates.send(EngineUpdate::State(state)).ok();
    }

    fn set_mode(&mut self, mode: Mode, updates: &Updates) {
        self.mode = mode;
        updates.send(EngineUpdate::Mode(mode)).ok();
    }

    fn publish_installed(&self, updates: &Updates) {
        let versions = self.registry.versions().cloned().collect();
        updates.send(EngineUpdate::Installed(versions)).ok();
    }

    fn publish_catalog(&self, updates: &Updates) {
        let versions = self.catalog.versions().cloned().collect();
        updates.send(EngineUpdate::Catalog(versions)).ok();
    }

    fn notify(&self, notice: Notice, updates: &Updates) {
        updates.send(EngineUpdate::Notice(notice)).ok();
    }
}

/// Why a label/path pair would not survive a save and reload, if it would not.
fn unstorable_entry(label: &str, path: &str) -> Option<&'static str> {
    if label.contains(':') {
        Some("Version labels may not contain colons.")
    } else if label.starts_with('#') {
        Some("Version labels may not start with '#'.")
    } else if label.contains(['\n', '\r']) || path.contains(['\n', '\r']) {
        Some("Version labels and paths must fit on one line.")
    } else {
        None
    }
}

/// Last path segment of a download URL, usable as a file name.
fn install_file_name(url: &str) -> String {
    let path = reqwest::Url::parse(url)
        .map(|parsed| parsed.path().to_owned())
        .unwrap_or_else(|_| url.to_owned());
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => safe_component(name),
        _ => FALLBACK_FILE_NAME.to_owned(),
    }
}
