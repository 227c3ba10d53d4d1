use std::path::PathBuf;

use crate::engine::models::Version;

/// Which panel the launcher shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Main,
    AddExisting,
    Download,
}

// What the engine is busy with.
#[derive(Clone, Debug, PartialEq)]
pub enum AppState {
    Idle,
    FetchingCatalog,
    Downloading {
        file: String,
        progress: f32,
        downloaded: u64,
        total: Option<u64>,
        speed: String,
    },
    Validating,
    Playing {
        label: String,
    },
    Crashed {
        log: PathBuf,
    },
    UploadingReport,
    Exited,
}

impl AppState {
    /// Actions other than the crash dialog are accepted.
    pub fn accepts_actions(&self) -> bool {
        matches!(self, AppState::Idle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A modal message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }
}

// Everything the UI needs to redraw, pushed from the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineUpdate {
    State(AppState),
    Mode(Mode),
    Installed(Vec<Version>),
    Catalog(Vec<Version>),
    Notice(Notice),
}

// Actions triggered by the user from the UI layer.
#[derive(Clone, Debug)]
pub enum UserAction {
    ShowMain,
    ShowAddExisting,
    AddExisting {
        label: String,
        path: String,
    },
    CheckForNewVersions,
    DownloadSelected {
        selection: Option<Version>,
    },
    /// Drop the entry from the list, leave files alone. Sent after the user confirmed.
    Detach {
        selection: Option<Version>,
    },
    /// Delete files and user data, then detach. Sent after the user confirmed.
    Delete {
        selection: Option<Version>,
    },
    Launch {
        selection: Option<Version>,
    },
    OpenLog,
    SendCrashReport,
    DismissCrash,
}
