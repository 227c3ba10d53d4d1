use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use log::{debug, info};
use thiserror::Error;
use tokio::process::Command;

const VERSION_PROBE_ARG: &str = "--version";
const USERDIR_ARG: &str = "--userdir";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("unable to open log file {}: {source}", path.display())]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    Truncate,
    Append,
}

#[derive(Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Run `program --version`, replacing the log with its output.
    pub async fn probe_version(&self, program: &Path, log: &Path) -> Result<ExitStatus, ProcessError> {
        self.run_logged(program, &[OsStr::new(VERSION_PROBE_ARG)], log, LogMode::Truncate)
            .await
    }

    /// Run the game with its own user directory, appending its output to the log.
    pub async fn run_game(
        &self,
        program: &Path,
        label: &str,
        user_dir: &Path,
        log: &Path,
    ) -> Result<ExitStatus, ProcessError> {
        write_session_header(log, label)?;
        self.run_logged(
            program,
            &[OsStr::new(USERDIR_ARG), user_dir.as_os_str()],
            log,
            LogMode::Append,
        )
        .await
    }

    /// Run `program` to completion with stdout and stderr both going to `log`.
    pub async fn run_logged(
        &self,
        program: &Path,
        args: &[&OsStr],
        log: &Path,
        mode: LogMode,
    ) -> Result<ExitStatus, ProcessError> {
        let stdout = open_log(log, mode)?;
        let stderr = stdout.try_clone().map_err(|source| ProcessError::Log {
            path: log.to_path_buf(),
            source,
        })?;

        debug!("process: {} {:?} -> {}", program.display(), args, log.display());
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;
        info!("process: {} exited with {status}", program.display());
        Ok(status)
    }
}

fn open_log(log: &Path, mode: LogMode) -> Result<File, ProcessError> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        LogMode::Truncate => options.write(true).truncate(true),
        LogMode::Append => options.append(true),
    };
    options.open(log).map_err(|source| ProcessError::Log {
        path: log.to_path_buf(),
        source,
    })
}

fn write_session_header(log: &Path, label: &str) -> Result<(), ProcessError> {
    let mut file = open_log(log, LogMode::Append)?;
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "\n--- {label} started {stamp} ---").map_err(|source| ProcessError::Log {
        path: log.to_path_buf(),
        source,
    })
}

/// Give the owner read/write/execute and everyone else read/execute.
#[cfg(unix)]
pub fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
pub fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
