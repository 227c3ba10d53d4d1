use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ORG_DIR: &str = "SuperTux";
const APP_DIR: &str = "stlauncher";
const INSTALLS_FILE: &str = "installs.txt";
const CATALOG_FILE: &str = "versions.txt";
const CONSOLE_LOG_FILE: &str = "console.log";

const CATALOG_BASE_URL: &str = "http://supertux.semphris.com/versions";
pub const DEFAULT_CRASH_URL: &str = "https://supertux.semphris.com/upload_crash";

/// Returns the per-user preference directory used by the launcher.
pub fn default_app_dir() -> PathBuf {
    let base = match env::consts::OS {
        "windows" => env::var_os("APPDATA")
            .or_else(|| env::var_os("LOCALAPPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("XDG_DATA_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var_os("HOME")
                    .map(PathBuf::from)
                    .map(|home| home.join(".local").join("share"))
            }),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join(ORG_DIR).join(APP_DIR)
}

/// Platform identifier used by the version server, e.g. `x64-linux`.
pub fn platform_id() -> String {
    let arch = match env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        "aarch64" => "arm64",
        other => other,
    };
    let os = if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    };
    format!("{arch}-{os}")
}

pub fn default_catalog_url() -> String {
    format!("{CATALOG_BASE_URL}/{}", platform_id())
}

/// Turn a label or file name into a single path component.
pub fn safe_component(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "_".repeat(cleaned.len().max(1)),
        _ => cleaned,
    }
}

/// On-disk layout rooted at the launcher data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn installs_file(&self) -> PathBuf {
        self.root.join(INSTALLS_FILE)
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn console_log(&self) -> PathBuf {
        self.root.join(CONSOLE_LOG_FILE)
    }

    pub fn installs_root(&self) -> PathBuf {
        self.root.join("installs")
    }

    pub fn userdirs_root(&self) -> PathBuf {
        self.root.join("userdirs")
    }

    pub fn install_dir(&self, label: &str) -> PathBuf {
        self.installs_root().join(safe_component(label))
    }

    pub fn user_dir(&self, label: &str) -> PathBuf {
        self.userdirs_root().join(safe_component(label))
    }

    /// Create the folder layout expected by the launcher.
    pub fn ensure_base_dirs(&self) -> std::io::Result<()> {
        for dir in [self.root.clone(), self.installs_root(), self.userdirs_root()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct LauncherConfig {
    pub paths: LauncherPaths,
    pub catalog_url: String,
    pub crash_url: String,
    /// Skip TLS certificate validation. Debugging only.
    pub insecure_tls: bool,
}

impl LauncherConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: LauncherPaths::new(root),
            catalog_url: default_catalog_url(),
            crash_url: DEFAULT_CRASH_URL.to_owned(),
            insecure_tls: false,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::with_root(default_app_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_labels_as_directory_names() {
        assert_eq!(safe_component("0.6.3"), "0.6.3");
        assert_eq!(safe_component("Nightly build"), "Nightly build");
    }

    #[test]
    fn flattens_separators_in_labels() {
        assert_eq!(safe_component("../evil"), ".._evil");
        assert_eq!(safe_component("a\\b/c"), "a_b_c");
        assert_eq!(safe_component(".."), "__");
        assert_eq!(safe_component(""), "_");
    }

    #[test]
    fn lays_out_version_directories_under_root() {
        let paths = LauncherPaths::new("/data");
        assert_eq!(paths.installs_file(), PathBuf::from("/data/installs.txt"));
        assert_eq!(paths.catalog_file(), PathBuf::from("/data/versions.txt"));
        assert_eq!(paths.install_dir("v1"), PathBuf::from("/data/installs/v1"));
        assert_eq!(paths.user_dir("v1"), PathBuf::from("/data/userdirs/v1"));
    }

    #[test]
    fn catalog_url_ends_with_platform_id() {
        let url = default_catalog_url();
        assert!(url.starts_with(CATALOG_BASE_URL));
        assert!(url.ends_with(&platform_id()));
        assert!(platform_id().contains('-'));
    }
}
