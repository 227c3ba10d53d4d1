use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::{info, warn};

mod engine;
mod env;
mod networking;
mod process;
mod storage;
mod ui;
mod util;

use crate::env::LauncherConfig;

#[derive(Parser, Debug)]
#[command(
    name = "SuperTux Launcher",
    author,
    version,
    about = "Install, manage and play several versions of SuperTux side by side"
)]
struct Cli {
    /// Print launcher version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,

    /// Directory holding installs.txt, installs/, userdirs/ and console.log.
    #[arg(long, env = "STLAUNCHER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// URL of the remote version list for this platform.
    #[arg(long, env = "STLAUNCHER_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Endpoint receiving crash logs.
    #[arg(long, env = "STLAUNCHER_CRASH_URL")]
    crash_url: Option<String>,

    /// Accept invalid TLS certificates. Only for debugging broken mirrors.
    #[arg(long)]
    insecure_tls: bool,
}

impl Cli {
    fn into_config(self) -> LauncherConfig {
        let mut config = match self.data_dir {
            Some(dir) => LauncherConfig::with_root(dir),
            None => LauncherConfig::default(),
        };
        if let Some(url) = self.catalog_url {
            config.catalog_url = url;
        }
        if let Some(url) = self.crash_url {
            config.crash_url = url;
        }
        config.insecure_tls = self.insecure_tls;
        config
    }
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("SuperTux Launcher {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = cli.into_config();
    info!("data directory: {}", config.paths.root().display());
    if let Err(err) = config.paths.ensure_base_dirs() {
        warn!(
            "could not create {}: {err}; installs may fail",
            config.paths.root().display()
        );
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_icon(default_icon())
            .with_inner_size(eframe::egui::vec2(640.0, 460.0))
            .with_min_inner_size(eframe::egui::vec2(560.0, 400.0)),
        ..Default::default()
    };
    eframe::run_native(
        "SuperTux Launcher",
        options,
        Box::new(move |cc| Ok(Box::new(ui::LauncherApp::new(cc, config)))),
    )
}

fn default_icon() -> eframe::egui::IconData {
    // 2x2 placeholder: night sky with a snow accent.
    let rgba: Vec<u8> = vec![
        20, 24, 32, 255, 235, 240, 250, 255, //
        20, 24, 32, 255, 92, 219, 195, 255,
    ];
    eframe::egui::IconData {
        rgba,
        width: 2,
        height: 2,
    }
}
