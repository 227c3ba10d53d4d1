use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    self, Align, Align2, Color32, CornerRadius, Frame, Layout, Margin, RichText, Stroke, Vec2,
};
use log::{debug, error, warn};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{Mutex, mpsc};

use crate::engine::LauncherEngine;
use crate::engine::models::Version;
use crate::engine::state::{AppState, EngineUpdate, Mode, Notice, NoticeKind, UserAction};
use crate::env::LauncherConfig;
use crate::util::{format_megabytes, progress_percent};

const LIST_HEIGHT: f32 = 190.0;
const BUSY_REPAINT: Duration = Duration::from_millis(100);

const DETACH_TITLE: &str = "Detaching version";
const DETACH_BODY: &str = "This will remove the version from the list. It will NOT uninstall\n\
the game from this PC.\n\n\
This is intended for versions that aren't managed by the launcher;\n\
if you also want to uninstall that version, please use the trash can\n\
button instead.\n\n\
Do you want to remove this version from the list without uninstalling it?";
const DELETE_TITLE: &str = "Deleting version";
const DELETE_BODY: &str = "This will delete all files associated with the given version.\n\n\
ALL PROGRESS, LEVELS AND SAVE DATA ASSOCIATED WITH THIS VERSION WILL\n\
BE DELETED AS WELL. If the game has been installed manually, it will\n\
not be uninstalled.\n\n\
Do you want to completely remove this version from your system?";
const CRASH_TITLE: &str = "Oops!";
const CRASH_BODY: &str = "It looks like SuperTux crashed.\n\n\
Do you want to send the logs to the developers to help them fix this bug?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ThemePalette {
    bg: Color32,
    panel: Color32,
    surface: Color32,
    surface_elev: Color32,
    sunken_surface: Color32,
    border: Color32,
    border_strong: Color32,
    text_primary: Color32,
    text_muted: Color32,
    accent: Color32,
    accent_soft: Color32,
    accent_glow: Color32,
    info: Color32,
    warning: Color32,
    danger: Color32,
}

impl ThemePalette {
    const fn dark() -> Self {
        Self {
            bg: Color32::from_rgb(11, 14, 19),
            panel: Color32::from_rgb(17, 22, 29),
            surface: Color32::from_rgb(24, 31, 39),
            surface_elev: Color32::from_rgb(29, 37, 47),
            sunken_surface: Color32::from_rgb(14, 18, 24),
            border: Color32::from_rgb(45, 57, 72),
            border_strong: Color32::from_rgb(63, 79, 97),
            text_primary: Color32::from_rgb(228, 235, 244),
            text_muted: Color32::from_rgb(167, 182, 197),
            accent: Color32::from_rgb(92, 219, 195),
            accent_soft: Color32::from_rgb(63, 140, 125),
            accent_glow: Color32::from_rgb(151, 239, 217),
            info: Color32::from_rgb(122, 186, 255),
            warning: Color32::from_rgb(246, 195, 111),
            danger: Color32::from_rgb(239, 117, 117),
        }
    }
}

fn tint(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_premultiplied(color.r(), color.g(), color.b(), alpha)
}

fn section_frame(colors: &ThemePalette) -> Frame {
    Frame::new()
        .fill(colors.surface)
        .stroke(Stroke::new(1.0, colors.border))
        .corner_radius(14.0)
        .inner_margin(14.0)
}

fn badge_frame(color: Color32) -> Frame {
    Frame::new()
        .fill(tint(color, 32))
        .stroke(Stroke::new(1.0, color))
        .corner_radius(999.0)
        .inner_margin(Margin::symmetric(10, 4))
}

fn primary_cta_button(
    label: impl Into<egui::WidgetText>,
    colors: &ThemePalette,
    min_width: f32,
) -> egui::Button<'_> {
    egui::Button::new(label)
        .fill(colors.accent_soft)
        .stroke(Stroke::new(1.0, colors.accent))
        .min_size(Vec2::new(min_width, 34.0))
}

fn secondary_button(label: impl Into<egui::WidgetText>, colors: &ThemePalette) -> egui::Button<'_> {
    egui::Button::new(label)
        .fill(colors.surface_elev)
        .stroke(Stroke::new(1.0, colors.border_strong))
        .min_size(Vec2::new(90.0, 30.0))
}

fn apply_theme(ctx: &egui::Context, colors: &ThemePalette) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = colors.bg;
    visuals.window_fill = colors.panel;
    visuals.override_text_color = Some(colors.text_primary);
    visuals.hyperlink_color = colors.accent_glow;
    let rounding = CornerRadius::same(10);
    visuals.widgets.noninteractive.corner_radius = rounding;
    visuals.widgets.inactive.corner_radius = rounding;
    visuals.widgets.hovered.corner_radius = rounding;
    visuals.widgets.active.corner_radius = rounding;
    visuals.widgets.noninteractive.bg_fill = colors.surface;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, colors.border);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors.text_muted);
    visuals.widgets.inactive.bg_fill = colors.surface_elev;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, colors.border_strong);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, colors.text_muted);
    visuals.widgets.hovered.bg_fill = colors.accent_soft;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.3, colors.accent);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, colors.text_primary);
    visuals.widgets.active.bg_fill = colors.accent;
    visuals.widgets.active.bg_stroke = Stroke::new(1.5, colors.accent_glow);
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, colors.text_primary);
    visuals.selection.bg_fill = colors.accent_soft;
    visuals.selection.stroke = Stroke::new(1.0, colors.accent_glow);
    visuals.faint_bg_color = colors.sunken_surface;
    visuals.extreme_bg_color = colors.sunken_surface;
    visuals.window_corner_radius = CornerRadius::same(14);
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = Vec2::new(10.0, 10.0);
    style.spacing.button_padding = Vec2::new(14.0, 8.0);
    ctx.set_style(style);
}

fn build_runtime() -> Arc<Runtime> {
    match Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(err) => {
            warn!(
                "ui: failed to create multithreaded runtime ({}); trying single-threaded runtime",
                err
            );
            match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => Arc::new(rt),
                Err(fallback_err) => {
                    error!(
                        "ui: failed to create any Tokio runtime ({}); terminating launcher",
                        fallback_err
                    );
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Status line for a busy engine state, or `None` while idle.
fn status_text(state: &AppState) -> Option<String> {
    match state {
        AppState::Idle | AppState::Crashed { .. } | AppState::Exited => None,
        AppState::FetchingCatalog => Some("Fetching list of versions...".into()),
        AppState::Downloading { file, .. } => Some(format!("Downloading {file}")),
        AppState::Validating => Some("Checking SuperTux version...".into()),
        AppState::Playing { label } => Some(format!("SuperTux {label} is running")),
        AppState::UploadingReport => Some("Uploading crash report...".into()),
    }
}

/// Text drawn on the progress bar, e.g. `12.0 MB / 48.5 MB (24.7%) at 3.1 MB/s`.
fn progress_text(downloaded: u64, total: Option<u64>, speed: &str) -> String {
    match total {
        Some(total) if total > 0 => format!(
            "{} / {} ({:.1}%) at {speed}",
            format_megabytes(downloaded),
            format_megabytes(total),
            progress_percent(downloaded, Some(total))
        ),
        _ => format!("{} at {speed}", format_megabytes(downloaded)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemovalKind {
    Detach,
    Delete,
}

impl RemovalKind {
    fn title(self) -> &'static str {
        match self {
            RemovalKind::Detach => DETACH_TITLE,
            RemovalKind::Delete => DELETE_TITLE,
        }
    }

    fn body(self) -> &'static str {
        match self {
            RemovalKind::Detach => DETACH_BODY,
            RemovalKind::Delete => DELETE_BODY,
        }
    }

    fn action(self, selection: Option<Version>) -> UserAction {
        match self {
            RemovalKind::Detach => UserAction::Detach { selection },
            RemovalKind::Delete => UserAction::Delete { selection },
        }
    }
}

/// A removal waiting for the user to answer the confirmation dialog.
#[derive(Debug, Clone)]
struct PendingRemoval {
    kind: RemovalKind,
    version: Version,
}

pub struct LauncherApp {
    runtime: Arc<Runtime>,
    engine: Arc<Mutex<LauncherEngine>>,
    updates_rx: mpsc::UnboundedReceiver<EngineUpdate>,
    updates_tx: mpsc::UnboundedSender<EngineUpdate>,
    state: AppState,
    mode: Mode,
    installed: Vec<Version>,
    catalog: Vec<Version>,
    selected_installed: Option<usize>,
    selected_catalog: Option<usize>,
    new_label: String,
    new_path: String,
    notices: VecDeque<Notice>,
    pending_removal: Option<PendingRemoval>,
    launcher_version: &'static str,
}

impl LauncherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: LauncherConfig) -> Self {
        let runtime = build_runtime();
        let engine = Arc::new(Mutex::new(LauncherEngine::new(&config)));
        let (tx, rx) = mpsc::unbounded_channel();

        let bootstrap_engine = engine.clone();
        let bootstrap_tx = tx.clone();
        runtime.spawn(async move {
            let mut locked = bootstrap_engine.lock().await;
            locked.load_installs(&bootstrap_tx).await;
        });
        apply_theme(&cc.egui_ctx, &ThemePalette::dark());

        Self {
            runtime,
            engine,
            updates_rx: rx,
            updates_tx: tx,
            state: AppState::Idle,
            mode: Mode::Main,
            installed: Vec::new(),
            catalog: Vec::new(),
            selected_installed: None,
            selected_catalog: None,
            new_label: String::new(),
            new_path: String::new(),
            notices: VecDeque::new(),
            pending_removal: None,
            launcher_version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn trigger_action(&self, action: UserAction) {
        let engine = self.engine.clone();
        let tx = self.updates_tx.clone();
        self.runtime.spawn(async move {
            let mut locked = engine.lock().await;
            locked.handle_action(action, &tx).await;
        });
    }

    fn sync_state(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            match update {
                EngineUpdate::State(state) => self.state = state,
                EngineUpdate::Mode(mode) => {
                    if mode == Mode::AddExisting {
                        self.new_label.clear();
                        self.new_path.clear();
                    }
                    self.mode = mode;
                }
                EngineUpdate::Installed(versions) => {
                    debug!("ui: {} installed versions", versions.len());
                    self.installed = versions;
                    self.selected_installed = None;
                }
                EngineUpdate::Catalog(versions) => {
                    self.catalog = versions;
                    self.selected_catalog = None;
                }
                EngineUpdate::Notice(notice) => self.notices.push_back(notice),
            }
        }
    }

    fn selected_installed(&self) -> Option<Version> {
        self.selected_installed
            .and_then(|index| self.installed.get(index))
            .cloned()
    }

    fn selected_catalog(&self) -> Option<Version> {
        self.selected_catalog
            .and_then(|index| self.catalog.get(index))
            .cloned()
    }

    /// Ask before removing; without a selection the engine reports the problem.
    fn request_removal(&mut self, kind: RemovalKind) {
        match self.selected_installed() {
            Some(version) if version.is_complete() => {
                self.pending_removal = Some(PendingRemoval { kind, version });
            }
            selection => self.trigger_action(kind.action(selection)),
        }
    }

    fn interactive(&self) -> bool {
        self.state.accepts_actions() && self.pending_removal.is_none() && self.notices.is_empty()
    }

    fn render_version_list(
        ui: &mut egui::Ui,
        colors: &ThemePalette,
        id: &str,
        versions: &[Version],
        selected: &mut Option<usize>,
        empty_hint: &str,
    ) {
        Frame::new()
            .fill(colors.sunken_surface)
            .stroke(Stroke::new(1.0, colors.border))
            .corner_radius(10.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_min_height(LIST_HEIGHT);
                egui::ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(LIST_HEIGHT)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if versions.is_empty() {
                            ui.label(RichText::new(empty_hint).color(colors.text_muted));
                        }
                        for (index, version) in versions.iter().enumerate() {
                            ui.selectable_value(selected, Some(index), version.label.as_str())
                                .on_hover_text(version.path.as_str());
                        }
                    });
            });
    }

    fn render_main(&mut self, ui: &mut egui::Ui, colors: &ThemePalette) {
        let enabled = self.interactive();
        section_frame(colors).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Installed versions");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let delete = egui::Button::new(RichText::new("Delete").color(colors.danger))
                        .fill(tint(colors.danger, 24))
                        .stroke(Stroke::new(1.0, colors.danger));
                    if ui
                        .add_enabled(enabled, delete)
                        .on_hover_text("Uninstall and remove user data")
                        .clicked()
                    {
                        self.request_removal(RemovalKind::Delete);
                    }
                    if ui
                        .add_enabled(enabled, secondary_button("-", colors))
                        .on_hover_text("Remove from the list")
                        .clicked()
                    {
                        self.request_removal(RemovalKind::Detach);
                    }
                    if ui
                        .add_enabled(enabled, secondary_button("+", colors))
                        .on_hover_text("Add an existing SuperTux")
                        .clicked()
                    {
                        self.trigger_action(UserAction::ShowAddExisting);
                    }
                });
            });
            ui.add_space(4.0);
            Self::render_version_list(
                ui,
                colors,
                "installed_versions",
                &self.installed,
                &mut self.selected_installed,
                "No versions yet. Check for new versions or add one you already have.",
            );
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                let play = RichText::new("Play SuperTux")
                    .color(colors.text_primary)
                    .strong();
                if ui
                    .add_enabled(enabled, primary_cta_button(play, colors, 320.0))
                    .clicked()
                {
                    self.trigger_action(UserAction::Launch {
                        selection: self.selected_installed(),
                    });
                }
                if ui
                    .add_enabled(
                        enabled,
                        secondary_button("Check for new versions", colors)
                            .min_size(Vec2::new(320.0, 34.0)),
                    )
                    .clicked()
                {
                    self.trigger_action(UserAction::CheckForNewVersions);
                }
            });
        });
    }

    fn render_add_existing(&mut self, ui: &mut egui::Ui, colors: &ThemePalette) {
        let enabled = self.interactive();
        section_frame(colors).show(ui, |ui| {
            ui.heading("Add an existing version");
            ui.add_space(6.0);
            egui::Grid::new("add_existing_grid")
                .num_columns(2)
                .spacing(Vec2::new(10.0, 10.0))
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(colors.text_muted));
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_label)
                            .hint_text("e.g. 0.6.3 or my build")
                            .desired_width(360.0),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Executable").color(colors.text_muted));
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.new_path)
                                .hint_text("Path to the SuperTux executable")
                                .desired_width(268.0),
                        );
                        if ui
                            .add_enabled(enabled, secondary_button("Browse...", colors))
                            .clicked()
                            && let Some(path) = rfd::FileDialog::new()
                                .set_title("Select the SuperTux executable")
                                .pick_file()
                        {
                            self.new_path = path.to_string_lossy().into_owned();
                        }
                    });
                    ui.end_row();
                });
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let confirm = RichText::new("Add version").color(colors.text_primary).strong();
                if ui
                    .add_enabled(enabled, primary_cta_button(confirm, colors, 160.0))
                    .clicked()
                {
                    self.trigger_action(UserAction::AddExisting {
                        label: self.new_label.trim().to_owned(),
                        path: self.new_path.trim().to_owned(),
                    });
                }
                if ui
                    .add_enabled(enabled, secondary_button("Cancel", colors))
                    .clicked()
                {
                    self.trigger_action(UserAction::ShowMain);
                }
            });
        });
    }

    fn render_download(&mut self, ui: &mut egui::Ui, colors: &ThemePalette) {
        let enabled = self.interactive();
        section_frame(colors).show(ui, |ui| {
            ui.heading("Available versions");
            ui.add_space(4.0);
            Self::render_version_list(
                ui,
                colors,
                "catalog_versions",
                &self.catalog,
                &mut self.selected_catalog,
                "The server did not list any version for this platform.",
            );
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                let download = RichText::new("Download").color(colors.text_primary).strong();
                if ui
                    .add_enabled(enabled, primary_cta_button(download, colors, 320.0))
                    .clicked()
                {
                    self.trigger_action(UserAction::DownloadSelected {
                        selection: self.selected_catalog(),
                    });
                }
                if ui
                    .add_enabled(
                        enabled,
                        secondary_button("Cancel", colors).min_size(Vec2::new(320.0, 34.0)),
                    )
                    .clicked()
                {
                    self.trigger_action(UserAction::ShowMain);
                }
            });
        });
    }

    fn render_status(&self, ui: &mut egui::Ui, colors: &ThemePalette) {
        let Some(text) = status_text(&self.state) else {
            return;
        };
        section_frame(colors).show(ui, |ui| {
            ui.horizontal(|ui| {
                let color = match self.state {
                    AppState::Playing { .. } => colors.info,
                    _ => colors.warning,
                };
                ui.add(egui::Spinner::new().color(color));
                ui.label(RichText::new(text).color(color).strong());
            });
            if let AppState::Downloading {
                progress,
                downloaded,
                total,
                speed,
                ..
            } = &self.state
            {
                ui.add_space(6.0);
                ui.add(
                    egui::ProgressBar::new(progress / 100.0)
                        .fill(colors.accent)
                        .desired_height(22.0)
                        .text(progress_text(*downloaded, *total, speed)),
                );
            }
        });
    }

    fn render_confirm_modal(&mut self, ctx: &egui::Context, colors: &ThemePalette) {
        let Some(pending) = self.pending_removal.clone() else {
            return;
        };
        let mut answer = None;
        egui::Window::new(pending.kind.title())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(pending.kind.body());
                ui.add_space(6.0);
                ui.label(
                    RichText::new(format!("{} ({})", pending.version.label, pending.version.path))
                        .color(colors.text_muted)
                        .small(),
                );
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui
                        .add(
                            egui::Button::new("Yes")
                                .fill(tint(colors.danger, 60))
                                .stroke(Stroke::new(1.0, colors.danger)),
                        )
                        .clicked()
                    {
                        answer = Some(true);
                    }
                    if ui.add(secondary_button("No", colors)).clicked() {
                        answer = Some(false);
                    }
                });
            });
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            answer = Some(false);
        }

        match answer {
            Some(true) => {
                self.pending_removal = None;
                self.trigger_action(pending.kind.action(Some(pending.version)));
            }
            Some(false) => self.pending_removal = None,
            None => {}
        }
    }

    fn render_crash_modal(&mut self, ctx: &egui::Context, colors: &ThemePalette) {
        let AppState::Crashed { log } = &self.state else {
            return;
        };
        let log = log.display().to_string();
        let mut choice = None;
        egui::Window::new(CRASH_TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(CRASH_BODY);
                ui.label(RichText::new(log).color(colors.text_muted).small());
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.add(secondary_button("Don't send", colors)).clicked() {
                        choice = Some(UserAction::DismissCrash);
                    }
                    if ui.add(secondary_button("Open log file", colors)).clicked() {
                        choice = Some(UserAction::OpenLog);
                    }
                    let send = RichText::new("Send report").color(colors.text_primary).strong();
                    if ui.add(primary_cta_button(send, colors, 120.0)).clicked() {
                        choice = Some(UserAction::SendCrashReport);
                    }
                });
            });

        if let Some(action) = choice {
            // Keep the dialog from firing twice while the engine catches up.
            self.state = AppState::Idle;
            self.trigger_action(action);
        }
    }

    fn render_notice_modal(&mut self, ctx: &egui::Context, colors: &ThemePalette) {
        let Some(notice) = self.notices.front() else {
            return;
        };
        let accent = match notice.kind {
            NoticeKind::Info => colors.info,
            NoticeKind::Error => colors.danger,
        };
        let mut dismissed = false;
        egui::Window::new(RichText::new(notice.title.as_str()).color(accent))
            .id(egui::Id::new("notice_modal"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_max_width(420.0);
                ui.label(notice.message.as_str());
                ui.add_space(10.0);
                if ui.add(secondary_button("OK", colors)).clicked() {
                    dismissed = true;
                }
            });
        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.notices.pop_front();
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.sync_state();
        if self.state == AppState::Exited {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        let colors = ThemePalette::dark();

        egui::TopBottomPanel::top("top_bar")
            .frame(
                Frame::new()
                    .fill(colors.panel)
                    .stroke(Stroke::new(1.0, colors.border))
                    .inner_margin(Margin::symmetric(16, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("SuperTux Launcher").color(colors.accent));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        badge_frame(colors.border_strong).show(ui, |ui| {
                            ui.label(
                                RichText::new(format!("v{}", self.launcher_version))
                                    .color(colors.text_primary)
                                    .small(),
                            );
                        });
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(Frame::new().fill(colors.bg).inner_margin(Margin::symmetric(14, 12)))
            .show(ctx, |ui| {
                self.render_status(ui, &colors);
                ui.add_space(8.0);
                match self.mode {
                    Mode::Main => self.render_main(ui, &colors),
                    Mode::AddExisting => self.render_add_existing(ui, &colors),
                    Mode::Download => self.render_download(ui, &colors),
                }
            });

        self.render_crash_modal(ctx, &colors);
        self.render_confirm_modal(ctx, &colors);
        self.render_notice_modal(ctx, &colors);

        if !self.state.accepts_actions() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_text_includes_total_when_known() {
        let text = progress_text(12 * 1024 * 1024, Some(48 * 1024 * 1024), "3.1 MB/s");
        assert_eq!(text, "12.0 MB / 48.0 MB (25.0%) at 3.1 MB/s");
    }

    #[test]
    fn progress_text_without_total_shows_bytes_only() {
        assert_eq!(progress_text(1024 * 1024, None, "0 B/s"), "1.0 MB at 0 B/s");
        assert_eq!(progress_text(0, Some(0), "starting"), "0.0 MB at starting");
    }

    #[test]
    fn idle_and_finished_states_have_no_status_line() {
        assert_eq!(status_text(&AppState::Idle), None);
        assert_eq!(status_text(&AppState::Exited), None);
        assert_eq!(
            status_text(&AppState::Playing {
                label: "0.6.3".into()
            }),
            Some("SuperTux 0.6.3 is running".into())
        );
    }

    #[test]
    fn confirmed_removal_carries_the_selection() {
        let version = Version::new("0.6.3", "/games/supertux2");
        match RemovalKind::Delete.action(Some(version.clone())) {
            UserAction::Delete { selection } => assert_eq!(selection, Some(version)),
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(RemovalKind::Detach.title(), DETACH_TITLE);
    }
}
