use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_echem::color::gradient_gen;
use rusty_echem::config::FigureConfig;
use rusty_echem::data::model::XAxis;
use rusty_echem::data::partition::PairPolicy;
use rusty_echem::data::provider::PathProvider;

use crate::state::AppState;
use crate::ui::to_color32;

const TABLE_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "mpt", "json", "parquet"];

// ---------------------------------------------------------------------------
// Left side panel – datasets and figure settings
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Datasets");
    ui.separator();

    if state.store.is_empty() {
        ui.label("No data loaded.");
    }

    let tags: Vec<(String, &'static str, usize)> = state
        .store
        .iter()
        .map(|g| (g.tag().to_string(), g.kind().name(), g.len()))
        .collect();

    let mut show = None;
    let mut remove = None;
    ScrollArea::vertical()
        .id_salt("datasets")
        .max_height(200.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for (tag, kind, len) in &tags {
                ui.horizontal(|ui: &mut Ui| {
                    if ui
                        .selectable_label(false, format!("{tag}  [{kind}, {len}]"))
                        .clicked()
                    {
                        show = Some(tag.clone());
                    }
                    if ui.small_button("✕").clicked() {
                        remove = Some(tag.clone());
                    }
                });
            }
        });
    if let Some(tag) = show {
        state.show_tag(&tag);
    }
    if let Some(tag) = remove {
        state.remove_tag(&tag);
    }

    ui.add_space(8.0);
    ui.heading("Figure");
    ui.separator();

    if settings(ui, &mut state.config) {
        state.rebuild_figure();
    }
}

/// Figure settings widgets; returns true when anything changed.
fn settings(ui: &mut Ui, config: &mut FigureConfig) -> bool {
    let mut changed = false;

    egui::Grid::new("settings_grid")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Points per cycle");
            changed |= ui
                .add(egui::DragValue::new(&mut config.cycle_pts).range(1..=1_000_000))
                .changed();
            ui.end_row();

            ui.label("Wavelength (Å)");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.wavelength)
                        .range(0.01..=10.0)
                        .speed(0.001),
                )
                .changed();
            ui.end_row();

            ui.label("Header rows");
            ui.add(egui::DragValue::new(&mut config.header_rows).range(0..=1000));
            ui.end_row();

            ui.label("Cycle pairing");
            egui::ComboBox::from_id_salt("pair_policy")
                .selected_text(format!("{:?}", config.pair_policy))
                .show_ui(ui, |ui: &mut Ui| {
                    for policy in [PairPolicy::Truncate, PairPolicy::Strict] {
                        changed |= ui
                            .selectable_value(&mut config.pair_policy, policy, format!("{policy:?}"))
                            .changed();
                    }
                });
            ui.end_row();

            ui.label("XRD axis");
            ui.horizontal(|ui: &mut Ui| {
                for axis in [XAxis::TwoTheta, XAxis::Q] {
                    changed |= ui
                        .selectable_value(&mut config.xrd_axis, axis, axis.to_string())
                        .changed();
                }
            });
            ui.end_row();

            ui.label("XRD offset");
            changed |= ui
                .add(egui::DragValue::new(&mut config.xrd_offset).speed(1.0))
                .changed();
            ui.end_row();

            ui.label("Gradient start");
            changed |= ui.text_edit_singleline(&mut config.gradient.start).lost_focus();
            ui.end_row();

            ui.label("Gradient end");
            changed |= ui.text_edit_singleline(&mut config.gradient.end).lost_focus();
            ui.end_row();

            ui.label("Fit colour");
            changed |= ui.text_edit_singleline(&mut config.fit_color).lost_focus();
            ui.end_row();
        });

    changed |= ui
        .checkbox(&mut config.add_diff, "PDF difference curve")
        .changed();
    changed |= ui
        .checkbox(&mut config.thousands_ticks, "Ticks in thousands")
        .changed();

    gradient_swatch(ui, config);
    changed
}

/// Preview strip of the configured cycle gradient.
fn gradient_swatch(ui: &mut Ui, config: &FigureConfig) {
    let Ok(colors) = gradient_gen(&config.gradient.start, &config.gradient.end, 12) else {
        ui.label(RichText::new("invalid gradient colour").color(Color32::RED));
        return;
    };
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 14.0), egui::Sense::hover());
    let step = rect.width() / colors.len() as f32;
    for (i, c) in colors.iter().enumerate() {
        let x0 = rect.left() + i as f32 * step;
        let cell = egui::Rect::from_min_max(
            egui::pos2(x0, rect.top()),
            egui::pos2(x0 + step, rect.bottom()),
        );
        ui.painter().rect_filled(cell, 0.0, to_color32(*c));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CP pair…").clicked() {
                state.import_cp(&mut DialogPaths::new(TABLE_EXTENSIONS));
                ui.close_menu();
            }
            if ui.button("Open EIS…").clicked() {
                if let Some(path) = DialogPaths::new(TABLE_EXTENSIONS).path_for("EIS data file") {
                    state.import_eis(&path);
                }
                ui.close_menu();
            }
            if ui.button("Open XRD patterns…").clicked() {
                if let Some(paths) = rfd::FileDialog::new()
                    .set_title("Open diffraction patterns")
                    .add_filter("Patterns", &["xye", "xy"])
                    .pick_files()
                {
                    state.import_xrd(&paths);
                }
                ui.close_menu();
            }
            if ui.button("Open XRD folder…").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    state.import_xrd_dir(&dir);
                }
                ui.close_menu();
            }
            if ui.button("Open PDF…").clicked() {
                if let Some(path) = DialogPaths::new(&["gr", "dat", "txt"]).path_for("PDF data file") {
                    state.import_pdf(&path);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.store.is_empty() {
            ui.label(format!("{} datasets loaded", state.store.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// [`PathProvider`] backed by native file dialogs; the prompt becomes the title.
pub struct DialogPaths {
    extensions: Vec<&'static str>,
}

impl DialogPaths {
    pub fn new(extensions: &[&'static str]) -> Self {
        Self {
            extensions: extensions.to_vec(),
        }
    }
}

impl PathProvider for DialogPaths {
    fn path_for(&mut self, prompt: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(prompt)
            .add_filter("Supported files", &self.extensions)
            .pick_file()
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Open figure config")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    match FigureConfig::load(&path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            state.config = config;
            state.rebuild_figure();
        }
        Err(e) => {
            log::error!("Failed to load config: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
