//! Desktop viewer application
//!
//! Side panel with scheme pickers, text settings and focus selection; the
//! central panel hosts a [`TreeViewer`].

use crate::config::TreeConfig;
use crate::diagram::color_table::ColorScheme;
use crate::diagram::model::SEPHIRAH_NAMES;
use crate::diagram::svg::SvgSurface;
use crate::diagram::tree::{RenderOptions, SephirahTextMode, TreeOfLife};
use crate::diagram::viewer::TreeViewer;
use eframe::egui::{self, Color32, RichText};
use std::path::PathBuf;

/// Standard spacing between sections
const SECTION_SPACING: f32 = 12.0;
/// Standard spacing between elements within a section
const ELEMENT_SPACING: f32 = 6.0;

pub struct TreeOfLifeApp {
    tree: TreeOfLife,
    options: RenderOptions,
    viewer: TreeViewer,

    /// Last export or save result, shown at the bottom of the panel
    status: Option<(String, bool)>,
}

impl TreeOfLifeApp {
    pub fn new(tree: TreeOfLife, options: RenderOptions) -> Self {
        let status = tree
            .warnings()
            .last()
            .map(|w| (w.to_string(), false));

        Self {
            tree,
            options,
            viewer: TreeViewer::new(),
            status,
        }
    }

    fn scheme_picker(ui: &mut egui::Ui, id: &str, current: ColorScheme, available: &[ColorScheme]) -> Option<ColorScheme> {
        let mut selected = current;
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.label())
            .show_ui(ui, |ui| {
                for scheme in ColorScheme::ALL {
                    let enabled = available.contains(&scheme);
                    ui.add_enabled_ui(enabled, |ui| {
                        ui.selectable_value(&mut selected, scheme, scheme.label());
                    });
                }
            });
        (selected != current).then_some(selected)
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let available = self.tree.available_schemes();

        ui.heading("Tree of Life");
        ui.add_space(SECTION_SPACING);

        ui.label(RichText::new("Color Scales").strong());
        ui.add_space(ELEMENT_SPACING);
        ui.horizontal(|ui| {
            ui.label("Sephiroth");
            if let Some(scheme) = Self::scheme_picker(ui, "sephiroth_scheme", self.tree.sephiroth_scheme(), &available) {
                let warning = self.tree.set_sephiroth_scheme(scheme);
                self.report(warning.map(|w| w.to_string()));
            }
        });
        ui.horizontal(|ui| {
            ui.label("Paths");
            if let Some(scheme) = Self::scheme_picker(ui, "path_scheme", self.tree.path_scheme(), &available) {
                let warning = self.tree.set_path_scheme(scheme);
                self.report(warning.map(|w| w.to_string()));
            }
        });

        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new("Text").strong());
        ui.add_space(ELEMENT_SPACING);

        let mut mode = self.tree.text_mode();
        egui::ComboBox::from_id_salt("text_mode")
            .selected_text(mode.name())
            .show_ui(ui, |ui| {
                for option in SephirahTextMode::ALL {
                    ui.selectable_value(&mut mode, option, option.name());
                }
            });
        if mode != self.tree.text_mode() {
            self.tree.set_sephiroth_text_mode(mode);
        }

        let mut show_sephirah_text = self.tree.sephirah_text_visible();
        if ui.checkbox(&mut show_sephirah_text, "Sephirah text").changed() {
            self.tree.set_sephiroth_text_visible(show_sephirah_text);
        }
        let mut show_path_text = self.tree.path_text_visible();
        if ui.checkbox(&mut show_path_text, "Path labels").changed() {
            self.tree.set_path_text_visible(show_path_text);
        }

        ui.add_space(SECTION_SPACING);
        ui.label(RichText::new("Focus").strong());
        ui.add_space(ELEMENT_SPACING);

        let focus_text = match self.options.focus.and_then(|n| SEPHIRAH_NAMES.get(n as usize).filter(|_| n > 0)) {
            Some(name) => name.to_string(),
            None => "Whole tree".to_string(),
        };
        egui::ComboBox::from_id_salt("focus")
            .selected_text(focus_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.options.focus, None, "Whole tree");
                for n in 1..=10u8 {
                    ui.selectable_value(
                        &mut self.options.focus,
                        Some(n),
                        format!("{} {}", n, SEPHIRAH_NAMES[n as usize]),
                    );
                }
            });
        ui.checkbox(&mut self.options.show_title, "Show title");
        if ui.small_button("⊡ Fit view").clicked() {
            self.viewer.fit_to_view();
        }

        ui.add_space(SECTION_SPACING);
        ui.separator();
        if ui.button("Export SVG…").clicked() {
            self.export_svg();
        }
        if ui.button("Save config…").clicked() {
            self.save_config();
        }

        if let Some((ref message, ok)) = self.status {
            ui.add_space(ELEMENT_SPACING);
            let color = if ok {
                Color32::from_rgb(0x4E, 0xC9, 0x4E)
            } else {
                self.tree.theme().error
            };
            ui.label(RichText::new(message).color(color).small());
        }
    }

    fn report(&mut self, warning: Option<String>) {
        if let Some(warning) = warning {
            self.status = Some((warning, false));
        }
    }

    fn default_file_name(&self) -> String {
        match self.options.focus {
            Some(n) => format!("tree_of_life_focus_{}.svg", n),
            None => "tree_of_life.svg".to_string(),
        }
    }

    fn export_svg(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG", &["svg"])
            .set_file_name(self.default_file_name())
            .save_file()
        else {
            return;
        };

        let mut surface = SvgSurface::create(path.clone());
        self.status = Some(match self.tree.render(&self.options, &mut surface) {
            Ok(()) => (format!("Saved {}", path.display()), true),
            Err(e) => {
                log::error!("SVG export failed: {}", e);
                (format!("Export failed: {}", e), false)
            }
        });
    }

    fn save_config(&mut self) {
        let start: Option<PathBuf> = TreeConfig::default_path().and_then(|p| p.parent().map(PathBuf::from));
        let mut dialog = rfd::FileDialog::new()
            .add_filter("YAML", &["yaml", "yml"])
            .add_filter("TOML", &["toml"])
            .set_file_name(crate::config::CONFIG_FILE);
        if let Some(dir) = start.filter(|d| d.is_dir()) {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        let config = TreeConfig::from_tree(&self.tree, &self.options);
        self.status = Some(match config.save(&path) {
            Ok(()) => (format!("Saved {}", path.display()), true),
            Err(e) => (format!("Save failed: {:#}", e), false),
        });
    }
}

impl eframe::App for TreeOfLifeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .default_width(240.0)
            .width_range(200.0..=360.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.show_controls(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.tree.theme().canvas_bg))
            .show(ctx, |ui| {
                if let Some(number) = self.viewer.ui(ui, &self.tree, &self.options) {
                    log::debug!("Focus on sephirah {}", number);
                    self.options.focus = Some(number);
                    self.viewer.fit_to_view();
                }
            });
    }
}

/// Open the viewer window and block until it closes
pub fn run(tree: TreeOfLife, options: RenderOptions) -> eframe::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 1000.0])
            .with_min_inner_size([640.0, 600.0])
            .with_title("Tree of Life"),
        ..Default::default()
    };

    eframe::run_native(
        "Tree of Life",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(TreeOfLifeApp::new(tree, options)))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name() {
        let mut app = TreeOfLifeApp::new(TreeOfLife::default(), RenderOptions::default());
        assert_eq!(app.default_file_name(), "tree_of_life.svg");

        app.options.focus = Some(7);
        assert_eq!(app.default_file_name(), "tree_of_life_focus_7.svg");
    }

    #[test]
    fn test_warning_becomes_status() {
        let mut tree = TreeOfLife::default();
        tree.set_path_scheme(ColorScheme::Queen);
        let app = TreeOfLifeApp::new(tree, RenderOptions::default());
        assert!(matches!(app.status, Some((_, false))));
    }
}
