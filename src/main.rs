//! Tree of Life - interactive diagram viewer
//! Built with egui for native Wayland support

use std::path::PathBuf;
use tree_of_life::config::TreeConfig;
use tree_of_life::diagram::color_table::ColorTable;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Optional config document as the only argument
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => TreeConfig::load(&path).unwrap_or_else(|e| {
            log::warn!("{:#}", e);
            TreeConfig::default()
        }),
        None => TreeConfig::default_path()
            .filter(|p| p.exists())
            .and_then(|p| TreeConfig::load(p).ok())
            .unwrap_or_default(),
    };

    let (table, warning) = ColorTable::load_default(None);
    let mut tree = config.build_tree(table);
    tree.record_warning(warning);

    tree_of_life::app::run(tree, config.render_options())
}
