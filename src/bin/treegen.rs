//! treegen - Render Tree of Life diagrams from the terminal
//!
//! Reads a configuration document (or command line options) and writes the
//! diagram as SVG, optionally opening the interactive viewer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::{style, Emoji};
use std::path::{Path, PathBuf};

use tree_of_life::config::{TreeConfig, CONFIG_FILE};
use tree_of_life::diagram::color_table::{ColorScheme, ColorTable};
use tree_of_life::diagram::svg::SvgSurface;
use tree_of_life::diagram::tree::{RenderOptions, SephirahTextMode, TreeOfLife};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "+ ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "! ");
static ARROW: Emoji<'_, '_> = Emoji("→ ", "-> ");

#[derive(Parser)]
#[command(name = "treegen")]
#[command(author = "e421")]
#[command(version)]
#[command(about = "Render Tree of Life diagrams to SVG")]
#[command(long_about = r#"
treegen renders the Kabbalistic Tree of Life with Liber 777 color scales.

Examples:
  treegen tree.yaml                      # Render using a config document
  treegen tree.yaml --display            # Render, then open the viewer
  treegen --new                          # Write a default tree_config.yaml
  treegen render --focus 6               # Focus view on Tiphereth
  treegen render -s queen -p king        # Mix scales without a config
"#)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration document (YAML, or TOML by extension)
    config: Option<PathBuf>,

    /// Open the interactive viewer after rendering
    #[arg(short, long)]
    display: bool,

    /// Output SVG file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Color scales document
    #[arg(short = 'c', long, global = true)]
    color_scales: Option<PathBuf>,

    /// Write a default configuration document and exit
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = CONFIG_FILE)]
    new: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render without a configuration document
    Render {
        /// Sephirah to focus on (1-10)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=10))]
        focus: Option<u8>,

        /// Sephiroth color scale (plain, king, queen, prince, princess)
        #[arg(short, long, default_value = "king", value_parser = parse_scheme)]
        sephiroth_scheme: ColorScheme,

        /// Path color scale
        #[arg(short, long, default_value = "king", value_parser = parse_scheme)]
        path_scheme: ColorScheme,

        /// Text inside each sephirah (number, trigram, hebrew, planet)
        #[arg(short, long, default_value = "number", value_parser = parse_text_mode)]
        text_mode: SephirahTextMode,

        /// Hide all text
        #[arg(long)]
        no_text: bool,

        /// Print the focus title above the diagram
        #[arg(long)]
        title: bool,

        /// Output SVG file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the interactive viewer after rendering
        #[arg(short, long)]
        display: bool,
    },
}

fn parse_scheme(s: &str) -> Result<ColorScheme, String> {
    ColorScheme::from_str(s).ok_or_else(|| format!("unknown color scale '{}'", s))
}

fn parse_text_mode(s: &str) -> Result<SephirahTextMode, String> {
    SephirahTextMode::from_str(s).ok_or_else(|| format!("unknown text mode '{}'", s))
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Some(path) = cli.new {
        return cmd_new(&path);
    }

    match cli.command {
        Some(Commands::Render {
            focus,
            sephiroth_scheme,
            path_scheme,
            text_mode,
            no_text,
            title,
            output,
            display,
        }) => {
            let mut config = TreeConfig::default();
            config.color_schemes.sephiroth = sephiroth_scheme;
            config.color_schemes.path = path_scheme;
            config.text_display.sephiroth_mode = text_mode;
            config.text_display.sephiroth_visible = !no_text;
            config.text_display.path_visible = !no_text;
            config.rendering.focus_sephirah = focus;
            config.rendering.show_title = title;
            cmd_render(&config, cli.color_scales.as_deref(), output, display)
        }
        None => {
            let Some(path) = cli.config else {
                bail!("No configuration given. Pass a config file, use `render`, or create one with `--new`.");
            };
            let config = TreeConfig::load(&path)?;
            println!("{}Loaded {}", ARROW, style(path.display()).cyan());
            cmd_render(&config, cli.color_scales.as_deref(), cli.output, cli.display)
        }
    }
}

/// `tree_of_life.svg`, or `tree_of_life_focus_<n>.svg` for a focus view
fn default_output(options: &RenderOptions) -> PathBuf {
    match options.focus {
        Some(n) => PathBuf::from(format!("tree_of_life_focus_{}.svg", n)),
        None => PathBuf::from("tree_of_life.svg"),
    }
}

fn cmd_new(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    TreeConfig::default().save(path)?;
    println!("{}Wrote default config to {}", CHECK, style(path.display()).green());
    Ok(())
}

fn load_tree(config: &TreeConfig, color_scales: Option<&Path>) -> TreeOfLife {
    let (table, warning) = ColorTable::load_default(color_scales);
    let mut tree = config.build_tree(table);
    tree.record_warning(warning);

    for warning in tree.warnings() {
        eprintln!("{}{}", WARN, style(warning).yellow());
    }
    tree
}

fn cmd_render(config: &TreeConfig, color_scales: Option<&Path>, output: Option<PathBuf>, display: bool) -> Result<()> {
    let tree = load_tree(config, color_scales);
    let options = config.render_options();
    let output = output.unwrap_or_else(|| default_output(&options));

    let mut surface = SvgSurface::create(output.clone());
    tree.render(&options, &mut surface)
        .with_context(|| format!("Failed to render {}", output.display()))?;

    println!(
        "{}Saved {} {}",
        CHECK,
        style(output.display()).green().bold(),
        style(format!(
            "({} / {})",
            tree.sephiroth_scheme().label(),
            tree.path_scheme().label()
        ))
        .dim()
    );

    if display {
        tree_of_life::app::run(tree, options).map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))?;
    }
    Ok(())
}
