use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use gui_atlas_core::config::{ClassifierConfig, SortOrder};
use gui_atlas_core::{
    Atlas, ExtractOptions, LayoutConfig, PackConfig, SheetInput, extract_atlases, layout_atlas,
    layout_report, pack_atlas, pack_atlas_pages, to_packed_mapping, to_packed_pages_mapping,
};
use image::{ImageReader, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;

mod render;

use render::PreviewStyle;

#[derive(Parser, Debug)]
#[command(
    name = "gui-atlas",
    about = "Analyze GUI spritesheets, export sprites and preview layouts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML config file; its keys override the command-line values
    #[arg(long, global = true, help_heading = "Config")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, global = true, help_heading = "Config")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], global = true, help_heading = "Config")]
    print_config_format: String,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect sprites and states in spritesheet image(s) and write <stem>_atlas.json
    Analyze(AnalyzeArgs),
    /// Export the sprites of an atlas as individual PNGs or a repacked atlas
    Export(ExportArgs),
    /// Render a preview of an atlas and write a layout report
    Preview(PreviewArgs),
}

#[derive(Parser, Debug, Clone)]
struct AnalyzeArgs {
    /// Input image or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory (default: next to each image)
    #[arg(short, long, help_heading = "Input/Output")]
    out_dir: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    /// Drop regions narrower or shorter than this (0 disables)
    #[arg(long, help_heading = "Detection")]
    min_sprite_size: Option<u32>,
    /// Keep only the first N regions in scan order (0 disables)
    #[arg(long, help_heading = "Detection")]
    max_sprites: Option<usize>,
    /// Treat every region as its own single-state sprite
    #[arg(long, default_value_t = false, help_heading = "Detection")]
    no_detect_states: bool,
}

#[derive(Parser, Debug, Clone)]
struct ExportArgs {
    /// Atlas JSON produced by `analyze`
    #[arg(help_heading = "Input/Output")]
    atlas: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "exported_sprites", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Export mode: individual | atlas
    #[arg(long, default_value = "individual", value_parser = ["individual", "atlas"], help_heading = "Export")]
    mode: String,
    /// Page width and height for --mode atlas
    #[arg(long, default_value_t = 1024, help_heading = "Packing")]
    max_atlas_size: u32,
    /// Sort order: area_desc|max_side_desc|height_desc|width_desc|name_asc|none
    #[arg(long, default_value = "area_desc", help_heading = "Packing")]
    sort_order: String,
    /// Open new pages for sprites that do not fit instead of reporting them
    #[arg(long, default_value_t = false, help_heading = "Packing")]
    multi_page: bool,
}

#[derive(Parser, Debug, Clone)]
struct PreviewArgs {
    /// Atlas JSON produced by `analyze`
    #[arg(help_heading = "Input/Output")]
    atlas: PathBuf,
    /// Output directory (default: next to the atlas JSON)
    #[arg(short, long, help_heading = "Input/Output")]
    out_dir: Option<PathBuf>,
    /// Preview canvas width
    #[arg(long, default_value_t = 800, help_heading = "Layout")]
    width: u32,
    /// Preview canvas height
    #[arg(long, default_value_t = 600, help_heading = "Layout")]
    height: u32,
    /// Do not draw category-coloured borders
    #[arg(long, default_value_t = false, help_heading = "Rendering")]
    no_bounds: bool,
    /// Do not draw label strips
    #[arg(long, default_value_t = false, help_heading = "Rendering")]
    no_labels: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let yaml = match &cli.config {
        Some(path) => Some(load_yaml_config(path)?),
        None => None,
    };
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Analyze(args) => run_analyze(args, &cli, yaml.as_ref(), show_progress),
        Commands::Export(args) => run_export(args, &cli, yaml.as_ref(), show_progress),
        Commands::Preview(args) => run_preview(args, &cli, yaml.as_ref()),
    }
}

fn run_analyze(
    args: &AnalyzeArgs,
    cli: &Cli,
    yaml: Option<&YamlConfig>,
    show_progress: bool,
) -> anyhow::Result<()> {
    let mut opts = ExtractOptions::builder()
        .min_sprite_size(args.min_sprite_size)
        .max_sprites(args.max_sprites)
        .detect_states(!args.no_detect_states)
        .build();
    if let Some(y) = yaml {
        y.apply_extract(&mut opts);
    }
    if cli.print_config {
        return print_config(&opts, &cli.print_config_format);
    }
    opts.validate()?;

    let paths = gather_paths(&args.input, &args.include, &args.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no images found at {}", args.input.display());
    }
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("create out_dir {}", dir.display()))?;
    }

    let (loaded, sheets) = load_sheets_with_progress(&paths, show_progress)?;
    info!(count = sheets.len(), "loaded spritesheets");
    opts.generated_at = Some(rfc3339_now());
    let results = extract_atlases(&sheets, &opts);

    let mut written = 0usize;
    for (path, result) in loaded.iter().zip(results) {
        match result {
            Ok(atlas) => {
                let json_path = atlas_json_path(path, &args.input, args.out_dir.as_deref());
                if let Some(dir) = json_path.parent() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("create {}", dir.display()))?;
                }
                let json = serde_json::to_string_pretty(&atlas)?;
                fs::write(&json_path, json)
                    .with_context(|| format!("write {}", json_path.display()))?;
                let summary = atlas.summary();
                info!(
                    ?json_path,
                    sprites = summary.num_sprites,
                    states = summary.num_states,
                    "atlas written"
                );
                written += 1;
            }
            Err(e) => error!(?path, error = %e, "analysis failed"),
        }
    }
    if written == 0 {
        anyhow::bail!("no atlas could be produced");
    }
    Ok(())
}

fn run_export(
    args: &ExportArgs,
    cli: &Cli,
    yaml: Option<&YamlConfig>,
    show_progress: bool,
) -> anyhow::Result<()> {
    let mut cfg = PackConfig::builder()
        .max_size(args.max_atlas_size)
        .sort_order(parse_sort_order(&args.sort_order)?)
        .build();
    if let Some(y) = yaml {
        y.apply_pack(&mut cfg)?;
    }
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    cfg.validate()?;

    let (atlas, source) = load_atlas(&args.atlas)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;

    match args.mode.as_str() {
        "individual" => export_individual(&atlas, &source, &args.out_dir, show_progress),
        "atlas" if args.multi_page => export_pages(&atlas, &source, &args.out_dir, &cfg),
        "atlas" => export_single_page(&atlas, &source, &args.out_dir, &cfg),
        other => anyhow::bail!("unknown export mode: {}", other),
    }
}

fn export_individual(
    atlas: &Atlas,
    source: &RgbaImage,
    out_dir: &Path,
    show_progress: bool,
) -> anyhow::Result<()> {
    let bar = progress_bar(atlas.state_count(), "exporting", show_progress)?;
    for (sprite, state) in atlas.states() {
        let png_path = out_dir.join(format!("{}_{}.png", sprite.name, state.name));
        if let Some(b) = &bar {
            b.set_message(format!("{}_{}", sprite.name, state.name));
        }
        render::crop(source, &state.bounds)
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(count = atlas.state_count(), out_dir = ?out_dir, "sprites exported");
    Ok(())
}

fn export_single_page(
    atlas: &Atlas,
    source: &RgbaImage,
    out_dir: &Path,
    cfg: &PackConfig,
) -> anyhow::Result<()> {
    let packed = pack_atlas(atlas, cfg)?;
    let image_name = "packed_atlas.png";
    if packed.placements.is_empty() {
        warn!("nothing to pack, skipping atlas image");
    } else {
        let png_path = out_dir.join(image_name);
        render::render_packed_page(source, &packed)
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote packed atlas");
    }
    info!("{}", packed.stats().summary());

    let mapping = to_packed_mapping(&packed, image_name);
    write_json(&out_dir.join("packed_mapping.json"), &mapping)
}

fn export_pages(
    atlas: &Atlas,
    source: &RgbaImage,
    out_dir: &Path,
    cfg: &PackConfig,
) -> anyhow::Result<()> {
    let packed = pack_atlas_pages(atlas, cfg)?;
    let names: Vec<String> = if packed.pages.len() == 1 {
        vec!["packed_atlas.png".to_string()]
    } else {
        (0..packed.pages.len())
            .map(|id| format!("packed_atlas_{}.png", id))
            .collect()
    };
    for (id, (page, name)) in packed.pages.iter().zip(&names).enumerate() {
        let png_path = out_dir.join(name);
        render::render_packed_page(source, page)
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, id, "{}", page.stats().summary());
    }
    if !packed.overflow.is_empty() {
        warn!(count = packed.overflow.len(), "sprites larger than a page were left out");
    }

    let mapping = to_packed_pages_mapping(&packed, &names);
    write_json(&out_dir.join("packed_mapping.json"), &mapping)
}

fn run_preview(args: &PreviewArgs, cli: &Cli, yaml: Option<&YamlConfig>) -> anyhow::Result<()> {
    let mut cfg = LayoutConfig::builder()
        .with_canvas(args.width, args.height)
        .build();
    if let Some(y) = yaml {
        y.apply_layout(&mut cfg);
    }
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }
    cfg.validate()?;

    let (atlas, source) = load_atlas(&args.atlas)?;
    let layout = layout_atlas(&atlas, &cfg)?;
    if !layout.skipped.is_empty() {
        warn!(count = layout.skipped.len(), "states left out of the preview");
    }

    let out_dir = match &args.out_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("create out_dir {}", dir.display()))?;
            dir.clone()
        }
        None => parent_dir(&args.atlas),
    };
    let stem = atlas_stem(&args.atlas);

    let style = PreviewStyle {
        bounds: !args.no_bounds,
        labels: !args.no_labels,
    };
    let png_path = out_dir.join(format!("{}_preview.png", stem));
    render::render_preview(&source, &layout, style)
        .save(&png_path)
        .with_context(|| format!("write {}", png_path.display()))?;
    info!(?png_path, placed = layout.placements.len(), "preview written");

    let report_path = out_dir.join(format!("{}_layout_report.txt", stem));
    fs::write(&report_path, layout_report(&atlas, &layout))
        .with_context(|| format!("write {}", report_path.display()))?;
    info!(?report_path, "layout report written");
    Ok(())
}

fn print_config<T: Serialize>(value: &T, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(value)?),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(?path, "mapping written");
    Ok(())
}

/// Reads and validates an atlas JSON, then decodes the spritesheet it refers to.
fn load_atlas(path: &Path) -> anyhow::Result<(Atlas, RgbaImage)> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let atlas: Atlas =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    atlas
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;

    let source_path = resolve_source(path, &atlas.source_image);
    let source = load_image(&source_path)
        .with_context(|| format!("load source image {}", source_path.display()))?;
    if source.dimensions() != (atlas.image_width, atlas.image_height) {
        warn!(
            expected_width = atlas.image_width,
            expected_height = atlas.image_height,
            actual_width = source.width(),
            actual_height = source.height(),
            "source image size differs from atlas"
        );
    }
    Ok((atlas, source))
}

/// The atlas records the image reference as given to `analyze`; fall back to
/// resolving it next to the atlas JSON when it does not exist as-is.
fn resolve_source(atlas_path: &Path, source_image: &str) -> PathBuf {
    let direct = PathBuf::from(source_image);
    if direct.is_absolute() || direct.exists() {
        return direct;
    }
    let beside = parent_dir(atlas_path).join(&direct);
    if beside.exists() {
        return beside;
    }
    match direct.file_name() {
        Some(name) => parent_dir(atlas_path).join(name),
        None => direct,
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `ui/gui_atlas.json` -> `gui`
fn atlas_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("atlas");
    stem.strip_suffix("_atlas").unwrap_or(stem).to_string()
}

/// `<stem>_atlas.json` next to the image, or under `out_dir` keeping the
/// image's folder relative to `input_root`.
fn atlas_json_path(image: &Path, input_root: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet");
    let dir = match out_dir {
        Some(d) => match image.strip_prefix(input_root).ok().and_then(Path::parent) {
            Some(rel) => d.join(rel),
            None => d.to_path_buf(),
        },
        None => parent_dir(image),
    };
    dir.join(format!("{}_atlas.json", stem))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn progress_bar(len: usize, verb: &str, show: bool) -> anyhow::Result<Option<ProgressBar>> {
    if !show {
        return Ok(None);
    }
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(&format!(
        "{{spinner:.green}} {} {{pos}}/{{len}} [{{elapsed_precise}}] {{wide_msg}}",
        verb
    ))?);
    Ok(Some(b))
}

/// Decodes every path; unreadable images are logged and skipped.
/// Returns the paths that loaded alongside their sheets, in the same order.
fn load_sheets_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<(Vec<PathBuf>, Vec<SheetInput>)> {
    let bar = progress_bar(paths.len(), "loading", progress)?;
    let mut loaded = Vec::with_capacity(paths.len());
    let mut sheets = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                let (width, height) = img.dimensions();
                sheets.push(SheetInput {
                    source_image: p.to_string_lossy().replace('\\', "/"),
                    width,
                    height,
                    pixels: img.into_raw(),
                });
                loaded.push(p.clone());
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok((loaded, sheets))
}

fn load_image(p: &Path) -> anyhow::Result<RgbaImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
fn rfc3339_now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_rfc3339(secs)
}

fn format_rfc3339(unix_secs: u64) -> String {
    let days = (unix_secs / 86_400) as i64;
    let rem = unix_secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

// days since 1970-01-01 -> proleptic Gregorian (year, month, day)
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

fn load_yaml_config(path: &Path) -> anyhow::Result<YamlConfig> {
    let file = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let y: YamlConfig =
        serde_yaml::from_str(&file).with_context(|| format!("parse {}", path.display()))?;
    Ok(y)
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    // analyze
    min_sprite_size: Option<u32>,
    max_sprites: Option<usize>,
    detect_states: Option<bool>,
    classifier: Option<ClassifierConfig>,
    // export
    max_atlas_size: Option<u32>,
    sort_order: Option<String>,
    // preview
    width: Option<u32>,
    height: Option<u32>,
    margin: Option<u32>,
    label_height: Option<u32>,
    max_scale: Option<f64>,
    min_scale: Option<f64>,
}

impl YamlConfig {
    fn apply_extract(&self, opts: &mut ExtractOptions) {
        if let Some(v) = self.min_sprite_size {
            opts.min_sprite_size = Some(v);
        }
        if let Some(v) = self.max_sprites {
            opts.max_sprites = Some(v);
        }
        if let Some(v) = self.detect_states {
            opts.detect_states = v;
        }
        if let Some(v) = &self.classifier {
            opts.classifier = v.clone();
        }
    }

    fn apply_pack(&self, cfg: &mut PackConfig) -> anyhow::Result<()> {
        if let Some(v) = self.max_atlas_size {
            cfg.max_size = v;
        }
        if let Some(v) = &self.sort_order {
            cfg.sort_order = parse_sort_order(v)?;
        }
        Ok(())
    }

    fn apply_layout(&self, cfg: &mut LayoutConfig) {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.margin {
            cfg.margin = v;
        }
        if let Some(v) = self.label_height {
            cfg.label_height = v;
        }
        if let Some(v) = self.max_scale {
            cfg.max_scale = v;
        }
        if let Some(v) = self.min_scale {
            cfg.min_scale = v;
        }
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse::<SortOrder>()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}
