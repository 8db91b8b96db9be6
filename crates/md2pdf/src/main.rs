//! md2pdf: convert a Markdown file to PDF.
//!
//! `md2pdf -i input.md [-o output.pdf] [--page A4|Letter|Legal] [--font-size N]`
//!
//! The direct engine writes the PDF itself; `--engine external` renders HTML
//! and hands it to wkhtmltopdf or a headless Chrome.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use md2pdf_core::error::ConvertError;
use md2pdf_core::options::{
    require_input, ConversionOptions, ConversionRequest, Engine, PageSize, RendererCandidate,
    TextSource,
};
use md2pdf_core::pipeline::PipelineBuilder;
use md2pdf_core::plugin::OutputPlugin;

const USAGE: &str = "Usage: md2pdf -i input.md [-o output.pdf] [options]";

#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    about = "md2pdf - Convert Markdown files to PDF",
    disable_version_flag = true,
    after_help = "Examples:\n  md2pdf -i README.md -o output.pdf\n  md2pdf -i document.md --font-size 14 --page Letter"
)]
struct Cli {
    /// Input Markdown file (required)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file (default: input filename with .pdf extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Page size: A4, Letter, Legal (default: A4)
    #[arg(long, value_name = "SIZE")]
    page: Option<PageSize>,

    /// Base font size in points (default: 12)
    #[arg(long, value_name = "PT", allow_negative_numbers = true)]
    font_size: Option<f32>,

    /// TrueType font for body text in the direct engine (default: bundled DejaVu Sans)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// TrueType font for headings (default: --font if given, else bundled DejaVu Sans Bold)
    #[arg(long, value_name = "FILE")]
    bold_font: Option<PathBuf>,

    /// Conversion engine: direct, external (default: direct)
    #[arg(long)]
    engine: Option<Engine>,

    /// Where the direct engine reads text from: tree, html (default: tree)
    #[arg(long)]
    text_source: Option<TextSource>,

    /// External renderer to try, in order. Replaces the configured list.
    #[arg(long = "renderer", value_name = "PROGRAM")]
    renderers: Vec<String>,

    /// Verbosity level
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Show version
    #[arg(short = 'v', long)]
    version: bool,
}

/// Config files in increasing precedence: global, then project-local.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("md2pdf").join("config.toml"));
    }
    paths.push(PathBuf::from(".md2pdf.toml"));
    paths
}

fn load_config() -> ConversionOptions {
    load_config_from(&config_paths())
}

/// Merge the given TOML files key by key, later files winning.
/// Missing files are silently ignored; malformed ones are skipped with a warning.
fn load_config_from(paths: &[PathBuf]) -> ConversionOptions {
    let mut merged = toml::Table::new();
    for path in paths {
        if let Some(table) = read_config_table(path) {
            merged.extend(table);
        }
    }

    match toml::Value::Table(merged).try_into::<ConversionOptions>() {
        Ok(opts) => opts,
        Err(e) => {
            log::warn!("Failed to apply config: {}", e);
            ConversionOptions::default()
        }
    }
}

fn read_config_table(path: &Path) -> Option<toml::Table> {
    let contents = std::fs::read_to_string(path).ok()?;
    let table = match toml::from_str::<toml::Table>(&contents) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            return None;
        }
    };
    // A file that doesn't describe valid options on its own must not poison
    // the merge.
    if let Err(e) = toml::Value::Table(table.clone()).try_into::<ConversionOptions>() {
        log::warn!("Ignoring {}: {}", path.display(), e);
        return None;
    }
    log::debug!("Loaded config {}", path.display());
    Some(table)
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(opts: &mut ConversionOptions, cli: &Cli) {
    if let Some(page) = cli.page {
        opts.page_size = page;
    }
    if let Some(size) = cli.font_size {
        opts.font_size = size;
    }
    if let Some(font) = &cli.font {
        opts.font = Some(font.clone());
    }
    if let Some(font) = &cli.bold_font {
        opts.bold_font = Some(font.clone());
    }
    if let Some(engine) = cli.engine {
        opts.engine = engine;
    }
    if let Some(source) = cli.text_source {
        opts.text_source = source;
    }
    if !cli.renderers.is_empty() {
        opts.renderers = cli
            .renderers
            .iter()
            .map(RendererCandidate::from_program)
            .collect();
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        println!("md2pdf version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    // Handle --dump-config
    if cli.dump_config {
        let mut opts = load_config();
        apply_cli_overrides(&mut opts, &cli);
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = run(&cli) {
        let usage = e
            .downcast_ref::<ConvertError>()
            .is_some_and(ConvertError::is_usage);
        if usage {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            eprintln!("Try 'md2pdf --help' for more information.");
            process::exit(2);
        }
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Checked before any config is read or output touched.
    let input = require_input(cli.input.clone())?;

    let mut options = load_config();
    apply_cli_overrides(&mut options, cli);

    let request = ConversionRequest::resolve(Some(input), cli.output.clone(), options)?;
    log::info!(
        "Converting {} → {} ({}, {}, {}pt)",
        request.input.display(),
        request.output.display(),
        request.options.engine,
        request.options.page_size,
        request.options.font_size
    );

    let pipeline = PipelineBuilder::new()
        .input(Box::new(md2pdf_input_markdown::MarkdownInputPlugin))
        .output(get_output_plugin(request.options.engine))
        .progress_reporter(Box::new(|frac, msg| {
            if frac < 1.0 {
                log::info!("[{:3.0}%] {}", frac * 100.0, msg);
            } else {
                log::info!("Done!");
            }
        }))
        .build()?;

    pipeline.run(&request).context("Conversion failed")?;

    println!(
        "Successfully converted {} to {}",
        request.input.display(),
        request.output.display()
    );
    Ok(())
}

fn get_output_plugin(engine: Engine) -> Box<dyn OutputPlugin> {
    match engine {
        Engine::Direct => Box::new(md2pdf_output_pdf::PdfOutputPlugin),
        Engine::External => Box::new(md2pdf_output_html::ExternalPdfOutputPlugin),
    }
}
