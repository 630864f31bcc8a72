//! Vellum CLI
//!
//! Exports editor HTML as a self-contained fragment with every stylesheet
//! declaration inlined.

use std::fmt::Display;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use owo_colors::OwoColorize;
use vellum_export::{ExportConfig, ExportReport, Exporter, HeadlessHost, StylesheetResolver};

/// Vellum: portable HTML export
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Export a template; linked sheets resolve next to the file
    vellum template.html

    # Apply the editor's class stylesheet
    vellum template.html --css editor.css

    # Export an inline snippet and show what happened
    vellum --html '<div class="red">Hi</div>' --css editor.css --stats

    # Read from stdin with a custom configuration
    cat template.html | vellum --config vellum.json
"#)]
struct Cli {
    /// HTML file to export (stdin when omitted)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Export this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Extra stylesheet, applied ahead of the document's own (repeatable)
    #[arg(long = "css", value_name = "FILE")]
    stylesheets: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print export counters to stderr
    #[arg(long)]
    stats: bool,

    /// Print the full report as JSON instead of the HTML
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => ExportConfig::from_path(path)?,
        None => ExportConfig::default(),
    };
    let html = read_input(&cli)?;
    let stylesheets = cli
        .stylesheets
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read stylesheet '{}'", path.display()))
        })
        .collect::<Result<Vec<String>>>()?;

    // Linked sheets resolve relative to the input file, or the working directory.
    let base_dir = cli
        .path
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let host = HeadlessHost::new().with_resolver(StylesheetResolver::Directory(base_dir));
    let exporter = Exporter::new(host).with_config(config)?;

    let sheets: Vec<&str> = stylesheets.iter().map(String::as_str).collect();
    let report = exporter.render_detailed(&html, &sheets).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.html);
    }
    if cli.stats {
        print_stats(&report);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        return Ok(html.clone());
    }
    if let Some(path) = &cli.path {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()));
    }
    let mut html = String::new();
    let _ = io::stdin()
        .read_to_string(&mut html)
        .context("failed to read HTML from stdin")?;
    Ok(html)
}

fn print_stats(report: &ExportReport) {
    let status = if report.fell_back {
        "input returned unchanged".red().to_string()
    } else if report.stylable {
        "exported".green().to_string()
    } else {
        "exported without readable stylesheets".yellow().to_string()
    };
    eprintln!("{} {status}", "vellum:".bold());
    row("poll attempts", &report.poll_attempts);
    row("style sheets", &report.sheets);
    row("rules indexed", &report.rules_indexed);
    row("rules matched", &report.cascade.rules_matched);
    row("selectors skipped", &report.cascade.selectors_skipped);
    row("elements styled", &report.cascade.elements_styled);
    row("properties written", &report.cascade.properties_written);
    row("style elements removed", &report.style_elements_removed);
    row("paragraphs synthesized", &report.paragraphs_synthesized);
}

fn row(label: &str, value: &dyn Display) {
    eprintln!("  {} {}", format!("{label:<24}").dimmed(), value.cyan());
}
