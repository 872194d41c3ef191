//! obj8 CLI - inspect and re-export X-Plane OBJ8 files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use obj8_core::{export_obj, import_obj, ExportOptions, ImportReport, LineEnding};
use obj8_math::format_float;
use std::path::{Path, PathBuf};

mod tree;

#[derive(Parser)]
#[command(name = "obj8")]
#[command(about = "Inspect and re-export X-Plane OBJ8 files", long_about = None)]
struct Cli {
    /// Log parser decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a file and print what was read
    Inspect {
        /// Path to the .obj file
        file: PathBuf,
        /// Dump the full import report as JSON
        #[arg(long)]
        json: bool,
        /// Print the animation node tree
        #[arg(long)]
        tree: bool,
    },
    /// Import a file and write it back out
    Convert {
        /// Input .obj file
        input: PathBuf,
        /// Output .obj file
        output: PathBuf,
        /// Line-ending marker to write (default: same as the input)
        #[arg(long, value_enum)]
        line_ending: Option<MarkerArg>,
        /// Target simulator version for tiered header attributes
        #[arg(long)]
        version: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MarkerArg {
    Unix,
    Apple,
}

impl From<MarkerArg> for LineEnding {
    fn from(arg: MarkerArg) -> Self {
        match arg {
            MarkerArg::Unix => LineEnding::Unix,
            MarkerArg::Apple => LineEnding::Apple,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Commands::Inspect { file, json, tree } => {
            inspect(&file, json, tree)?;
        }
        Commands::Convert {
            input,
            output,
            line_ending,
            version,
        } => {
            convert(&input, &output, line_ending, version)?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<ImportReport> {
    let report =
        import_obj(path).with_context(|| format!("Failed to import {}", path.display()))?;
    for diagnostic in report.diagnostics.entries() {
        log::debug!("{}", diagnostic);
    }
    Ok(report)
}

fn inspect(path: &Path, json: bool, tree: bool) -> Result<()> {
    let report = load(path)?;

    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
        return Ok(());
    }

    print!("{}", summary(&report));

    if tree {
        let mut printer = tree::TreePrinter::new();
        report.scene.materialize(&mut printer);
        println!();
        print!("{}", printer.out);
    }

    Ok(())
}

fn convert(
    input: &Path,
    output: &Path,
    line_ending: Option<MarkerArg>,
    version: Option<u32>,
) -> Result<()> {
    let report = load(input)?;

    let mut options = ExportOptions {
        line_ending: report.line_ending,
        ..Default::default()
    };
    if let Some(marker) = line_ending {
        options.line_ending = marker.into();
    }
    if let Some(version) = version {
        if version < 800 {
            anyhow::bail!("Unsupported target version: {}", version);
        }
        options.version = version;
    }

    export_obj(&report.scene, output, &options)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!(
        "Wrote {} ({} batches, {} lights)",
        output.display(),
        report.scene.batch_count(),
        report.scene.lights.len()
    );
    Ok(())
}

/// Human-readable overview of an import.
fn summary(report: &ImportReport) -> String {
    let scene = &report.scene;
    let mut out = String::new();

    out.push_str(&format!("Object:     {}\n", scene.name));
    out.push_str(&format!("Status:     {:?}\n", report.status()));
    if let Some(line) = report.stopped_at {
        out.push_str(&format!("Stopped at: line {}\n", line));
    }
    if let Some(texture) = &scene.textures.diffuse {
        out.push_str(&format!("Texture:    {}\n", texture.display()));
    }
    if let Some(material) = &scene.material_name {
        out.push_str(&format!("Material:   {}\n", material));
    }
    out.push_str(&format!("Vertices:   {}\n", scene.vertices.len()));
    out.push_str(&format!("Indices:    {}\n", scene.indices.len()));
    out.push_str(&format!(
        "Batches:    {} ({} triangles)\n",
        scene.batch_count(),
        scene.total_triangle_count()
    ));
    out.push_str(&format!("Lights:     {}\n", scene.lights.len()));
    out.push_str(&format!("LODs:       {}\n", scene.lod_count()));
    out.push_str(&format!("Depth:      {}\n", scene.depth()));
    let bounds = scene.bounds();
    if !bounds.is_empty() {
        out.push_str(&format!(
            "Bounds:     ({}, {}, {}) - ({}, {}, {})\n",
            format_float(bounds.min.x),
            format_float(bounds.min.y),
            format_float(bounds.min.z),
            format_float(bounds.max.x),
            format_float(bounds.max.y),
            format_float(bounds.max.z)
        ));
    }
    out.push_str(&format!(
        "Warnings:   {}\n",
        report.diagnostics.warning_count()
    ));
    for diagnostic in report.diagnostics.warnings() {
        out.push_str(&format!("  {}\n", diagnostic));
    }
    out
}
