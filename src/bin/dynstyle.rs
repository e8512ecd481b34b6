use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use dynstyle::{FeatureCollection, StyleEngine};

#[derive(Parser, Debug)]
#[command(name = "dynstyle", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and compile a style document, reporting rules that fail to compile.
    Check(CheckArgs),
    /// Resolve the style of every feature of a GeoJSON collection.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Style document JSON.
    #[arg(long)]
    style: PathBuf,

    /// Layer name (defaults to LAYER<n>).
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Style document JSON.
    #[arg(long)]
    style: PathBuf,

    /// GeoJSON FeatureCollection.
    #[arg(long)]
    features: PathBuf,

    /// Map resolution (map units per pixel).
    #[arg(long)]
    resolution: f64,

    /// Inline JSON exposed to expressions as `U`.
    #[arg(long)]
    userdata: Option<String>,

    /// Layer name (defaults to LAYER<n>).
    #[arg(long)]
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_json(path: &Path, what: &str) -> anyhow::Result<serde_json::Value> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse {what} JSON"))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let json = read_json(&args.style, "style")?;
    let engine = StyleEngine::new(args.name.as_deref(), json)?;
    let compilation = engine.begin_compile();
    let images = compilation.pending_loads().len();
    let function = compilation.finish();

    let diagnostics = function.diagnostics();
    for d in diagnostics {
        println!("error: {d}");
    }
    let doc = function.document();
    println!(
        "{}: {} static styles, {} scales, {} images, {} errors",
        function.name(),
        doc.root()["static"].as_object().map_or(0, |s| s.len()),
        doc.scales().len(),
        images,
        diagnostics.len()
    );

    if let Some(first) = diagnostics.first() {
        return Err(anyhow::Error::new(first.error())
            .context(format!("{} rule(s) failed to compile", diagnostics.len())));
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let json = read_json(&args.style, "style")?;
    let features: FeatureCollection = serde_json::from_value(read_json(&args.features, "features")?)
        .with_context(|| "parse GeoJSON FeatureCollection")?;
    let userdata: serde_json::Value = match &args.userdata {
        Some(s) => serde_json::from_str(s).with_context(|| "parse --userdata JSON")?,
        None => serde_json::json!({}),
    };

    let mut function = StyleEngine::new(args.name.as_deref(), json)?
        .with_userdata(move || userdata.clone())
        .compile();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for feature in &features.features {
        let styles = match function.call(feature, args.resolution) {
            Some(set) => serde_json::to_value(&*set.borrow()).context("serialize styles")?,
            None => serde_json::Value::Null,
        };
        let line = serde_json::json!({
            "feature": feature.id.clone().unwrap_or(serde_json::Value::Null),
            "styles": styles,
        });
        writeln!(out, "{line}")?;
    }
    Ok(())
}
