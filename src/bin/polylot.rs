use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "polylot", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a scene as delta-encoded Lottie JSON.
    Export(ExportArgs),
    /// Encode in memory and print keyframe statistics.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output Lottie JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Decimal places kept for path coordinates.
    #[arg(long, default_value_t = 2)]
    position_precision: u8,

    /// Decimal places kept for fill channels.
    #[arg(long, default_value_t = 4)]
    color_precision: u8,

    /// Author string written into the document metadata.
    #[arg(long)]
    author: Option<String>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<polylot::Scene> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: polylot::Scene = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;

    let opts = polylot::ExportOptions {
        position_precision: args.position_precision,
        color_precision: args.color_precision,
        author: args.author,
    };

    polylot::export_scene(&scene, &opts, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    let doc = polylot::encode_document(&scene, &polylot::ExportOptions::default())?;
    let stats = doc.stats();

    eprintln!("scene:          {}", scene.name);
    eprintln!(
        "canvas:         {}x{}",
        scene.canvas.width, scene.canvas.height
    );
    eprintln!("fps:            {}", scene.fps.as_f64());
    eprintln!(
        "range:          [{}, {}) ({} frames)",
        scene.range.start.0,
        scene.range.end.0,
        scene.range.len_frames()
    );
    eprintln!("groups:         {}", stats.groups);
    eprintln!("path keyframes: {}", stats.path_keyframes);
    eprintln!("fill keyframes: {}", stats.fill_keyframes);
    Ok(())
}
