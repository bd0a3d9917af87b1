use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use meshview::{ViewerApp, ViewerConfig};

/// Interactive OBJ/glTF model viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Model to load at startup (.obj, .gltf or .glb)
    model: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_overrides(cli.model, cli.width, cli.height);

    ViewerApp::new(config)?.run()
}
