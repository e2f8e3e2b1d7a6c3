use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::*;

use raindrops::{SceneConfig, Variant};

/// Falling raindrops in 3D.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Built-in scene to start from.
    #[arg(long, value_enum, default_value_t = Variant::Classic)]
    variant: Variant,

    /// JSON scene config; replaces the variant preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that asset paths are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Override the number of drops.
    #[arg(long)]
    count: Option<u32>,

    /// Seed for drop placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .format_timestamp(None)
        .filter_level(LevelFilter::Info)
        .filter_module("wgpu_hal", LevelFilter::Off)
        .filter_module("wgpu_core", LevelFilter::Error)
        .filter_module("naga", LevelFilter::Off)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let (config, source) = scene_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json());
        return Ok(());
    }

    info!("Starting scene from {source} with {} drops", config.spawn.count);
    raindrops::run(config, args.assets)?;

    Ok(())
}

/// Effective config for `args`, and where it came from for logging.
fn scene_config(args: &Args) -> anyhow::Result<(SceneConfig, String)> {
    let (mut config, source) = match &args.config {
        Some(path) => {
            let config = SceneConfig::load(path)
                .with_context(|| format!("couldn't load scene config {}", path.display()))?;
            (config, path.display().to_string())
        }
        None => (
            SceneConfig::preset(args.variant),
            format!("{:?} preset", args.variant),
        ),
    };
    if let Some(count) = args.count {
        config.spawn.count = count;
    }
    if args.seed.is_some() {
        config.spawn.seed = args.seed;
    }
    config.validate()?;
    Ok((config, source))
}
