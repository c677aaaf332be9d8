use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "atlas-temporal",
    about = "Inspect feature states of a temporal 3D tiles scene"
)]
struct Cli {
    /// Temporal configuration (JSON).
    #[arg(long, env = "ATLAS_TEMPORAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured synthetic creation/demolition window.
    #[arg(long, global = true, allow_negative_numbers = true)]
    half_vintage: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print per-tile feature states at one time.
    States {
        scene: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
        /// Only these tiles (repeatable). Defaults to every tile of the scene.
        #[arg(long = "tile")]
        tiles: Vec<u64>,
    },
    /// Step through time and print style counts, one JSON line per step.
    Sweep {
        scene: PathBuf,
        #[arg(long)]
        step: f64,
        #[arg(long, allow_negative_numbers = true)]
        from: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        to: Option<f64>,
    },
    /// Print the style table.
    Styles,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), String> {
    let config = tools::load_config(cli.config.as_deref(), cli.half_vintage)?;

    match cli.command {
        Command::States { scene, time, tiles } => {
            let loaded = formats::load_scene_file(&scene).map_err(|e| e.to_string())?;
            let report = tools::states_report(loaded, config, time, &tiles)?;
            let payload =
                serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
            println!("{payload}");
        }
        Command::Sweep {
            scene,
            step,
            from,
            to,
        } => {
            let loaded = formats::load_scene_file(&scene).map_err(|e| e.to_string())?;
            for row in tools::sweep(loaded, config, from, to, step)? {
                let line = serde_json::to_string(&row).map_err(|e| format!("json: {e}"))?;
                println!("{line}");
            }
        }
        Command::Styles => {
            let payload = serde_json::to_string_pretty(&tools::styles_table(&config))
                .map_err(|e| format!("json: {e}"))?;
            println!("{payload}");
        }
    }
    Ok(())
}
