mod export;
mod io;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use falculator_core::{Simulator, describe};

#[derive(Parser, Debug)]
#[command(name = "falculator")]
#[command(about = "A deterministic discrete-time financial simulator")]
struct Args {
    /// Path to the simulation config (JSON)
    #[arg(short, long, required_unless_present = "generate_schemas")]
    config: Option<PathBuf>,

    /// Run the simulation to completion
    #[arg(long)]
    run: bool,

    /// Log level (debug, info, warn, error); overrides the config's level
    #[arg(long)]
    loglevel: Option<String>,

    /// Directory for outputs (frames, sanitized config)
    #[arg(long, default_value = ".")]
    savepath: PathBuf,

    /// Override years_to_sim from the config
    #[arg(long)]
    years_override: Option<u32>,

    /// Sanitize the config, print the correction report, write it back
    #[arg(long)]
    sanitize_config: bool,

    /// Dump entity schemas as JSON to stdout and exit
    #[arg(long)]
    generate_schemas: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if args.generate_schemas {
        let schemas = describe::describe_entities();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    let config_path = args
        .config
        .as_deref()
        .ok_or_else(|| eyre!("--config is required"))?;
    let mut config = io::load_config(config_path)?;

    let level = args
        .loglevel
        .clone()
        .unwrap_or_else(|| config.log_level.as_filter().to_string());
    logging::init_logging(&level)?;

    if let Some(years) = args.years_override {
        tracing::info!(years, "overriding simulation duration");
        config.years_to_sim = years;
    }

    // Sanitize up front so the report is printable and the ids in the
    // exported frames match this config.
    let report = config.sanitize();
    if args.sanitize_config {
        print!("{report}");
    } else if !report.is_clean() {
        tracing::warn!(
            corrections = report.corrections().len(),
            "sanitize applied corrections; run with --sanitize-config for the full report"
        );
    }
    if report.is_fatal() {
        return Err(eyre!("config has fatal problems; refusing to continue"));
    }

    if args.sanitize_config {
        std::fs::create_dir_all(&args.savepath)?;
        let out = args.savepath.join(
            config_path
                .file_name()
                .ok_or_else(|| eyre!("config path has no file name"))?,
        );
        io::save_config(&config, &out)?;
        println!("sanitized config written to {}", out.display());
    }

    if !args.run {
        return Ok(());
    }

    let mut sim = Simulator::new(config.clone())
        .map_err(|e| eyre!("{e}"))
        .wrap_err("simulation refused to start")?;
    sim.run();

    let (completed, total) = sim.progress();
    let final_balance = sim
        .frames()
        .last()
        .and_then(|f| f.items.first())
        .map(|s| s.value)
        .unwrap_or_default();
    println!("completed {completed}/{total} steps, {} frames", sim.frames().len());
    println!("final main savings balance: {final_balance}");

    std::fs::create_dir_all(&args.savepath)?;
    let json_path = args.savepath.join("frames.json");
    export::write_frames_json(sim.frames(), &json_path)?;
    let csv_path = args.savepath.join("frames.csv");
    export::write_frames_csv(&config, sim.frames(), &csv_path)?;
    println!(
        "frames written to {} and {}",
        json_path.display(),
        csv_path.display()
    );

    Ok(())
}
