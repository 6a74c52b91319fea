// Entry point: build or load the grid, run a simulated threshold test, report.
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use perimetry::app;
use perimetry::cli::Args;
use perimetry::config::AppConfig;
use perimetry::core::grid::PointGraph;
use perimetry::core::hexgrid;
use perimetry::observer::VirtualObserver;
use perimetry::sampler::Sampler;

fn init_logging(verbose: bool) {
    let default = if verbose {
        "perimetry=debug"
    } else {
        "perimetry=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut cfg = AppConfig::load_or_default(&args.config);
    if let Some(path) = args.points.clone() {
        cfg.grid.points_path = Some(path);
    }
    if let Some(seed) = args.seed {
        cfg.observer.seed = Some(seed);
    }
    if let Some(batch_size) = args.batch_size {
        cfg.sampler.batch_size = batch_size;
    }
    if args.legacy_half_step {
        cfg.sampler.legacy_half_step = true;
    }

    if let Some(out) = &args.write_grid {
        let graph = hexgrid::build(&cfg.grid.hex_params()).context("building hexagonal grid")?;
        graph
            .save(out)
            .with_context(|| format!("writing grid to {out}"))?;
        info!("wrote {} locations to {out}", graph.len());
        return Ok(());
    }

    let graph = match &cfg.grid.points_path {
        Some(path) => {
            PointGraph::load(path).with_context(|| format!("loading point graph {path}"))?
        }
        None => hexgrid::build(&cfg.grid.hex_params()).context("building hexagonal grid")?,
    };
    info!("grid: {} locations", graph.len());

    let mut sampler = Sampler::new(&graph, cfg.sampler.clone());
    let mut observer = VirtualObserver::from_config(&graph, sampler.scale(), &cfg.observer);
    let report = app::run(&mut sampler, &mut observer, &cfg.run).context("simulation run")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Rounds: {}", report.rounds);
    println!("Samples: {}", report.samples);
    let deltas = report.errors_against(observer.field());
    if let Some(mae) = report.mean_abs_error(observer.field()) {
        println!("Mean |true - determined|: {mae:.2}");
    }
    let listed: Vec<String> = deltas.iter().map(|d| format!("{d:.2}")).collect();
    println!("Delta: {}", listed.join(", "));
    Ok(())
}
