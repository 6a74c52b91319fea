use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "perimetry.toml")]
    pub config: String,

    /// Load the point graph from this JSON file (overrides config)
    #[arg(long, value_name = "PATH")]
    pub points: Option<String>,

    /// Write the generated hexagonal grid to this JSON file and exit
    #[arg(long, value_name = "PATH")]
    pub write_grid: Option<String>,

    /// Observer RNG seed (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Nominal batch size (overrides config)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub batch_size: Option<usize>,

    /// Keep locations active after a seen refinement trial
    #[arg(long, default_value_t = false)]
    pub legacy_half_step: bool,

    /// Print the run report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Debug-level logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
