use anyhow::Result;
use clap::Parser;
use genesoup_lib::app::{App, RunOptions};
use genesoup_lib::model::metrics::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Print a JSON snapshot of the world every N ticks
    #[arg(long)]
    snapshot_every: Option<u64>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut app = App::new(RunOptions {
        config_path: args.config,
        seed: args.seed,
        ticks: args.ticks,
        snapshot_every: args.snapshot_every,
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = app.run(&mut out)?;
    eprintln!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
