//! Derive docking box centers from the native ligands found in PDB structure files.
use clap::Parser;

use dockcenter::resolve::run;
use dockcenter::Cancellation;

use crate::args::Args;

mod args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = args.into_config()?;
    log::debug!("{config:?}");

    let start = std::time::Instant::now();
    let summary = run(&config, &Cancellation::new())?;
    log::info!(
        "Resolved {}/{} docking centers. Took {:.3} s.",
        summary.resolved,
        summary.total(),
        start.elapsed().as_secs_f32()
    );
    if summary.file_not_found > 0 {
        log::warn!(
            "{} structure identifiers had no matching file. \
             Check the structure directory and file names.",
            summary.file_not_found
        );
    }

    Ok(())
}
