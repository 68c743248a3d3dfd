use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::*;

use cascadefst::normalize::normalize_weights;

/// Renormalize a log-semiring grammar so that each state's outgoing
/// weights sum to one.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input grammar FST
    #[arg(short, long)]
    input: PathBuf,
    /// Where to write the renormalized FST
    #[arg(short, long)]
    output: PathBuf,
    /// Print the pre-normalization log mass of each state
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut fst: VectorFst<LogWeight> = VectorFst::read(&args.input)?;
    let rescaled = normalize_weights(&mut fst, args.verbose)?;
    fst.write(&args.output)?;
    println!(
        "{} rescaled {} of {} states, written to {}",
        "Done:".green().bold(),
        rescaled,
        fst.num_states(),
        args.output.display()
    );
    Ok(())
}
