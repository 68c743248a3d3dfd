use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustfst::fst_traits::ExpandedFst;

use cascadefst::cascade::build_cascade;

/// Build a C ∘ det(L ∘ G) recognition cascade from an ARPA language
/// model and a pronunciation lexicon.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// ARPA-format n-gram language model
    arpa: PathBuf,
    /// Pronunciation lexicon, one `WORD PH1 .. PHn` entry per line
    lexicon: PathBuf,
    /// Directory for the generated machines and symbol tables
    #[arg(short, long, default_value = "cascade")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let clg = build_cascade(&args.arpa, &args.lexicon, &args.out_dir)?;
    println!(
        "{} {} states written to {}",
        "Done:".green().bold(),
        clg.num_states(),
        args.out_dir.join("clg.fst").display()
    );
    Ok(())
}
