use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustfst::prelude::*;
use rustfst::semirings::SerializableSemiring;

use cascadefst::contextfst::{ContextBuilder, ContextConfig};
use cascadefst::symtab::{write_state_keys, write_symbol_table};

/// Generate a triphone context-dependency transducer from phone and
/// auxiliary-symbol lists.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Phone list, one phone per line
    #[arg(short, long)]
    phones: PathBuf,
    /// Auxiliary-symbol list, one symbol per line
    #[arg(short, long)]
    aux: PathBuf,
    /// Build in the tropical semiring instead of the log semiring
    #[arg(short, long)]
    tropical: bool,
    /// Guess right contexts from the start state (non-deterministic shape)
    #[arg(short, long)]
    non_deterministic: bool,
    /// Add explicit auxiliary-symbol self-loops at every context state
    #[arg(short, long)]
    explicit_aux: bool,
    /// Output prefix for the .fst, .isyms, .osyms and .ssyms files
    #[arg(short = 'x', long, default_value = "c")]
    prefix: String,
}

fn run<W>(args: &Args) -> Result<()>
where
    W: SerializableSemiring,
{
    let mut phone_syms = SymbolTable::new();
    let cd = ContextBuilder::<W>::from_files(&args.phones, &args.aux, &mut phone_syms)?
        .generate(ContextConfig {
            non_deterministic: args.non_deterministic,
            explicit_aux: args.explicit_aux,
        })?;

    let tri_syms = Arc::new(cd.tri_syms);
    let phone_syms = Arc::new(phone_syms);
    let mut fst = cd.fst;
    fst.set_input_symbols(Arc::clone(&tri_syms));
    fst.set_output_symbols(Arc::clone(&phone_syms));
    let fst_path = PathBuf::from(format!("{}.fst", args.prefix));
    fst.write(&fst_path)?;
    write_symbol_table(&tri_syms, &PathBuf::from(format!("{}.isyms", args.prefix)))?;
    write_symbol_table(&phone_syms, &PathBuf::from(format!("{}.osyms", args.prefix)))?;
    write_state_keys(
        &cd.state_keys,
        &PathBuf::from(format!("{}.ssyms", args.prefix)),
    )?;

    println!(
        "{} {} context states, written to {}",
        "Done:".green().bold(),
        fst.num_states(),
        fst_path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.tropical {
        run::<TropicalWeight>(&args)
    } else {
        run::<LogWeight>(&args)
    }
}
