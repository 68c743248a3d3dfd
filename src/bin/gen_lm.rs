use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustfst::prelude::*;
use rustfst::semirings::SerializableSemiring;

use cascadefst::grammarfst::GrammarBuilder;
use cascadefst::symtab::{write_state_keys, write_symbol_table};

/// Convert an ARPA-format n-gram language model to a grammar acceptor.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// ARPA-format n-gram language model
    arpa: PathBuf,
    /// Build in the tropical semiring instead of the log semiring
    #[arg(short, long)]
    tropical: bool,
    /// Output prefix for the .fst, .wsyms and .ssyms files
    #[arg(short = 'x', long, default_value = "g")]
    prefix: String,
}

fn run<W>(args: &Args) -> Result<()>
where
    W: SerializableSemiring + Semiring<Type = f32>,
{
    let mut word_syms = SymbolTable::new();
    let grammar = GrammarBuilder::<W>::new(&mut word_syms)?.compile_file(&args.arpa)?;

    let word_syms = Arc::new(word_syms);
    let mut fst = grammar.fst;
    fst.set_input_symbols(Arc::clone(&word_syms));
    fst.set_output_symbols(Arc::clone(&word_syms));
    let fst_path = PathBuf::from(format!("{}.fst", args.prefix));
    fst.write(&fst_path)?;
    write_symbol_table(&word_syms, &PathBuf::from(format!("{}.wsyms", args.prefix)))?;
    write_state_keys(
        &grammar.state_keys,
        &PathBuf::from(format!("{}.ssyms", args.prefix)),
    )?;

    println!(
        "{} order-{} model, {} states, written to {}",
        "Done:".green().bold(),
        grammar.max_order,
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
