use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustfst::prelude::*;
use rustfst::semirings::SerializableSemiring;

use cascadefst::lexiconfst::LexiconBuilder;
use cascadefst::symtab::write_symbol_table;

/// Convert a pronunciation lexicon to a phones-to-words transducer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Pronunciation lexicon, one `WORD PH1 .. PHn` entry per line
    lexicon: PathBuf,
    /// Build in the tropical semiring instead of the log semiring
    #[arg(short, long)]
    tropical: bool,
    /// Output prefix for the .fst, .isyms and .osyms files
    #[arg(short = 'x', long, default_value = "l")]
    prefix: String,
}

fn run<W>(args: &Args) -> Result<()>
where
    W: SerializableSemiring + Semiring<Type = f32>,
{
    let mut word_syms = SymbolTable::new();
    let lexicon = LexiconBuilder::<W>::new(&mut word_syms)?.compile_file(&args.lexicon)?;

    let phone_syms = Arc::new(lexicon.phone_syms);
    let word_syms = Arc::new(word_syms);
    let mut fst = lexicon.fst;
    fst.set_input_symbols(Arc::clone(&phone_syms));
    fst.set_output_symbols(Arc::clone(&word_syms));
    let fst_path = PathBuf::from(format!("{}.fst", args.prefix));
    fst.write(&fst_path)?;
    write_symbol_table(&phone_syms, &PathBuf::from(format!("{}.isyms", args.prefix)))?;
    write_symbol_table(&word_syms, &PathBuf::from(format!("{}.osyms", args.prefix)))?;

    println!(
        "{} {} phones, {} disambiguation symbols, written to {}",
        "Done:".green().bold(),
        lexicon.phones.len(),
        lexicon.aux_syms.len(),
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
