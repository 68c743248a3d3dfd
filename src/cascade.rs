//! End-to-end decoding-graph assembly.
//!
//! Builds G, L and C over shared symbol tables, then composes them into
//! C ∘ det(L ∘ G) in the log semiring, persisting every intermediate
//! machine so each stage can be inspected or reused on its own.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustfst::algorithms::closure::{closure, ClosureType};
use rustfst::algorithms::determinize::{determinize_with_config, DeterminizeConfig, DeterminizeType};
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::compose::compose;
use rustfst::prelude::*;

use crate::contextfst::{ContextBuilder, ContextConfig};
use crate::grammarfst::GrammarBuilder;
use crate::lexiconfst::LexiconBuilder;
use crate::symtab::write_symbol_table;

/// Build the full recognition cascade from an ARPA model and a
/// pronunciation lexicon, writing every stage under `out_dir`:
/// `g.fst`, `l.fst`, `c.fst`, `ndlg.fst`, `lg.fst`, `clg.fst`, plus the
/// word and phone symbol tables. Returns the final CLG machine.
pub fn build_cascade(
    arpa: &Path,
    lexicon: &Path,
    out_dir: &Path,
) -> Result<VectorFst<LogWeight>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("unable to create output directory {}", out_dir.display()))?;

    let mut word_syms = SymbolTable::new();

    println!("Generating the grammar FST...");
    let grammar = GrammarBuilder::<LogWeight>::new(&mut word_syms)?.compile_file(arpa)?;

    println!("Generating the lexicon FST...");
    let lexicon = LexiconBuilder::<LogWeight>::new(&mut word_syms)?.compile_file(lexicon)?;
    let mut phone_syms = lexicon.phone_syms;

    println!("Generating the context-dependency FST...");
    let cd = ContextBuilder::<LogWeight>::new(
        lexicon.phones.clone(),
        lexicon.aux_syms.clone(),
        &mut phone_syms,
    )?
    .generate(ContextConfig {
        non_deterministic: false,
        explicit_aux: true,
    })?;

    let word_syms = Arc::new(word_syms);
    let phone_syms = Arc::new(phone_syms);
    let tri_syms = Arc::new(cd.tri_syms);
    write_symbol_table(&word_syms, &out_dir.join("words.syms"))?;
    write_symbol_table(&phone_syms, &out_dir.join("phones.syms"))?;

    let mut g = grammar.fst;
    g.set_input_symbols(Arc::clone(&word_syms));
    g.set_output_symbols(Arc::clone(&word_syms));
    g.write(out_dir.join("g.fst"))?;

    let mut l = lexicon.fst;
    l.set_input_symbols(Arc::clone(&phone_syms));
    l.set_output_symbols(Arc::clone(&word_syms));
    l.write(out_dir.join("l.fst"))?;

    let mut c = cd.fst;
    c.set_input_symbols(Arc::clone(&tri_syms));
    c.set_output_symbols(Arc::clone(&phone_syms));
    c.write(out_dir.join("c.fst"))?;

    // One lexicon pass handles one word; the grammar needs a sequence.
    closure(&mut l, ClosureType::ClosureStar);

    println!("Generating LG...");
    tr_sort(&mut g, ILabelCompare {});
    tr_sort(&mut l, OLabelCompare {});
    let ndlg: VectorFst<LogWeight> = compose(l, g)?;
    ndlg.write(out_dir.join("ndlg.fst"))?;

    println!("Determinizing LG...");
    let mut lg: VectorFst<LogWeight> = determinize_with_config(
        &ndlg,
        DeterminizeConfig {
            delta: 1e-6,
            det_type: DeterminizeType::DeterminizeFunctional,
        },
    )?;
    lg.write(out_dir.join("lg.fst"))?;

    println!("Generating CLG...");
    tr_sort(&mut c, OLabelCompare {});
    tr_sort(&mut lg, ILabelCompare {});
    let mut clg: VectorFst<LogWeight> = compose(c, lg)?;
    clg.set_input_symbols(Arc::clone(&tri_syms));
    clg.set_output_symbols(Arc::clone(&word_syms));
    clg.write(out_dir.join("clg.fst"))?;

    Ok(clg)
}
