//! Triphone context-dependency transducers.
//!
//! Maps context-dependent triphone labels `lp-mp+rp` back to monophones.
//! States track the surrounding phone pair, so each state key is `"lp,mp"`
//! and arcs move the window one phone to the right. The deterministic
//! variant routes word-boundary positions through epsilon-padded contexts;
//! the non-deterministic variant guesses the right context up front from
//! the start state. Either variant can carry explicit auxiliary self-loops
//! so lexicon disambiguation symbols survive composition.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::*;

use crate::symtab::read_symbol_list;
use crate::Vocab;

/// Shape options for [`ContextBuilder::generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextConfig {
    /// Guess right contexts from the start state instead of delaying them.
    pub non_deterministic: bool,
    /// Add auxiliary-symbol self-loops at every context state.
    pub explicit_aux: bool,
}

/// Build a context-dependency transducer over a monophone alphabet owned
/// by the caller (typically the lexicon's phone table, so labels line up
/// for C ∘ LG).
pub struct ContextBuilder<'a, W: Semiring> {
    vocab: Vocab,
    phones: BTreeSet<String>,
    aux_syms: BTreeSet<String>,
    /// Input alphabet: triphones, owned here
    tri_syms: SymbolTable,
    /// Shared output alphabet: monophones and auxiliary symbols
    phone_syms: &'a mut SymbolTable,
    states: std::collections::HashMap<String, StateId>,
    state_keys: Vec<String>,
    fst: VectorFst<W>,
}

/// A generated context-dependency transducer plus its triphone alphabet.
pub struct ContextDependency<W: Semiring> {
    pub fst: VectorFst<W>,
    /// Triphone-side symbol table
    pub tri_syms: SymbolTable,
    /// Context keys in state-id order, for symbolic state dumps
    pub state_keys: Vec<String>,
}

impl<W: Semiring> ContextDependency<W> {
    /// Look up the state carrying a context key such as `"A,B"`.
    pub fn state(&self, key: &str) -> Option<StateId> {
        self.state_keys
            .iter()
            .position(|k| k == key)
            .map(|pos| pos as StateId)
    }
}

impl<'a, W: Semiring> ContextBuilder<'a, W> {
    pub fn new(
        phones: BTreeSet<String>,
        aux_syms: BTreeSet<String>,
        phone_syms: &'a mut SymbolTable,
    ) -> Result<Self> {
        let vocab = Vocab::default();
        let mut fst = VectorFst::new();
        let start = fst.add_state();
        fst.set_start(start)?;
        let mut builder = Self {
            vocab,
            phones,
            aux_syms,
            tri_syms: SymbolTable::new(),
            phone_syms,
            states: std::collections::HashMap::new(),
            state_keys: Vec::new(),
            fst,
        };
        builder
            .states
            .insert(builder.vocab.start.clone(), start);
        builder.state_keys.push(builder.vocab.start.clone());
        Ok(builder)
    }

    /// Read phone and auxiliary-symbol lists, one symbol per line.
    pub fn from_files(
        phone_list: &Path,
        aux_list: &Path,
        phone_syms: &'a mut SymbolTable,
    ) -> Result<Self> {
        let phones = read_symbol_list(phone_list)?;
        let aux_syms = read_symbol_list(aux_list)?;
        Self::new(phones, aux_syms, phone_syms)
    }

    fn state(&mut self, key: &str) -> StateId {
        match self.states.get(key) {
            Some(s) => *s,
            None => {
                let s = self.fst.add_state();
                self.states.insert(key.to_string(), s);
                self.state_keys.push(key.to_string());
                s
            }
        }
    }

    fn make_arc(&mut self, lp: &str, mp: &str, rp: &str) -> Result<()> {
        let (issym, isym) = if lp == self.vocab.start {
            (self.vocab.start.clone(), self.vocab.eps.clone())
        } else {
            (format!("{},{}", lp, mp), format!("{}-{}+{}", lp, mp, rp))
        };
        let ossym = format!("{},{}", mp, rp);
        let istate = self.state(&issym);
        let ostate = self.state(&ossym);
        let ilabel = self.tri_syms.add_symbol(isym);
        let olabel = self.phone_syms.add_symbol(rp);
        self.fst
            .add_tr(istate, Tr::new(ilabel, olabel, W::one(), ostate))?;
        Ok(())
    }

    fn make_final(&mut self, lp: &str, rp: &str) -> Result<()> {
        let state = self.state(&format!("{},{}", lp, rp));
        self.fst.set_final(state, W::one())?;
        Ok(())
    }

    fn make_aux(&mut self, lp: &str, rp: &str) -> Result<()> {
        let state = self.state(&format!("{},{}", lp, rp));
        for au in &self.aux_syms {
            let ilabel = self.tri_syms.add_symbol(au.as_str());
            let olabel = self.phone_syms.add_symbol(au.as_str());
            self.fst
                .add_tr(state, Tr::new(ilabel, olabel, W::one(), state))?;
        }
        Ok(())
    }

    /// Generate the transducer, consuming the builder.
    pub fn generate(mut self, config: ContextConfig) -> Result<ContextDependency<W>> {
        let phones: Vec<String> = self.phones.iter().cloned().collect();
        let eps = self.vocab.eps.clone();
        let start = self.vocab.start.clone();
        for lp in &phones {
            if config.non_deterministic {
                // Monophones read their own context at the start state.
                self.make_arc(&start, lp, &eps)?;
                self.make_final(lp, &eps)?;
                if config.explicit_aux {
                    self.make_aux(lp, &eps)?;
                }
                for mp in &phones {
                    self.make_arc(&start, lp, mp)?;
                    self.make_arc(lp, mp, &eps)?;
                    if config.explicit_aux {
                        self.make_aux(lp, mp)?;
                    }
                }
            } else {
                // Word-initial positions pass through an eps-padded context.
                self.make_arc(&start, &eps, lp)?;
                self.make_arc(&eps, lp, &eps)?;
                if config.explicit_aux {
                    self.make_aux(&eps, lp)?;
                }
                self.make_final(lp, &eps)?;
                for mp in &phones {
                    self.make_arc(&eps, lp, mp)?;
                    self.make_arc(lp, mp, &eps)?;
                    if config.explicit_aux {
                        self.make_aux(lp, mp)?;
                    }
                }
            }
            for (mp, rp) in phones.iter().cartesian_product(phones.iter()) {
                self.make_arc(lp, mp, rp)?;
            }
        }
        Ok(ContextDependency {
            fst: self.fst,
            tri_syms: self.tri_syms,
            state_keys: self.state_keys,
        })
    }
}
