//! Lexicon transducers from pronunciation dictionaries.
//!
//! Each `WORD PH1 .. PHn` entry becomes a fresh linear chain from the
//! single shared start state: the first arc consumes the first phone and
//! emits the word, later arcs consume one phone each and emit epsilon, and
//! a final disambiguation arc consumes a freshly numbered auxiliary symbol
//! so that duplicate pronunciations stay apart under determinization.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::*;

/// Build a lexicon transducer over a word alphabet owned by the caller
/// (typically the grammar builder's table, so labels line up for L ∘ G).
pub struct LexiconBuilder<'a, W: Semiring<Type = f32>> {
    /// Shared output alphabet: words
    word_syms: &'a mut SymbolTable,
    /// Input alphabet: phones and auxiliary symbols, owned here
    phone_syms: SymbolTable,
    fst: VectorFst<W>,
    start: StateId,
    phones: BTreeSet<String>,
    aux_syms: BTreeSet<String>,
    /// Occurrences of each exact joined phone sequence seen so far
    pron_counts: HashMap<String, usize>,
}

/// A compiled lexicon transducer plus the alphabets it discovered.
pub struct Lexicon<W: Semiring<Type = f32>> {
    pub fst: VectorFst<W>,
    /// Phone-side symbol table (phones and auxiliary symbols)
    pub phone_syms: SymbolTable,
    /// Every phone observed in the dictionary
    pub phones: BTreeSet<String>,
    /// Every disambiguation symbol minted
    pub aux_syms: BTreeSet<String>,
}

impl<'a, W: Semiring<Type = f32>> LexiconBuilder<'a, W> {
    pub fn new(word_syms: &'a mut SymbolTable) -> Result<Self> {
        let mut fst = VectorFst::new();
        let start = fst.add_state();
        fst.set_start(start)?;
        Ok(Self {
            word_syms,
            phone_syms: SymbolTable::new(),
            fst,
            start,
            phones: BTreeSet::new(),
            aux_syms: BTreeSet::new(),
            pron_counts: HashMap::new(),
        })
    }

    fn add_entry(&mut self, word: &str, phones: &[&str]) -> Result<()> {
        let pron = phones.join(" ");
        let count = self.pron_counts.entry(pron).or_insert(0);
        *count += 1;
        let aux = format!("#{}", count);

        let mut state = self.start;
        for (i, phone) in phones.iter().enumerate() {
            let next = self.fst.add_state();
            let ilabel = self.phone_syms.add_symbol(*phone);
            let olabel = if i == 0 {
                self.word_syms.add_symbol(word)
            } else {
                EPS_LABEL
            };
            self.fst
                .add_tr(state, Tr::new(ilabel, olabel, W::one(), next))?;
            self.phones.insert(phone.to_string());
            state = next;
        }
        // Disambiguation arc, then the chain's final state.
        let ilabel = self.phone_syms.add_symbol(&aux);
        let last = self.fst.add_state();
        self.fst
            .add_tr(state, Tr::new(ilabel, EPS_LABEL, W::one(), last))?;
        self.fst.set_final(last, W::one())?;
        self.aux_syms.insert(aux);
        Ok(())
    }

    /// Compile the dictionary into a lexicon transducer, consuming the
    /// builder. Lines without at least a word and one phone are skipped.
    pub fn compile<R: BufRead>(mut self, reader: R) -> Result<Lexicon<W>> {
        for line in reader.lines() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                continue;
            }
            self.add_entry(tokens[0], &tokens[1..])?;
        }
        Ok(Lexicon {
            fst: self.fst,
            phone_syms: self.phone_syms,
            phones: self.phones,
            aux_syms: self.aux_syms,
        })
    }

    /// Compile from a file path; an unreadable file aborts construction.
    pub fn compile_file(self, path: &Path) -> Result<Lexicon<W>> {
        let fh = File::open(path)
            .with_context(|| format!("unable to open lexicon {}", path.display()))?;
        self.compile(BufReader::new(fh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TOY_DICT: &str = "\
ok AY
red R EH D
read R EH D
";

    fn toy_lexicon(word_syms: &mut SymbolTable) -> Lexicon<LogWeight> {
        LexiconBuilder::<LogWeight>::new(word_syms)
            .unwrap()
            .compile(Cursor::new(TOY_DICT))
            .unwrap()
    }

    #[test]
    fn it_builds_one_chain_per_entry() {
        let mut word_syms = SymbolTable::new();
        let lexicon = toy_lexicon(&mut word_syms);
        // start + (1+1) + (3+1) + (3+1) chain states
        assert_eq!(lexicon.fst.num_states(), 11);
        let start = lexicon.fst.start().unwrap();
        let trs = lexicon.fst.get_trs(start).unwrap();
        assert_eq!(trs.trs().len(), 3);
        // The word rides on the first arc of each chain, nowhere else.
        for tr in trs.trs() {
            assert_ne!(tr.olabel, EPS_LABEL);
        }
    }

    #[test]
    fn it_collects_phone_and_aux_alphabets() {
        let mut word_syms = SymbolTable::new();
        let lexicon = toy_lexicon(&mut word_syms);
        let phones: Vec<&str> = lexicon.phones.iter().map(|p| p.as_str()).collect();
        assert_eq!(phones, vec!["AY", "D", "EH", "R"]);
        let aux: Vec<&str> = lexicon.aux_syms.iter().map(|a| a.as_str()).collect();
        assert_eq!(aux, vec!["#1", "#2"]);
        assert!(lexicon.phone_syms.contains_symbol("AY"));
        assert!(lexicon.phone_syms.contains_symbol("#2"));
        assert!(word_syms.contains_symbol("read"));
    }

    #[test]
    fn duplicate_pronunciations_get_distinct_disambiguators() {
        let dict = "aye AY B\neye AY B\ni AY B\n";
        let mut word_syms = SymbolTable::new();
        let lexicon = LexiconBuilder::<LogWeight>::new(&mut word_syms)
            .unwrap()
            .compile(Cursor::new(dict))
            .unwrap();
        let aux: Vec<&str> = lexicon.aux_syms.iter().map(|a| a.as_str()).collect();
        assert_eq!(aux, vec!["#1", "#2", "#3"]);
        // Each disambiguation symbol sits on exactly one arc.
        for sym in ["#1", "#2", "#3"] {
            let label = lexicon.phone_syms.get_label(sym).unwrap();
            let mut uses = 0;
            for state in lexicon.fst.states_iter() {
                let trs = lexicon.fst.get_trs(state).unwrap();
                uses += trs.trs().iter().filter(|tr| tr.ilabel == label).count();
            }
            assert_eq!(uses, 1, "{} should label exactly one arc", sym);
        }
    }

    #[test]
    fn it_skips_short_lines() {
        let dict = "word-without-phones\n\nok AY\n";
        let mut word_syms = SymbolTable::new();
        let lexicon = LexiconBuilder::<LogWeight>::new(&mut word_syms)
            .unwrap()
            .compile(Cursor::new(dict))
            .unwrap();
        assert!(!word_syms.contains_symbol("word-without-phones"));
        assert_eq!(lexicon.fst.num_states(), 3);
    }

    #[test]
    fn it_reports_missing_files() {
        let mut word_syms = SymbolTable::new();
        let result = LexiconBuilder::<LogWeight>::new(&mut word_syms)
            .unwrap()
            .compile_file(Path::new("no/such/lexicon.dict"));
        assert!(result.is_err());
    }
}
