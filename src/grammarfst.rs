//! Back-off grammar transducers from ARPA language models.
//!
//! Every n-gram context observed in the model becomes one state, keyed by
//! the comma-joined context string; probability arcs step from a `(k-1)`
//! context to the matching `k` context (or its suffix at the top order),
//! and epsilon back-off arcs fall back from a `k` context to its `(k-1)`
//! suffix. The word symbol table is owned by the caller so the lexicon
//! builder can later mint its output labels from the same numbering.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use rustfst::fst_impls::VectorFst;
use rustfst::prelude::*;

use crate::arpaparse::{ArpaParser, NGramEntry};
use crate::Vocab;

/// Build a grammar transducer from an ARPA model, generic over the weight
/// semiring (log or tropical; costs are the same, only `Plus` differs).
pub struct GrammarBuilder<'a, W: Semiring<Type = f32>> {
    vocab: Vocab,
    /// Shared word alphabet, used for input and output labels alike
    syms: &'a mut SymbolTable,
    /// Lazily created state per unique context key
    states: HashMap<String, StateId>,
    fst: VectorFst<W>,
}

/// A compiled grammar transducer.
pub struct Grammar<W: Semiring<Type = f32>> {
    pub fst: VectorFst<W>,
    /// Context key of every state, indexed by state id
    pub state_keys: Vec<String>,
    /// Model order announced by the ARPA header
    pub max_order: usize,
}

impl<W: Semiring<Type = f32>> Grammar<W> {
    /// Look up the state holding a given context key.
    pub fn state(&self, key: &str) -> Option<StateId> {
        self.state_keys
            .iter()
            .position(|k| k == key)
            .map(|s| s as StateId)
    }
}

impl<'a, W: Semiring<Type = f32>> GrammarBuilder<'a, W> {
    pub fn new(syms: &'a mut SymbolTable) -> Result<Self> {
        let mut builder = Self {
            vocab: Vocab::default(),
            syms,
            states: HashMap::new(),
            fst: VectorFst::new(),
        };
        let start_key = builder.vocab.start.clone();
        let end_key = builder.vocab.end.clone();
        let start = builder.state(&start_key);
        builder.fst.set_start(start)?;
        let end = builder.state(&end_key);
        builder.fst.set_final(end, W::one())?;
        Ok(builder)
    }

    /// ARPA stores base-10 log probabilities; the semirings carry negative
    /// natural-log costs, so convert with `-ln(10) * value`.
    fn cost(log10_val: f32) -> W {
        W::new(-std::f32::consts::LN_10 * log10_val)
    }

    fn state(&mut self, key: &str) -> StateId {
        if let Some(&state) = self.states.get(key) {
            return state;
        }
        let state = self.fst.add_state();
        self.states.insert(key.to_string(), state);
        state
    }

    fn make_arc(
        &mut self,
        istate: &str,
        ostate: &str,
        isym: &str,
        osym: &str,
        weight: W,
    ) -> Result<()> {
        let src = self.state(istate);
        let dst = self.state(ostate);
        let ilabel = self.syms.add_symbol(isym);
        let olabel = self.syms.add_symbol(osym);
        self.fst.add_tr(src, Tr::new(ilabel, olabel, weight, dst))?;
        Ok(())
    }

    fn add_entry(&mut self, entry: &NGramEntry, max_order: usize) -> Result<()> {
        let k = entry.order;
        let words = &entry.words;
        let prob = Self::cost(entry.log_prob);
        let backoff = entry.backoff.map(Self::cost).unwrap_or_else(W::one);
        let eps = self.vocab.eps.clone();
        let word = words[k - 1].clone();

        // Sentence-end never receives a back-off arc at any order.
        if word == self.vocab.end {
            let context = if k == 1 {
                eps
            } else {
                words[..k - 1].join(",")
            };
            let end = self.vocab.end.clone();
            return self.make_arc(&context, &end, &word, &word, prob);
        }
        if k == 1 {
            if word == self.vocab.begin {
                let begin = self.vocab.begin.clone();
                self.make_arc(&eps, &begin, &eps, &eps, backoff)?;
            } else {
                self.make_arc(&word, &eps, &eps, &eps, backoff)?;
                self.make_arc(&eps, &word, &word, &word, prob)?;
            }
        } else if k < max_order {
            let full = words.join(",");
            let suffix = words[1..].join(",");
            let history = words[..k - 1].join(",");
            self.make_arc(&full, &suffix, &eps, &eps, backoff)?;
            self.make_arc(&history, &full, &word, &word, prob)?;
        } else {
            // At the top order there is no longer context to step into;
            // the arc lands on the suffix context directly.
            let history = words[..k - 1].join(",");
            let suffix = words[1..].join(",");
            self.make_arc(&history, &suffix, &word, &word, prob)?;
        }
        Ok(())
    }

    /// Compile the ARPA model into a grammar transducer, consuming the
    /// builder. The word symbol table lent at construction time grows as a
    /// side effect.
    pub fn compile<R: BufRead>(mut self, reader: R) -> Result<Grammar<W>> {
        // Every sentence starts by consuming the sentence-begin token.
        let start = self.vocab.start.clone();
        let begin = self.vocab.begin.clone();
        self.make_arc(&start, &begin, &begin, &begin, W::one())?;

        let mut parser = ArpaParser::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(entry) = parser.feed(&line) {
                self.add_entry(&entry, parser.max_order())?;
            }
            if parser.is_done() {
                break;
            }
        }

        let mut state_keys = vec![String::new(); self.fst.num_states()];
        for (key, state) in self.states {
            state_keys[state as usize] = key;
        }
        Ok(Grammar {
            fst: self.fst,
            state_keys,
            max_order: parser.max_order(),
        })
    }

    /// Compile from a file path; an unreadable file aborts construction.
    pub fn compile_file(self, path: &Path) -> Result<Grammar<W>> {
        let fh = File::open(path)
            .with_context(|| format!("unable to open ARPA model {}", path.display()))?;
        self.compile(BufReader::new(fh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TOY_ARPA: &str = "\
\\data\\
ngram 1=4
ngram 2=4

\\1-grams:
-0.5227 </s>
-99 <s> -0.5227
-0.6990 green -0.3010
-0.6990 eggs -0.3010

\\2-grams:
-0.3010 <s> green
-0.1761 green eggs
-0.3010 eggs </s>
-0.4771 green </s>

\\end\\
";

    fn toy_grammar(syms: &mut SymbolTable) -> Grammar<LogWeight> {
        GrammarBuilder::<LogWeight>::new(syms)
            .unwrap()
            .compile(Cursor::new(TOY_ARPA))
            .unwrap()
    }

    #[test]
    fn it_creates_one_state_per_context() {
        let mut syms = SymbolTable::new();
        let grammar = toy_grammar(&mut syms);
        // <start>, </s>, <eps>, <s>, green, eggs
        assert_eq!(grammar.fst.num_states(), 6);
        assert_eq!(grammar.max_order, 2);
        for key in ["<start>", "</s>", "<eps>", "<s>", "green", "eggs"] {
            assert!(grammar.state(key).is_some(), "missing context {}", key);
        }
    }

    #[test]
    fn it_reuses_the_shared_symbol_table() {
        let mut syms = SymbolTable::new();
        syms.add_symbol("pre-seeded");
        let _grammar = toy_grammar(&mut syms);
        assert_eq!(syms.get_label("pre-seeded"), Some(1));
        assert!(syms.contains_symbol("green"));
        assert!(syms.contains_symbol("</s>"));
        assert_eq!(syms.get_label("<eps>"), Some(0));
    }

    #[test]
    fn it_weights_probability_arcs_in_natural_log() {
        let mut syms = SymbolTable::new();
        let grammar = toy_grammar(&mut syms);
        let eps_ctx = grammar.state("<eps>").unwrap();
        let green = syms.get_label("green").unwrap();
        let trs = grammar.fst.get_trs(eps_ctx).unwrap();
        let tr = trs
            .trs()
            .iter()
            .find(|tr| tr.ilabel == green)
            .expect("no unigram arc for green");
        let expected = 0.6990 * std::f32::consts::LN_10;
        assert!((tr.weight.value() - expected).abs() < 1e-4);
        assert_eq!(tr.nextstate, grammar.state("green").unwrap());
    }

    #[test]
    fn it_defaults_missing_backoffs_to_one() {
        let arpa = "\\data\\\nngram 1=1\n\n\\1-grams:\n-0.3010 green\n\n\\end\\\n";
        let mut syms = SymbolTable::new();
        let grammar = GrammarBuilder::<LogWeight>::new(&mut syms)
            .unwrap()
            .compile(Cursor::new(arpa))
            .unwrap();
        let word_ctx = grammar.state("green").unwrap();
        let trs = grammar.fst.get_trs(word_ctx).unwrap();
        let backoff = trs
            .trs()
            .iter()
            .find(|tr| tr.ilabel == EPS_LABEL)
            .expect("no back-off arc");
        assert_eq!(backoff.weight, LogWeight::one());
        assert_eq!(backoff.nextstate, grammar.state("<eps>").unwrap());
    }

    #[test]
    fn it_emits_no_backoff_for_sentence_end() {
        let mut syms = SymbolTable::new();
        let grammar = toy_grammar(&mut syms);
        let end = grammar.state("</s>").unwrap();
        let trs = grammar.fst.get_trs(end).unwrap();
        assert!(trs.trs().is_empty());
        assert!(grammar.fst.is_final(end).unwrap());
    }

    #[test]
    fn it_routes_top_order_arcs_to_the_suffix_context() {
        let mut syms = SymbolTable::new();
        let grammar = toy_grammar(&mut syms);
        let begin = grammar.state("<s>").unwrap();
        let green = syms.get_label("green").unwrap();
        let trs = grammar.fst.get_trs(begin).unwrap();
        let tr = trs
            .trs()
            .iter()
            .find(|tr| tr.ilabel == green)
            .expect("no bigram arc for <s> green");
        // At max order the target is the 1-context "green", not "<s>,green".
        assert_eq!(tr.nextstate, grammar.state("green").unwrap());
        assert!(grammar.state("<s>,green").is_none());
    }

    #[test]
    fn it_reports_missing_files() {
        let mut syms = SymbolTable::new();
        let result = GrammarBuilder::<LogWeight>::new(&mut syms)
            .unwrap()
            .compile_file(Path::new("no/such/model.arpa"));
        assert!(result.is_err());
    }
}
