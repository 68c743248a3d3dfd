//! cascadefst - build speech-recognition decoding cascades as weighted FSTs
//!
//! This crate turns the text resources of a speech recognizer into the
//! composed decoding graph `C ∘ det(L ∘ G)`:
//!
//! - an ARPA back-off n-gram model becomes the grammar transducer `G`
//!   ([`grammarfst`]),
//! - a pronunciation dictionary becomes the lexicon transducer `L`
//!   ([`lexiconfst`]),
//! - a phone inventory becomes the triphone context-dependency transducer
//!   `C` ([`contextfst`]),
//! - [`cascade`] closes, sorts, composes and determinizes the three into a
//!   single machine, persisting every intermediate stage,
//! - [`normalize`] rescales a log-semiring grammar so that each state's
//!   outgoing arcs form a proper probability distribution.
//!
//! Graph storage, composition, determinization and serialization are
//! delegated to [`rustfst`]; this crate owns the construction algorithms
//! and the shared symbol numbering that keeps the three components
//! composable.

/// ARPA line-level parsing
pub mod arpaparse;
/// End-to-end cascade assembly
pub mod cascade;
/// Triphone context-dependency transducers
pub mod contextfst;
/// ARPA language models as back-off grammar transducers
pub mod grammarfst;
/// Pronunciation dictionaries as lexicon transducers
pub mod lexiconfst;
/// Per-state weight normalization in the log semiring
pub mod normalize;
/// Symbol-table text output and symbol-list input
pub mod symtab;

/// Reserved symbols shared by every builder.
///
/// Hoisting these into one value keeps the state keys and labels minted by
/// the grammar, lexicon and context-dependency builders consistent with
/// each other; epsilon itself is fixed by the engine at label 0.
#[derive(Debug, Clone)]
pub struct Vocab {
    /// Epsilon symbol, always label 0
    pub eps: String,
    /// State key of the initial grammar state
    pub start: String,
    /// Sentence-begin token
    pub begin: String,
    /// Sentence-end token
    pub end: String,
}

impl Default for Vocab {
    fn default() -> Self {
        Self {
            eps: "<eps>".to_string(),
            start: "<start>".to_string(),
            begin: "<s>".to_string(),
            end: "</s>".to_string(),
        }
    }
}
