//! Line-level parser for ARPA back-off language models.
//!
//! The ARPA text format interleaves meta-data with n-gram sections:
//!
//! ```text
//! \data\
//! ngram 1=4
//! ngram 2=3
//!
//! \1-grams:
//! -0.6990 green -0.3010
//! ...
//! \end\
//! ```
//!
//! Parsing is a small state machine over line prefixes,
//! `AwaitHeader → Body(k) → Done`: `ngram <k>=<count>` raises the model
//! order, `\data\` is consumed with no effect, `\<k>-grams:` enters the
//! section for order `k`, and `\end\` terminates. Anything else inside a
//! section is tokenized as `<log10-prob> <w_1> .. <w_k> [<backoff>]`.
//! Unrecognized or malformed lines are skipped, never fatal.

/// One n-gram entry as it appears in the model file.
#[derive(Debug, Clone, PartialEq)]
pub struct NGramEntry {
    /// N-gram order `k` of the section the entry was read from
    pub order: usize,
    /// The `k` tokens of the n-gram, most recent word last
    pub words: Vec<String>,
    /// Base-10 log probability
    pub log_prob: f32,
    /// Base-10 log back-off weight, when present
    pub backoff: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    AwaitHeader,
    Body(usize),
    Done,
}

/// Streaming ARPA parser; feed it one line at a time.
#[derive(Debug)]
pub struct ArpaParser {
    section: Section,
    max_order: usize,
}

impl ArpaParser {
    pub fn new() -> Self {
        Self {
            section: Section::AwaitHeader,
            max_order: 0,
        }
    }

    /// Highest order announced by the `ngram <k>=<count>` header lines
    /// seen so far.
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// True once `\end\` has been consumed; later lines are ignored.
    pub fn is_done(&self) -> bool {
        self.section == Section::Done
    }

    /// Consume one line, returning the n-gram entry it carries, if any.
    pub fn feed(&mut self, line: &str) -> Option<NGramEntry> {
        let line = line.trim();
        if self.section == Section::Done || line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix("ngram ") {
            if let Some((order, _count)) = rest.split_once('=') {
                if let Ok(order) = order.trim().parse::<usize>() {
                    self.max_order = self.max_order.max(order);
                }
            }
            return None;
        }
        if let Some(rest) = line.strip_prefix('\\') {
            if rest == "data\\" {
                return None;
            }
            if rest == "end\\" {
                self.section = Section::Done;
                return None;
            }
            if let Some(order) = rest
                .strip_suffix("-grams:")
                .and_then(|k| k.parse::<usize>().ok())
            {
                self.section = Section::Body(order);
            }
            // Unrecognized header lines are skipped.
            return None;
        }
        match self.section {
            Section::Body(order) => Self::parse_entry(line, order),
            _ => None,
        }
    }

    fn parse_entry(line: &str, order: usize) -> Option<NGramEntry> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < order + 1 {
            return None;
        }
        let log_prob: f32 = tokens[0].parse().ok()?;
        let words = tokens[1..=order].iter().map(|w| w.to_string()).collect();
        let backoff = if tokens.len() == order + 2 {
            tokens[order + 1].parse().ok()
        } else {
            None
        };
        Some(NGramEntry {
            order,
            words,
            log_prob,
            backoff,
        })
    }
}

impl Default for ArpaParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOY_ARPA: &str = "\
\\data\\
ngram 1=3
ngram 2=2

\\1-grams:
-0.5227 </s>
-99 <s> -0.5227
-0.6990 green -0.3010

\\2-grams:
-0.3010 <s> green
-0.3010 green </s>

\\end\\
ignored after end
";

    #[test]
    fn it_parses_a_toy_model() {
        let mut parser = ArpaParser::new();
        let entries: Vec<NGramEntry> =
            TOY_ARPA.lines().filter_map(|l| parser.feed(l)).collect();
        assert_eq!(parser.max_order(), 2);
        assert!(parser.is_done());
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].order, 1);
        assert_eq!(entries[0].words, vec!["</s>".to_string()]);
        assert_eq!(entries[0].log_prob, -0.5227);
        assert_eq!(entries[0].backoff, None);
        assert_eq!(entries[2].backoff, Some(-0.3010));
        assert_eq!(entries[3].order, 2);
        assert_eq!(
            entries[3].words,
            vec!["<s>".to_string(), "green".to_string()]
        );
    }

    #[test]
    fn it_skips_malformed_lines() {
        let mut parser = ArpaParser::new();
        parser.feed("\\data\\");
        parser.feed("ngram 1=2");
        parser.feed("\\1-grams:");
        assert_eq!(parser.feed("not-a-number green"), None);
        assert_eq!(parser.feed("-0.5"), None);
        assert!(parser.feed("-0.5 green").is_some());
    }

    #[test]
    fn it_ignores_lines_outside_sections() {
        let mut parser = ArpaParser::new();
        assert_eq!(parser.feed("-0.5 green"), None);
        parser.feed("\\end\\");
        parser.feed("\\1-grams:");
        assert_eq!(parser.feed("-0.5 green"), None);
    }

    #[test]
    fn it_tracks_the_maximum_order() {
        let mut parser = ArpaParser::new();
        parser.feed("ngram 3=17");
        parser.feed("ngram 1=4");
        assert_eq!(parser.max_order(), 3);
    }
}
