//! Plain-text symbol table I/O.
//!
//! Tables are written one `symbol<TAB>id` pair per line, in label order,
//! which is the layout downstream decoder tooling expects.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rustfst::prelude::*;

/// Dump a symbol table as `symbol<TAB>id` lines.
pub fn write_symbol_table(symt: &SymbolTable, path: &Path) -> Result<()> {
    let fh = File::create(path)
        .with_context(|| format!("unable to create symbol table {}", path.display()))?;
    let mut writer = BufWriter::new(fh);
    for label in symt.labels() {
        if let Some(sym) = symt.get_symbol(label) {
            writeln!(writer, "{}\t{}", sym, label)?;
        }
    }
    Ok(())
}

/// Dump state keys as `key<TAB>state` lines, in state-id order.
pub fn write_state_keys(keys: &[String], path: &Path) -> Result<()> {
    let fh = File::create(path)
        .with_context(|| format!("unable to create state table {}", path.display()))?;
    let mut writer = BufWriter::new(fh);
    for (state, key) in keys.iter().enumerate() {
        writeln!(writer, "{}\t{}", key, state)?;
    }
    Ok(())
}

/// Read a one-symbol-per-line list, skipping blank lines.
pub fn read_symbol_list(path: &Path) -> Result<BTreeSet<String>> {
    let fh = File::open(path)
        .with_context(|| format!("unable to open symbol list {}", path.display()))?;
    let mut symbols = BTreeSet::new();
    for line in BufReader::new(fh).lines() {
        let line = line?;
        let sym = line.trim();
        if sym.is_empty() {
            continue;
        }
        symbols.insert(sym.to_string());
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_writes_eps_first() {
        let mut symt = SymbolTable::new();
        symt.add_symbol("green");
        symt.add_symbol("eggs");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.syms");
        write_symbol_table(&symt, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["<eps>\t0", "green\t1", "eggs\t2"]);
    }

    #[test]
    fn it_reads_symbol_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phones.txt");
        std::fs::write(&path, "AY\n\nR\nEH\n").unwrap();
        let symbols = read_symbol_list(&path).unwrap();
        let listed: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(listed, vec!["AY", "EH", "R"]);
    }

    #[test]
    fn it_writes_state_keys_in_order() {
        let keys = vec!["<start>".to_string(), "<eps>,A".to_string()];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.ssyms");
        write_state_keys(&keys, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "<start>\t0\n<eps>,A\t1\n");
    }
}
