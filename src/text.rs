//! Text cleaning and symbol encoding for the synthesizer.
//!
//! The synthesizer graph consumes a sequence of symbol ids terminated by
//! an end-of-sequence id. The symbol table is stored in the synthesizer's
//! `hparams.json`; [`SymbolTable::default`] is the basic English set.

use std::collections::HashMap;

use crate::{Error, Result};

pub const PAD: char = '_';
pub const EOS: char = '~';
const DEFAULT_CHARACTERS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!'\"(),-.:;? ";

/// Lowercase, drop non-ASCII and collapse runs of whitespace.
pub fn basic_clean(text: &str) -> String {
    let lowered: String = text
        .chars()
        .filter(char::is_ascii)
        .flat_map(char::to_lowercase)
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps characters to the integer ids the synthesizer was trained on.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    ids: HashMap<char, i64>,
    eos: i64,
}

impl SymbolTable {
    /// Build a table from the ordered symbol list. Position = id.
    ///
    /// The list must contain the pad and end-of-sequence markers.
    pub fn new(symbols: &str) -> Result<Self> {
        let ids: HashMap<char, i64> = symbols
            .chars()
            .enumerate()
            .map(|(i, c)| (c, i as i64))
            .collect();
        if !ids.contains_key(&PAD) {
            return Err(Error::Config(format!("symbol table has no pad symbol '{PAD}'")));
        }
        let eos = *ids
            .get(&EOS)
            .ok_or_else(|| Error::Config(format!("symbol table has no eos symbol '{EOS}'")))?;
        Ok(Self { ids, eos })
    }

    /// Encode cleaned text, skipping unknown characters and appending EOS.
    pub fn encode(&self, text: &str) -> Vec<i64> {
        let mut sequence: Vec<i64> = basic_clean(text)
            .chars()
            .filter(|c| *c != PAD && *c != EOS)
            .filter_map(|c| self.ids.get(&c).copied())
            .collect();
        sequence.push(self.eos);
        sequence
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The default symbol list: pad, eos, then the basic character set.
pub fn default_symbols() -> String {
    let mut symbols = String::with_capacity(DEFAULT_CHARACTERS.len() + 2);
    symbols.push(PAD);
    symbols.push(EOS);
    symbols.push_str(DEFAULT_CHARACTERS);
    symbols
}

impl Default for SymbolTable {
    fn default() -> Self {
        let ids: HashMap<char, i64> = default_symbols()
            .chars()
            .enumerate()
            .map(|(i, c)| (c, i as i64))
            .collect();
        // default_symbols() puts EOS right after PAD
        Self { ids, eos: 1 }
    }
}
