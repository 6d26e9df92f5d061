//! Deck list loader
//!
//! Plain text, one entry per line: `4 Lightning Bolt`, `4x Lightning Bolt`
//! or `4 Lightning Bolt|M10`. Lines starting with `#` or `//` are comments.
//! A `[Sideboard]` header (or a bare `Sideboard` line) starts the sideboard;
//! other `[...]` headers and `key=value` metadata lines are ignored.

use crate::loader::CardDatabase;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub struct DeckLoader;

impl DeckLoader {
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<DeckList> {
        let mut deck = DeckList::default();
        let mut in_sideboard = false;

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                in_sideboard = header.eq_ignore_ascii_case("sideboard");
                continue;
            }
            if line.eq_ignore_ascii_case("sideboard") || line.eq_ignore_ascii_case("sideboard:") {
                in_sideboard = true;
                continue;
            }
            if line.contains('=') {
                continue;
            }

            let entry = Self::parse_entry(line)
                .ok_or_else(|| MtgError::InvalidDeckFormat(format!("line {}: {line:?}", line_no + 1)))?;
            if in_sideboard {
                deck.sideboard.push(entry);
            } else {
                deck.main_deck.push(entry);
            }
        }

        if deck.main_deck.is_empty() {
            return Err(MtgError::InvalidDeckFormat("empty deck".to_string()));
        }
        Ok(deck)
    }

    fn parse_entry(line: &str) -> Option<DeckEntry> {
        let (count, rest) = line.split_once(char::is_whitespace)?;
        let count: u8 = count.trim_end_matches(['x', 'X']).parse().ok()?;
        let name = rest.split_once('|').map_or(rest, |(name, _set)| name).trim();
        if count == 0 || name.is_empty() {
            return None;
        }
        Some(DeckEntry::new(name, count))
    }
}

/// A card name and how many copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card_name: String,
    pub count: u8,
}

impl DeckEntry {
    pub fn new(card_name: impl Into<String>, count: u8) -> Self {
        DeckEntry {
            card_name: card_name.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub main_deck: Vec<DeckEntry>,
    pub sideboard: Vec<DeckEntry>,
}

impl DeckList {
    pub fn from_entries(entries: &[(&str, u8)]) -> Self {
        DeckList {
            main_deck: entries.iter().map(|&(name, count)| DeckEntry::new(name, count)).collect(),
            sideboard: Vec::new(),
        }
    }

    /// Total cards in main deck
    pub fn total_cards(&self) -> usize {
        self.main_deck.iter().map(|e| e.count as usize).sum()
    }

    pub fn sideboard_size(&self) -> usize {
        self.sideboard.iter().map(|e| e.count as usize).sum()
    }

    /// Every main deck card must exist in `db`
    pub fn validate(&self, db: &CardDatabase) -> Result<()> {
        for entry in &self.main_deck {
            db.get_or_err(&entry.card_name)?;
        }
        Ok(())
    }
}
