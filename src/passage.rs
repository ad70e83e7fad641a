//! Passage records and where they come from

use crate::Result;
use crate::text::is_cjk_ideograph;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One passage: its label, source characters, phonetic reading and translation
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub label: String,
    pub characters: Vec<char>,
    pub reading: String,
    pub translation: String,
}

impl Passage {
    /// Create a passage from an already-filtered character sequence
    pub fn new<L, I>(label: L, characters: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = char>,
    {
        Self {
            label: label.into(),
            characters: characters.into_iter().collect(),
            reading: String::new(),
            translation: String::new(),
        }
    }

    /// Create a passage keeping only the CJK ideographs of `original`
    pub fn from_text<L: Into<String>>(label: L, original: &str) -> Self {
        Self::new(label, original.chars().filter(|ch| is_cjk_ideograph(*ch)))
    }

    /// Set the phonetic reading
    pub fn with_reading<S: Into<String>>(mut self, reading: S) -> Self {
        self.reading = reading.into();
        self
    }

    /// Set the translation
    pub fn with_translation<S: Into<String>>(mut self, translation: S) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

/// Produces the passages of one document, in order
pub trait PassageSource {
    fn passages(&self) -> Result<Vec<Passage>>;
}

impl PassageSource for Vec<Passage> {
    fn passages(&self) -> Result<Vec<Passage>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Deserialize)]
struct PassageFile {
    passages: Vec<PassageRecord>,
}

#[derive(Debug, Deserialize)]
struct PassageRecord {
    label: String,
    original: String,
    interpretation: String,
    #[serde(default)]
    reading: String,
}

/// Parse `{ "passages": [...] }` data, dropping records with no ideographs
pub fn parse_passages_json(data: &str) -> Result<Vec<Passage>> {
    let file: PassageFile = serde_json::from_str(data)?;
    let passages: Vec<Passage> = file
        .passages
        .into_iter()
        .filter_map(|record| {
            let passage = Passage::from_text(record.label, &record.original)
                .with_reading(record.reading)
                .with_translation(record.interpretation);
            if passage.is_empty() {
                warn!("Skipping passage '{}': no ideographs", passage.label);
                return None;
            }
            Some(passage)
        })
        .collect();
    debug!("Parsed {} passages", passages.len());
    Ok(passages)
}

/// Passages stored in a JSON data file
#[derive(Debug, Clone)]
pub struct JsonPassageSource {
    path: PathBuf,
}

impl JsonPassageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PassageSource for JsonPassageSource {
    fn passages(&self) -> Result<Vec<Passage>> {
        let data = std::fs::read_to_string(&self.path)?;
        parse_passages_json(&data)
    }
}
