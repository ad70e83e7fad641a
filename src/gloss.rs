//! Meaning-and-sound glosses for single ideographs
//!
//! A dictionary entry lists one or more `"meaning sound"` candidates separated
//! by commas, most common reading first, e.g. `"즐거울 락, 노래 악, 좋아할 요"`.
//! The resolver picks the candidate whose sound matches a reading hint, treating
//! the readings of one [`SOUND_FAMILIES`] entry as interchangeable.

use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

/// Readings that alternate under the initial-sound rule or vowel shifts
pub const SOUND_FAMILIES: &[&[&str]] = &[
    &["불", "부"],
    &["락", "낙", "악", "요"],
    &["륙", "육"],
    &["례", "예"],
];

/// Whether two readings are equal or belong to the same sound family
pub fn sounds_match(candidate: &str, preferred: &str) -> bool {
    candidate == preferred
        || SOUND_FAMILIES
            .iter()
            .any(|family| family.contains(&candidate) && family.contains(&preferred))
}

/// Source of raw dictionary entries
pub trait GlossSource {
    /// Comma-separated candidate list for `character`, if known
    fn lookup(&self, character: &str) -> Option<String>;
}

/// In-memory dictionary keyed by character
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MapGlossSource {
    entries: HashMap<String, String>,
}

impl MapGlossSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object mapping characters to candidate lists
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let source: Self = serde_json::from_str(&data)?;
        debug!(
            "Loaded {} dictionary entries from {}",
            source.entries.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    /// Add an entry
    pub fn with_entry<K, V>(mut self, character: K, glosses: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.insert(character.into(), glosses.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GlossSource for MapGlossSource {
    fn lookup(&self, character: &str) -> Option<String> {
        self.entries.get(character).cloned()
    }
}

impl<S: GlossSource + ?Sized> GlossSource for &S {
    fn lookup(&self, character: &str) -> Option<String> {
        (**self).lookup(character)
    }
}

/// Resolves the gloss to print under a character.
///
/// User overrides always win. Dictionary entries are memoized per character.
pub struct GlossResolver<S> {
    source: S,
    overrides: HashMap<String, String>,
    cache: HashMap<String, Option<String>>,
}

impl<S: GlossSource> GlossResolver<S> {
    /// Create a resolver over a dictionary with no overrides
    pub fn new(source: S) -> Self {
        Self {
            source,
            overrides: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Add or replace a user override for `character`
    pub fn add_override<K: Into<String>, V: Into<String>>(&mut self, character: K, gloss: V) {
        let character = character.into();
        let gloss = gloss.into();
        trace!("Override for {}: {}", character, gloss);
        self.overrides.insert(character, gloss);
    }

    pub fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    /// Merge overrides persisted as a JSON object into the table
    pub fn load_overrides<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let loaded: HashMap<String, String> = serde_json::from_str(&data)?;
        let count = loaded.len();
        self.overrides.extend(loaded);
        debug!(
            "Loaded {} gloss overrides from {}",
            count,
            path.as_ref().display()
        );
        Ok(count)
    }

    /// Persist the override table as a JSON object
    pub fn save_overrides<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let sorted: std::collections::BTreeMap<_, _> = self.overrides.iter().collect();
        let data = serde_json::to_string_pretty(&sorted)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    /// Gloss for a single character, or an empty string when unknown.
    ///
    /// With a `preferred_sound`, the first candidate whose sound matches it
    /// (directly or through a sound family) is chosen; otherwise the first
    /// candidate.
    pub fn resolve(&mut self, character: &str, preferred_sound: Option<&str>) -> String {
        let mut chars = character.chars();
        if chars.next().is_none() || chars.next().is_some() {
            return String::new();
        }

        let normalized: String = character.nfc().collect();

        if let Some(gloss) = self
            .overrides
            .get(character)
            .or_else(|| self.overrides.get(&normalized))
        {
            trace!("Override gloss for {}: {}", character, gloss);
            return gloss.clone();
        }

        let Some(entry) = self.dictionary_entry(character, &normalized) else {
            trace!("No gloss for {}", character);
            return String::new();
        };

        let gloss = select_candidate(&entry, preferred_sound).to_string();
        trace!(
            "Gloss for {} (hint {:?}): {}",
            character, preferred_sound, gloss
        );
        gloss
    }

    fn dictionary_entry(&mut self, raw: &str, normalized: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(raw) {
            return cached.clone();
        }
        let entry = self
            .source
            .lookup(normalized)
            .or_else(|| self.source.lookup(raw))
            .filter(|entry| !entry.trim().is_empty());
        self.cache.insert(raw.to_string(), entry.clone());
        entry
    }
}

/// Pick a candidate from a comma-separated entry.
///
/// A candidate whose sound equals the hint wins over one that only shares its
/// sound family; with neither, the first candidate is used.
fn select_candidate<'a>(entry: &'a str, preferred_sound: Option<&str>) -> &'a str {
    let candidates: Vec<(&str, Option<&str>)> = entry
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| (c, c.split_whitespace().last()))
        .collect();
    let Some(&(first, _)) = candidates.first() else {
        return "";
    };

    let Some(preferred) = preferred_sound else {
        return first;
    };

    let exact = candidates
        .iter()
        .find(|(_, sound)| *sound == Some(preferred));
    let family = || {
        candidates
            .iter()
            .find(|(_, sound)| sound.is_some_and(|sound| sounds_match(sound, preferred)))
    };
    exact
        .or_else(family)
        .map_or(first, |&(candidate, _)| candidate)
}

impl<S> std::fmt::Debug for GlossResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlossResolver")
            .field("overrides", &self.overrides.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// U+F914, a compatibility ideograph that normalizes to U+6A02
    const COMPAT_LE: &str = "\u{F914}";
    const CANONICAL_LE: &str = "\u{6A02}";

    fn dictionary() -> MapGlossSource {
        MapGlossSource::new()
            .with_entry(CANONICAL_LE, "즐거울 락, 노래 악, 좋아할 요")
            .with_entry("不", "아닐 불, 아닐 부")
            .with_entry("學", "배울 학")
    }

    #[test]
    fn test_first_candidate_without_hint() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve(CANONICAL_LE, None), "즐거울 락");
    }

    #[test]
    fn test_hint_selects_literal_sound() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("악")), "노래 악");
        assert_eq!(resolver.resolve("不", Some("부")), "아닐 부");
    }

    #[test]
    fn test_literal_sound_beats_earlier_family_member() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("악")), "노래 악");
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("요")), "좋아할 요");
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("락")), "즐거울 락");
        assert_eq!(resolver.resolve("不", Some("부")), "아닐 부");
        assert_eq!(resolver.resolve("不", Some("불")), "아닐 불");

        let mut resolver =
            GlossResolver::new(MapGlossSource::new().with_entry("六", "여섯 륙, 여섯 육"));
        assert_eq!(resolver.resolve("六", Some("육")), "여섯 육");
    }

    #[test]
    fn test_hint_matches_through_sound_family() {
        let mut resolver = GlossResolver::new(dictionary());
        // 락 comes first and shares 낙's family
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("낙")), "즐거울 락");

        let mut resolver = GlossResolver::new(
            MapGlossSource::new().with_entry(CANONICAL_LE, "노래 악, 좋아할 요"),
        );
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("낙")), "노래 악");
    }

    #[test]
    fn test_unmatched_hint_falls_back_to_first() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve("學", Some("교")), "배울 학");
    }

    #[test]
    fn test_compatibility_ideograph_uses_canonical_entry() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve(COMPAT_LE, Some("요")), "좋아할 요");
    }

    #[test]
    fn test_override_wins_for_raw_and_normalized_forms() {
        let mut resolver = GlossResolver::new(dictionary());
        resolver.add_override(CANONICAL_LE, "즐길 락");
        assert_eq!(resolver.resolve(CANONICAL_LE, Some("악")), "즐길 락");
        assert_eq!(resolver.resolve(COMPAT_LE, None), "즐길 락");

        let mut resolver = GlossResolver::new(dictionary());
        resolver.add_override(COMPAT_LE, "풍류 악");
        assert_eq!(resolver.resolve(COMPAT_LE, Some("락")), "풍류 악");
        // The canonical form does not fold back to the compatibility key
        assert_eq!(resolver.resolve(CANONICAL_LE, None), "즐거울 락");
    }

    #[test]
    fn test_unknown_and_multi_character_input_yield_empty() {
        let mut resolver = GlossResolver::new(dictionary());
        assert_eq!(resolver.resolve("甲", None), "");
        assert_eq!(resolver.resolve("", None), "");
        assert_eq!(resolver.resolve("學學", None), "");
    }

    #[test]
    fn test_sound_families() {
        assert!(sounds_match("악", "낙"));
        assert!(sounds_match("요", "락"));
        assert!(sounds_match("예", "례"));
        assert!(!sounds_match("불", "락"));
        assert!(!sounds_match("설", "열"));
    }

    struct CountingSource {
        inner: MapGlossSource,
        calls: Cell<usize>,
    }

    impl GlossSource for CountingSource {
        fn lookup(&self, character: &str) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            self.inner.lookup(character)
        }
    }

    #[test]
    fn test_dictionary_lookups_are_memoized() {
        let source = CountingSource {
            inner: dictionary(),
            calls: Cell::new(0),
        };
        let mut resolver = GlossResolver::new(&source);
        for _ in 0..3 {
            assert_eq!(resolver.resolve("學", None), "배울 학");
            assert_eq!(resolver.resolve("甲", None), "");
        }
        // One normalized lookup for 學; normalized then raw for the miss
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn test_overrides_persist_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");

        let mut resolver = GlossResolver::new(dictionary());
        resolver.add_override("學", "공부할 학");
        resolver.save_overrides(&path).unwrap();

        let mut restored = GlossResolver::new(MapGlossSource::new());
        assert_eq!(restored.load_overrides(&path).unwrap(), 1);
        assert_eq!(restored.resolve("學", None), "공부할 학");
    }

    #[test]
    fn test_dictionary_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glosses.json");
        std::fs::write(&path, r#"{ "仁": "어질 인", "學": "배울 학" }"#).unwrap();

        let source = MapGlossSource::from_json_file(&path).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.lookup("仁").as_deref(), Some("어질 인"));
    }
}
