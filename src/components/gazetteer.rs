//! Closed word lists: gazetteers (names, places, acronyms, abbreviations) and the table of known
//! contractions and prefixes.

use fs_err as fs;
use indexmap::{IndexMap, IndexSet};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::BufReader,
    path::Path,
};

use crate::{
    components::taxonomy::{PROPER_NOUN, PROPER_NOUN_FEMININE, PROPER_NOUN_MASCULINE},
    utils, Error,
};

pub const ACRONYMS: &str = "acronyms";
pub const ABBREVIATIONS: &str = "abbreviations";
pub const GIVEN_NAMES_MASCULINE: &str = "givennames_m";
pub const GIVEN_NAMES_FEMININE: &str = "givennames_f";
pub const SURNAMES: &str = "surnames";
pub const PLACES: &str = "places";

/// Named sets of terms. The category of a gazetteer file is its extension,
/// e. g. `cy.abbreviations` holds abbreviations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GazetteerSet {
    sets: HashMap<String, IndexSet<String>>,
}

impl GazetteerSet {
    /// Loads every file in `dir` as a gazetteer. `.json` files are skipped, they hold other tables.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let mut paths: Vec<_> = fs::read_dir(dir.as_ref())?
            .map(|entry| entry.map(|x| x.path()))
            .collect::<Result<_, _>>()?;
        // directory order is platform dependent
        paths.sort();

        let mut gazetteers = GazetteerSet::default();

        for path in paths {
            if !path.is_file() {
                continue;
            }

            let category = match path.extension().and_then(|x| x.to_str()) {
                Some("json") | None => continue,
                Some(ext) => ext.to_string(),
            };

            let text = fs::read_to_string(&path)?;
            gazetteers.extend(&category, text.lines());
        }

        for category in &[ACRONYMS, ABBREVIATIONS] {
            if !gazetteers.sets.contains_key(*category) {
                warn!("No '{}' gazetteer found in {}.", category, dir.as_ref().display());
            }
        }

        info!(
            "Loaded {} gazetteers with {} terms.",
            gazetteers.sets.len(),
            gazetteers.sets.values().map(|x| x.len()).sum::<usize>()
        );
        Ok(gazetteers)
    }

    /// Adds terms to a category, creating it if needed. Empty lines are ignored.
    pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, category: &str, terms: I) {
        let set = self
            .sets
            .entry(category.to_string())
            .or_insert_with(IndexSet::new);

        set.extend(
            terms
                .into_iter()
                .map(|x| x.trim_end_matches('\r'))
                .filter(|x| !x.is_empty())
                .map(ToOwned::to_owned),
        );
    }

    pub fn contains(&self, category: &str, term: &str) -> bool {
        self.sets
            .get(category)
            .map_or(false, |set| set.contains(term))
    }

    pub fn terms(&self, category: &str) -> impl Iterator<Item = &str> {
        self.sets
            .get(category)
            .into_iter()
            .flat_map(|set| set.iter().map(|x| x.as_str()))
    }

    /// One negative lookbehind per term of the category, e. g. `(?<!Dr\.)(?<!Mr\.)`.
    /// Prepended to a boundary pattern, it keeps the terms from being split.
    pub fn exclusion_pattern(&self, category: &str) -> String {
        self.terms(category)
            .map(|term| format!("(?<!{})", utils::escape_regex(term)))
            .collect()
    }

    /// The proper noun tag a name or place gazetteer assigns to `token`, if any.
    /// Names listed for one gender only get the gendered tag.
    pub fn proper_noun_tag(&self, token: &str) -> Option<&'static str> {
        let masculine = self.contains(GIVEN_NAMES_MASCULINE, token);
        let feminine = self.contains(GIVEN_NAMES_FEMININE, token);

        match (masculine, feminine) {
            (true, false) => Some(PROPER_NOUN_MASCULINE),
            (false, true) => Some(PROPER_NOUN_FEMININE),
            (true, true) => Some(PROPER_NOUN),
            (false, false)
                if self.contains(SURNAMES, token) || self.contains(PLACES, token) =>
            {
                Some(PROPER_NOUN)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractionKind {
    Contraction,
    Prefix,
}

/// A contraction with the full forms it stands for, or a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(ContractionKind, Vec<String>)", into = "(ContractionKind, Vec<String>)")]
pub struct ContractionEntry {
    pub kind: ContractionKind,
    pub forms: Vec<String>,
}

impl From<(ContractionKind, Vec<String>)> for ContractionEntry {
    fn from(data: (ContractionKind, Vec<String>)) -> Self {
        ContractionEntry {
            kind: data.0,
            forms: data.1,
        }
    }
}

impl From<ContractionEntry> for (ContractionKind, Vec<String>) {
    fn from(entry: ContractionEntry) -> Self {
        (entry.kind, entry.forms)
    }
}

/// Known contractions (e. g. `'r` for `yr`) and prefixes (e. g. `cyd-`), in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractionTable {
    terms: IndexMap<String, ContractionEntry>,
}

impl ContractionTable {
    /// Reads a JSON object of the form `{"'r": ["contraction", ["yr"]], "cyd-": ["prefix", []]}`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = BufReader::new(fs::File::open(path.as_ref())?);
        let table: ContractionTable = serde_json::from_reader(reader)?;

        info!("Loaded {} contractions and prefixes.", table.terms.len());
        Ok(table)
    }

    pub fn insert<S: Into<String>>(&mut self, term: S, kind: ContractionKind, forms: Vec<String>) {
        self.terms
            .insert(term.into(), ContractionEntry { kind, forms });
    }

    pub fn get(&self, term: &str) -> Option<&ContractionEntry> {
        self.terms.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContractionEntry)> {
        self.terms.iter().map(|(term, entry)| (term.as_str(), entry))
    }

    /// The full forms of `term` if it is a contraction.
    pub fn expansions(&self, term: &str) -> Option<&[String]> {
        self.terms
            .get(term)
            .filter(|entry| entry.kind == ContractionKind::Contraction)
            .map(|entry| entry.forms.as_slice())
    }

    /// Contractions which start or end with an apostrophe.
    pub fn elisions(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(term, entry)| {
                entry.kind == ContractionKind::Contraction
                    && (term.starts_with('\'') || term.ends_with('\''))
            })
            .map(|(term, _)| term)
    }

    pub fn is_prefix(&self, term: &str) -> bool {
        self.terms
            .get(term)
            .map_or(false, |entry| entry.kind == ContractionKind::Prefix)
    }
}
