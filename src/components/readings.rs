//! Candidate readings for tokens, proposed before the constraint grammar prunes them.

use indexmap::IndexMap;
use log::{debug, info};

use crate::{
    components::{
        gazetteer::{ContractionTable, GazetteerSet, ABBREVIATIONS, ACRONYMS},
        lexicon::{LexiconEntry, LexiconStore},
        mutation::MutationResolver,
        taxonomy::{TagTaxonomy, PROPER_NOUN_FEMININE, PROPER_NOUN_MASCULINE},
        tokenizer::PUNCTUATION,
    },
    types::{Mutation, Reading, TaggedDocument},
    utils,
};

const VOWELS: &str = "aâeêiîoôuûwŵyŷ";
const CONSONANTS: &str = "bcdfghjlmnprst";
/// Endings an apostrophe may stand for, e. g. `gweld'` for `gweld` + `r`.
const ELIDED_ENDINGS: [&str; 3] = ["f", "r", "l"];

/// Where the candidate readings of a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingSource {
    Lexicon,
    ProperNounGuess,
    Contraction,
    ElidedEnding,
    AddedEnding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenReadings {
    /// The tag follows from the form alone: punctuation, symbols, digits, acronyms and abbreviations.
    Definite(Reading),
    Candidates {
        readings: Vec<Reading>,
        source: ReadingSource,
    },
    Unknown,
}

impl TokenReadings {
    pub fn readings(&self) -> &[Reading] {
        match self {
            TokenReadings::Definite(reading) => std::slice::from_ref(reading),
            TokenReadings::Candidates { readings, .. } => readings,
            TokenReadings::Unknown => &[],
        }
    }
}

/// Counts of how tokens got their readings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingsStatistics {
    pub with_readings: usize,
    pub guessed_proper_nouns: usize,
    pub without_readings: usize,
}

impl ReadingsStatistics {
    fn add(&mut self, readings: &TokenReadings) {
        match readings {
            TokenReadings::Unknown => self.without_readings += 1,
            TokenReadings::Candidates {
                source: ReadingSource::ProperNounGuess,
                ..
            } => {
                self.with_readings += 1;
                self.guessed_proper_nouns += 1;
            }
            _ => self.with_readings += 1,
        }
    }
}

fn is_definite_symbol(c: char) -> bool {
    !(c.is_whitespace() || c == '^' || c == '-' || c == '—' || PUNCTUATION.contains(c))
        && !utils::is_word_char(c)
}

fn is_digits(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// The tag of tokens which can be tagged without lookup.
pub fn definite_tag(token: &str, gazetteers: &GazetteerSet) -> Option<&'static str> {
    let first = token.chars().next()?;

    if is_digits(token) {
        return Some("Gwdig");
    }
    if is_definite_symbol(first) {
        return Some("Gwsym");
    }

    let punctuation = match (first, token) {
        ('.', _) | ('!', _) | ('?', _) => Some("Atdt"),
        (',', _) | (';', _) | (':', _) | ('—', _) => Some("Atdcan"),
        ('<', _) | ('{', _) | ('[', _) | ('(', _) => Some("Atdchw"),
        ('>', _) | ('}', _) | (']', _) | (')', _) => Some("Atdde"),
        (_, "-") => Some("Atdcys"),
        (_, "'") | (_, "\"") => Some("Atddyf"),
        _ => None,
    };
    if punctuation.is_some() {
        return punctuation;
    }

    if gazetteers.contains(ACRONYMS, token) {
        Some("Gwacr")
    } else if gazetteers.contains(ABBREVIATIONS, &token.to_lowercase()) {
        Some("Gwtalf")
    } else {
        None
    }
}

fn to_reading(surface: &str, entry: &LexiconEntry, mutation: Option<Mutation>) -> Reading {
    Reading::new(surface, entry.pos_enriched.as_str(), entry.lemma.as_str())
        .with_glosses(vec![entry.lemma_en.clone()])
        .with_mutation(mutation)
}

/// Merges readings which only differ in their glosses. The first occurrence keeps its place.
pub fn group_readings(readings: Vec<Reading>) -> Vec<Reading> {
    let mut groups: IndexMap<(String, String, String, Option<Mutation>), Reading> =
        IndexMap::new();

    for reading in readings {
        let key = (
            reading.surface.to_lowercase(),
            reading.rich_tag.clone(),
            reading.lemma.clone(),
            reading.mutation,
        );

        match groups.get_mut(&key) {
            Some(group) => {
                for gloss in reading.glosses {
                    if !group.glosses.contains(&gloss) {
                        group.glosses.push(gloss);
                    }
                }
            }
            None => {
                groups.insert(key, reading);
            }
        }
    }

    groups.into_iter().map(|(_, reading)| reading).collect()
}

/// Proposes readings for tokens from the lexicon, the gazetteers and a few heuristics.
pub struct ReadingsGenerator<'c> {
    lexicon: &'c LexiconStore,
    gazetteers: &'c GazetteerSet,
    contractions: &'c ContractionTable,
    mutations: MutationResolver,
}

impl<'c> ReadingsGenerator<'c> {
    pub fn new(
        lexicon: &'c LexiconStore,
        gazetteers: &'c GazetteerSet,
        contractions: &'c ContractionTable,
    ) -> Self {
        ReadingsGenerator {
            lexicon,
            gazetteers,
            contractions,
            mutations: MutationResolver::new(),
        }
    }

    /// Lexicon readings of the token itself and of every form it may be a mutation of.
    pub fn lookup(&self, token: &str) -> Vec<Reading> {
        let mut readings: Vec<Reading> = self
            .lexicon
            .lookup(token)
            .map(|hit| {
                hit.entries
                    .iter()
                    .map(|entry| to_reading(hit.form, entry, None))
                    .collect()
            })
            .unwrap_or_default();

        for hypothesis in self.mutations.resolve(token) {
            if let Some(entries) = self.lexicon.get(&hypothesis.form) {
                readings.extend(
                    entries
                        .iter()
                        .map(|entry| to_reading(&hypothesis.form, entry, Some(hypothesis.mutation))),
                );
            }
        }

        readings
    }

    /// Lexicon readings of alternative forms, without considering mutations.
    fn lookup_forms<S: AsRef<str>>(&self, forms: &[S]) -> Vec<Reading> {
        forms
            .iter()
            .filter_map(|form| self.lexicon.lookup(form.as_ref()))
            .flat_map(|hit| {
                hit.entries
                    .iter()
                    .map(move |entry| to_reading(hit.form, entry, None))
            })
            .collect()
    }

    fn added_endings(token: &str) -> Vec<String> {
        let last = match token.chars().last() {
            Some(c) => c.to_lowercase().next().unwrap_or(c),
            None => return Vec::new(),
        };

        if VOWELS.contains(last) {
            vec![format!("{}f", token)]
        } else if CONSONANTS.contains(last) {
            vec![format!("{}r", token), format!("{}l", token)]
        } else {
            Vec::new()
        }
    }

    /// Candidate readings for one token. The first of these which yields anything wins:
    /// a definite tag, the lexicon (including mutated forms), a proper noun guess for
    /// capitalised tokens, contraction expansion, an elided final consonant and an added
    /// final consonant.
    pub fn generate(&self, token: &str) -> TokenReadings {
        if let Some(tag) = definite_tag(token, self.gazetteers) {
            return TokenReadings::Definite(
                Reading::new(token, tag, token).with_glosses(vec![token.to_string()]),
            );
        }

        let candidates = |readings: Vec<Reading>, source| {
            if readings.is_empty() {
                None
            } else {
                Some(TokenReadings::Candidates {
                    readings: group_readings(readings),
                    source,
                })
            }
        };

        if let Some(readings) = candidates(self.lookup(token), ReadingSource::Lexicon) {
            return readings;
        }

        if utils::starts_uppercase(token) {
            return TokenReadings::Candidates {
                readings: [PROPER_NOUN_MASCULINE, PROPER_NOUN_FEMININE]
                    .iter()
                    .map(|tag| Reading::new(token, *tag, token).with_glosses(vec![token.to_string()]))
                    .collect(),
                source: ReadingSource::ProperNounGuess,
            };
        }

        if let Some(forms) = self.contractions.expansions(token) {
            if let Some(readings) = candidates(self.lookup_forms(forms), ReadingSource::Contraction) {
                return readings;
            }
        }

        if let Some(stem) = token.strip_suffix('\'') {
            let forms: Vec<_> = ELIDED_ENDINGS
                .iter()
                .map(|ending| format!("{}{}", stem, ending))
                .collect();
            if let Some(readings) = candidates(self.lookup_forms(&forms), ReadingSource::ElidedEnding) {
                return readings;
            }
        }

        let forms = ReadingsGenerator::added_endings(token);
        if let Some(readings) = candidates(self.lookup_forms(&forms), ReadingSource::AddedEnding) {
            return readings;
        }

        TokenReadings::Unknown
    }

    /// Readings for every token of the document, in document order.
    pub fn generate_document(&self, document: &TaggedDocument) -> Vec<TokenReadings> {
        let taxonomy = TagTaxonomy::get();
        let mut statistics = ReadingsStatistics::default();

        let readings: Vec<_> = document
            .tokens()
            .map(|token| {
                let readings = self.generate(&token.text);
                statistics.add(&readings);

                for reading in readings.readings() {
                    if !taxonomy.contains(&reading.rich_tag) {
                        debug!(
                            "Tag {} of '{}' is not part of the tag set.",
                            reading.rich_tag, token.text
                        );
                    }
                }

                readings
            })
            .collect();

        info!(
            "From {} tokens: {} were given readings, {} without readings were assumed to be proper nouns, {} are without readings.",
            readings.len(),
            statistics.with_readings,
            statistics.guessed_proper_nouns,
            statistics.without_readings
        );
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gazetteer::ContractionKind;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref LEXICON: LexiconStore = {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("lexicon.tsv");
            std::fs::write(
                &path,
                "coeden\tcoeden\ttree\tE\tEbu\n\
                 yr\tyr\tthe\tYFB\tYFB\n\
                 car\tcar\tcar\tE\tEgu\n\
                 car\tcar\tauto\tE\tEgu\n\
                 caru\tcaru\tlove\tB\tBe\n\
                 gweled\tgweled\tsee\tB\tBe\n\
                 tref\ttref\ttown\tE\tEbu\n",
            )
            .unwrap();
            LexiconStore::from_path(&path).unwrap()
        };
        static ref GAZETTEERS: GazetteerSet = {
            let mut gazetteers = GazetteerSet::default();
            gazetteers.extend(ACRONYMS, vec!["BBC"]);
            gazetteers.extend(ABBREVIATIONS, vec!["e.e."]);
            gazetteers
        };
        static ref CONTRACTIONS: ContractionTable = {
            let mut contractions = ContractionTable::default();
            contractions.insert("'r", ContractionKind::Contraction, vec!["yr".into()]);
            contractions
        };
    }

    fn generator() -> ReadingsGenerator<'static> {
        ReadingsGenerator::new(&LEXICON, &GAZETTEERS, &CONTRACTIONS)
    }

    #[test]
    fn digits_are_definite() {
        match generator().generate("123") {
            TokenReadings::Definite(reading) => {
                assert_eq!(reading.rich_tag, "Gwdig");
                assert_eq!(reading.lemma, "123");
            }
            other => panic!("unexpected readings {:?}", other),
        }
    }

    #[test]
    fn definite_tags() {
        let tag = |x| definite_tag(x, &GAZETTEERS);
        assert_eq!(tag("."), Some("Atdt"));
        assert_eq!(tag("..."), Some("Atdt"));
        assert_eq!(tag(","), Some("Atdcan"));
        assert_eq!(tag("—"), Some("Atdcan"));
        assert_eq!(tag("("), Some("Atdchw"));
        assert_eq!(tag("]"), Some("Atdde"));
        assert_eq!(tag("-"), Some("Atdcys"));
        assert_eq!(tag("'"), Some("Atddyf"));
        assert_eq!(tag("£"), Some("Gwsym"));
        assert_eq!(tag("-5"), Some("Gwdig"));
        assert_eq!(tag("BBC"), Some("Gwacr"));
        assert_eq!(tag("E.e."), Some("Gwtalf"));
        assert_eq!(tag("'r"), None);
        assert_eq!(tag("coeden"), None);
    }

    #[test]
    fn finds_mutated_forms() {
        let readings = generator().generate("choeden");
        let reading = &readings.readings()[0];
        assert_eq!(reading.lemma, "coeden");
        assert_eq!(reading.surface, "coeden");
        assert_eq!(reading.mutation, Some(Mutation::Aspirate));
        assert!(matches!(
            readings,
            TokenReadings::Candidates {
                source: ReadingSource::Lexicon,
                ..
            }
        ));
    }

    #[test]
    fn merges_glosses_of_identical_readings() {
        let readings = generator().generate("car");
        let car: Vec<_> = readings
            .readings()
            .iter()
            .filter(|x| x.mutation.is_none())
            .collect();

        assert_eq!(car.len(), 1);
        assert_eq!(car[0].glosses, vec!["car", "auto"]);
    }

    #[test]
    fn guesses_proper_nouns() {
        let readings = generator().generate("Llanddewi");
        let tags: Vec<_> = readings.readings().iter().map(|x| x.rich_tag.as_str()).collect();
        assert_eq!(tags, vec!["Epg", "Epb"]);
    }

    #[test]
    fn expands_contractions() {
        let readings = generator().generate("'r");
        assert_eq!(readings.readings()[0].lemma, "yr");
        assert!(matches!(
            readings,
            TokenReadings::Candidates {
                source: ReadingSource::Contraction,
                ..
            }
        ));
    }

    #[test]
    fn restores_elided_and_added_endings() {
        let readings = generator().generate("gweled'");
        assert!(readings.readings().is_empty());

        let readings = generator().generate("ca'");
        assert_eq!(readings.readings()[0].lemma, "car");

        let readings = generator().generate("cyd");
        assert_eq!(readings, TokenReadings::Unknown);
    }

    #[test]
    fn groups_by_key_regardless_of_order() {
        let readings = vec![
            Reading::new("car", "Egu", "car").with_glosses(vec!["car".into()]),
            Reading::new("car", "Be", "caru").with_glosses(vec!["love".into()]),
            Reading::new("Car", "Egu", "car").with_glosses(vec!["auto".into()]),
        ];

        let grouped = group_readings(readings);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].glosses, vec!["car", "auto"]);
    }
}
