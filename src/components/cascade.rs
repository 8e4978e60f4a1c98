//! Resolves the readings left after the constraint grammar engine to one annotation per token.
//!
//! The first pass handles every token on its own: single readings are taken as they are,
//! readings sharing a tag are collapsed, proper noun gender ambiguity is settled with the
//! gazetteers, and anything else is looked up in the gazetteers and the coverage table.
//! The second pass goes linearly over every sentence and predicts the tags of the remaining
//! tokens from the tags of their already resolved neighbours.

use itertools::Itertools;
use log::{debug, info};

use crate::{
    components::{
        cg::protocol::{Cohort, EngineReading},
        coverage::CoverageTable,
        gazetteer::GazetteerSet,
        tag_sequence::{TagPattern, TagSequenceTable},
        taxonomy::{
            TagTaxonomy, PROPER_NOUN, PROPER_NOUN_BASIC, PROPER_NOUN_FEMININE,
            PROPER_NOUN_MASCULINE, UNKNOWN_TAG,
        },
    },
    types::{Annotation, Mutation, Reading, Resolution, TaggedDocument, Token},
};

/// Separates the candidates of tokens which remain ambiguous.
pub const CANDIDATE_SEPARATOR: &str = " | ";

/// What the engine left of the readings of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Resolved,
    MultiSame,
    AmbiguousGenderPN,
    AmbiguousOther,
    Unknown,
}

impl TokenState {
    pub fn classify(candidates: &[Reading]) -> Self {
        match candidates {
            [] => TokenState::Unknown,
            [_] => TokenState::Resolved,
            [a, b]
                if (a.rich_tag == PROPER_NOUN_MASCULINE && b.rich_tag == PROPER_NOUN_FEMININE)
                    || (a.rich_tag == PROPER_NOUN_FEMININE
                        && b.rich_tag == PROPER_NOUN_MASCULINE) =>
            {
                TokenState::AmbiguousGenderPN
            }
            [first, rest @ ..] if rest.iter().all(|x| x.rich_tag == first.rich_tag) => {
                TokenState::MultiSame
            }
            _ => TokenState::AmbiguousOther,
        }
    }
}

/// Counts of how tokens were resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeStatistics {
    pub engine: usize,
    pub same_tag: usize,
    pub proper_noun_gender: usize,
    pub gazetteer: usize,
    pub coverage: usize,
    pub tag_sequence: usize,
    pub still_ambiguous: usize,
    pub unknown: usize,
}

impl CascadeStatistics {
    fn record(&mut self, resolution: Resolution) {
        let count = match resolution {
            Resolution::Engine => &mut self.engine,
            Resolution::SameTag => &mut self.same_tag,
            Resolution::ProperNounGender => &mut self.proper_noun_gender,
            Resolution::Gazetteer => &mut self.gazetteer,
            Resolution::Coverage => &mut self.coverage,
            Resolution::TagSequence => &mut self.tag_sequence,
            Resolution::StillAmbiguous => &mut self.still_ambiguous,
            Resolution::Unknown => &mut self.unknown,
        };
        *count += 1;
    }

    pub fn disambiguated(&self) -> usize {
        self.engine
            + self.same_tag
            + self.proper_noun_gender
            + self.gazetteer
            + self.coverage
            + self.tag_sequence
    }

    pub fn total(&self) -> usize {
        self.disambiguated() + self.still_ambiguous + self.unknown
    }

    fn log(&self) {
        info!(
            "From {} tokens {} were disambiguated: {} by the engine, {} with readings of the same tag, \
             {} as proper nouns of ambiguous gender, {} by gazetteers, {} by coverage, {} by tag sequences.",
            self.total(),
            self.disambiguated(),
            self.engine,
            self.same_tag,
            self.proper_noun_gender,
            self.gazetteer,
            self.coverage,
            self.tag_sequence
        );
        info!(
            "{} tokens are still ambiguous, {} are unknown.",
            self.still_ambiguous, self.unknown
        );
    }
}

/// The result of disambiguating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutput {
    pub statistics: CascadeStatistics,
    /// Surfaces of the tokens which could not be resolved, in document order.
    pub unknown_words: Vec<String>,
}

fn annotation(
    lemma: &str,
    rich_tag: &str,
    mutation: Option<Mutation>,
    resolution: Resolution,
) -> Annotation {
    Annotation {
        lemma: Some(lemma.to_string()),
        basic_tag: Some(TagTaxonomy::get().basic_tag(rich_tag).to_string()),
        rich_tag: Some(rich_tag.to_string()),
        mutation,
        resolution: Some(resolution),
    }
}

fn from_reading(reading: &Reading, resolution: Resolution) -> Annotation {
    annotation(&reading.lemma, &reading.rich_tag, reading.mutation, resolution)
}

fn candidates(surface: &str, readings: &[EngineReading]) -> Vec<Reading> {
    readings
        .iter()
        .filter(|reading| !reading.unknown)
        .map(|reading| {
            Reading::new(surface, reading.rich_tag(), reading.lemma.as_str())
                .with_glosses(reading.glosses.clone())
                .with_mutation(reading.mutation)
        })
        .collect()
}

/// Applies a predicted tag to the candidates of an unresolved token. A prediction is accepted
/// if it is one of the candidate tags or if exactly one candidate is of the same category.
/// Unknown tokens accept any prediction, with their surface as lemma.
fn apply_prediction(token: &Token, candidates: &[Reading], predicted: &str) -> Option<Annotation> {
    let taxonomy = TagTaxonomy::get();

    if candidates.is_empty() {
        return Some(annotation(
            &token.text,
            predicted,
            None,
            Resolution::TagSequence,
        ));
    }

    if let Some(reading) = candidates.iter().find(|x| x.rich_tag == predicted) {
        return Some(from_reading(reading, Resolution::TagSequence));
    }

    let basic = taxonomy.basic_tag(predicted);
    match candidates
        .iter()
        .filter(|x| taxonomy.basic_tag(&x.rich_tag) == basic)
        .exactly_one()
    {
        Ok(reading) => Some(from_reading(reading, Resolution::TagSequence)),
        Err(_) => None,
    }
}

fn unresolved(token: &Token, candidates: &[Reading]) -> Annotation {
    if candidates.is_empty() {
        return Annotation {
            lemma: Some(token.text.clone()),
            basic_tag: Some(UNKNOWN_TAG.to_string()),
            rich_tag: Some(UNKNOWN_TAG.to_string()),
            mutation: None,
            resolution: Some(Resolution::Unknown),
        };
    }

    let taxonomy = TagTaxonomy::get();
    Annotation {
        lemma: Some(candidates.iter().map(|x| x.lemma.as_str()).join(CANDIDATE_SEPARATOR)),
        basic_tag: Some(
            candidates
                .iter()
                .map(|x| taxonomy.basic_tag(&x.rich_tag))
                .join(CANDIDATE_SEPARATOR),
        ),
        rich_tag: Some(
            candidates
                .iter()
                .map(|x| x.rich_tag.as_str())
                .join(CANDIDATE_SEPARATOR),
        ),
        mutation: None,
        resolution: Some(Resolution::StillAmbiguous),
    }
}

/// Resolves ambiguous and unknown tokens with gazetteers, a coverage table and a
/// tag sequence table, in this order.
pub struct DisambiguationCascade<'c> {
    gazetteers: &'c GazetteerSet,
    coverage: &'c CoverageTable,
    tag_sequences: &'c TagSequenceTable,
    use_coverage: bool,
}

impl<'c> DisambiguationCascade<'c> {
    pub fn new(
        gazetteers: &'c GazetteerSet,
        coverage: &'c CoverageTable,
        tag_sequences: &'c TagSequenceTable,
    ) -> Self {
        DisambiguationCascade {
            gazetteers,
            coverage,
            tag_sequences,
            use_coverage: true,
        }
    }

    /// Whether the coverage and tag sequence tables take part.
    /// Disabled when tagging text which new tables are derived from.
    pub fn use_coverage(mut self, use_coverage: bool) -> Self {
        self.use_coverage = use_coverage;
        self
    }

    fn from_gazetteer(&self, token: &Token, lemma: &str) -> Option<Annotation> {
        let tag = self.gazetteers.proper_noun_tag(&token.text)?;

        Some(Annotation {
            lemma: Some(lemma.to_string()),
            basic_tag: Some(PROPER_NOUN_BASIC.to_string()),
            rich_tag: Some(tag.to_string()),
            mutation: None,
            resolution: Some(Resolution::Gazetteer),
        })
    }

    fn from_coverage(&self, token: &Token, candidates: &[Reading]) -> Option<Annotation> {
        if !self.use_coverage {
            return None;
        }

        let pair = self.coverage.lookup(&token.text)?;
        let reading = candidates
            .iter()
            .find(|x| x.rich_tag == pair.rich)
            .or_else(|| candidates.first());

        Some(Annotation {
            lemma: Some(reading.map_or(token.text.clone(), |x| x.lemma.clone())),
            basic_tag: Some(pair.basic.to_string()),
            rich_tag: Some(pair.rich.to_string()),
            mutation: reading.and_then(|x| x.mutation),
            resolution: Some(Resolution::Coverage),
        })
    }

    /// Resolves a token on its own. Returns `None` if it has to wait for its neighbours.
    fn resolve(&self, token: &Token, candidates: &[Reading]) -> Option<Annotation> {
        match TokenState::classify(candidates) {
            TokenState::Resolved => Some(from_reading(&candidates[0], Resolution::Engine)),
            TokenState::MultiSame => Some(from_reading(&candidates[0], Resolution::SameTag)),
            TokenState::AmbiguousGenderPN => {
                self.from_gazetteer(token, &candidates[0].lemma).or_else(|| {
                    Some(annotation(
                        &candidates[0].lemma,
                        PROPER_NOUN,
                        None,
                        Resolution::ProperNounGender,
                    ))
                })
            }
            // none of the candidate lemmas is preferred, the name is its own lemma
            TokenState::AmbiguousOther | TokenState::Unknown => self
                .from_gazetteer(token, &token.text)
                .or_else(|| self.from_coverage(token, candidates)),
        }
    }

    /// Annotates every token of the document. `cohorts` must hold one cohort per token,
    /// in document order.
    pub fn disambiguate(&self, document: &mut TaggedDocument, cohorts: &[Cohort]) -> CascadeOutput {
        let mut pending: Vec<Option<Vec<Reading>>> = Vec::with_capacity(cohorts.len());

        for (token, cohort) in document.tokens_mut().zip(cohorts) {
            let candidates = candidates(&token.text, &cohort.readings);

            match self.resolve(token, &candidates) {
                Some(annotation) => {
                    token.annotation = annotation;
                    pending.push(None);
                }
                None => pending.push(Some(candidates)),
            }
        }

        let mut pending = pending.into_iter();

        for sentence in document.sentences_mut() {
            let len = sentence.tokens.len();

            for i in 0..len {
                let candidates = match pending.next().flatten() {
                    Some(candidates) => candidates,
                    None => continue,
                };

                let predicted = if self.use_coverage {
                    let tokens = &sentence.tokens;
                    TagPattern::around(i, len, |j| {
                        tokens.get(j).and_then(|x| x.annotation.resolved_rich_tag())
                    })
                    .and_then(|pattern| self.tag_sequences.lookup(&pattern))
                    .map(ToOwned::to_owned)
                } else {
                    None
                };

                let annotation = {
                    let token = &sentence.tokens[i];
                    predicted
                        .and_then(|tag| apply_prediction(token, &candidates, &tag))
                        .unwrap_or_else(|| unresolved(token, &candidates))
                };

                let token = &mut sentence.tokens[i];
                debug!(
                    "'{}' at {} resolved as {:?}: {:?}",
                    token.text, token.position, annotation.resolution, annotation.rich_tag
                );
                token.annotation = annotation;
            }
        }

        let mut output = CascadeOutput::default();
        for token in document.tokens() {
            if let Some(resolution) = token.annotation.resolution {
                output.statistics.record(resolution);
                if !resolution.is_resolved() {
                    output.unknown_words.push(token.text.clone());
                }
            }
        }

        output.statistics.log();
        output
    }
}
