//! All static resources of the tagger, loaded once and shared by reference.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    components::{
        cascade::DisambiguationCascade,
        coverage::CoverageTable,
        gazetteer::{ContractionTable, GazetteerSet},
        lexicon::LexiconStore,
        readings::ReadingsGenerator,
        tag_sequence::TagSequenceTable,
        tokenizer::{
            segment::{Segmenter, SentenceSplitter},
            Tokenizer,
        },
        Component,
    },
    Error,
};

pub const LEXICON_FILE: &str = "lexicon.tsv";
pub const GAZETTEER_DIR: &str = "gazetteers";
pub const CONTRACTIONS_FILE: &str = "contractions_and_prefixes.json";
pub const COVERAGE_FILE: &str = "coverage.json";
pub const TAG_SEQUENCES_FILE: &str = "tag_sequences.json";

/// The immutable bundle of lexicon, gazetteers and tables every stage reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub lexicon: LexiconStore,
    pub gazetteers: GazetteerSet,
    pub contractions: ContractionTable,
    pub coverage: CoverageTable,
    pub tag_sequences: TagSequenceTable,
    sentence_splitter: SentenceSplitter,
}

impl Component for Context {
    fn name() -> &'static str {
        "context"
    }
}

/// Loads an optional resource, falling back to an empty one.
fn load_or_default<T: Default, F>(path: &Path, load: F) -> Result<T, Error>
where
    F: FnOnce(&Path) -> Result<T, Error>,
{
    if path.exists() {
        load(path)
    } else {
        warn!("{} does not exist, using an empty table.", path.display());
        Ok(T::default())
    }
}

impl Context {
    /// Assembles a context from already loaded resources.
    pub fn from_parts(
        lexicon: LexiconStore,
        gazetteers: GazetteerSet,
        contractions: ContractionTable,
        coverage: CoverageTable,
        tag_sequences: TagSequenceTable,
    ) -> Result<Self, Error> {
        let sentence_splitter = SentenceSplitter::new(&gazetteers)?;

        Ok(Context {
            lexicon,
            gazetteers,
            contractions,
            coverage,
            tag_sequences,
            sentence_splitter,
        })
    }

    /// Loads all resources from a directory. The lexicon is required, every other resource
    /// is replaced by an empty one if it is missing.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();
        info!("Loading resources from {}.", dir.display());

        let lexicon = LexiconStore::from_path(dir.join(LEXICON_FILE))?;
        let gazetteers = load_or_default(&dir.join(GAZETTEER_DIR), |p| GazetteerSet::from_dir(p))?;
        let contractions =
            load_or_default(&dir.join(CONTRACTIONS_FILE), |p| ContractionTable::from_path(p))?;
        let coverage = load_or_default(&dir.join(COVERAGE_FILE), |p| CoverageTable::from_path(p))?;
        let tag_sequences =
            load_or_default(&dir.join(TAG_SEQUENCES_FILE), |p| TagSequenceTable::from_path(p))?;

        Context::from_parts(lexicon, gazetteers, contractions, coverage, tag_sequences)
    }

    pub fn segmenter(&self) -> Segmenter {
        Segmenter
    }

    pub fn sentence_splitter(&self) -> &SentenceSplitter {
        &self.sentence_splitter
    }

    pub fn tokenizer(&self) -> Tokenizer<'_> {
        Tokenizer::new(&self.gazetteers, &self.contractions)
    }

    pub fn readings_generator(&self) -> ReadingsGenerator<'_> {
        ReadingsGenerator::new(&self.lexicon, &self.gazetteers, &self.contractions)
    }

    pub fn cascade(&self) -> DisambiguationCascade<'_> {
        DisambiguationCascade::new(&self.gazetteers, &self.coverage, &self.tag_sequences)
    }
}
