//! Fundamental types used by this crate.
//!
//! A [TaggedDocument] is created by the segmenter and then filled in place by every later stage:
//! sentences are added by the sentence splitter, tokens by the tokenizer and [Annotation]s by
//! the disambiguation cascade.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Position of a token in a document.
/// `sentence` is counted across the whole document, `token` within the sentence. Both start at one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub sentence: usize,
    pub token: usize,
}

impl Position {
    pub fn new(sentence: usize, token: usize) -> Self {
        Position { sentence, token }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.sentence, self.token)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, ',');
        let mut next = || {
            parts
                .next()
                .and_then(|x| x.trim().parse::<usize>().ok())
                .ok_or_else(|| format!("invalid position '{}'", s))
        };

        let sentence = next()?;
        let token = next()?;
        Ok(Position { sentence, token })
    }
}

/// A Welsh initial consonant mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    Aspirate,
    Nasal,
    Soft,
    HProthesis,
}

impl Mutation {
    /// The short code used in engine readings and in the output formats.
    pub fn code(&self) -> &'static str {
        match self {
            Mutation::Aspirate => "am",
            Mutation::Nasal => "nm",
            Mutation::Soft => "sm",
            Mutation::HProthesis => "hm",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "am" => Some(Mutation::Aspirate),
            "nm" => Some(Mutation::Nasal),
            "sm" => Some(Mutation::Soft),
            "hm" => Some(Mutation::HProthesis),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Aspirate => "aspirate",
            Mutation::Nasal => "nasal",
            Mutation::Soft => "soft",
            Mutation::HProthesis => "h-prothesis",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unmutated form a token may have been derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationHypothesis {
    pub form: String,
    pub mutation: Mutation,
}

impl MutationHypothesis {
    pub fn new<S: Into<String>>(form: S, mutation: Mutation) -> Self {
        MutationHypothesis {
            form: form.into(),
            mutation,
        }
    }
}

/// One candidate analysis of a token before disambiguation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// The form which was looked up, e. g. the unmutated form for mutated tokens.
    pub surface: String,
    pub rich_tag: String,
    pub lemma: String,
    pub glosses: Vec<String>,
    pub mutation: Option<Mutation>,
}

impl Reading {
    pub fn new<S1: Into<String>, S2: Into<String>, S3: Into<String>>(
        surface: S1,
        rich_tag: S2,
        lemma: S3,
    ) -> Self {
        Reading {
            surface: surface.into(),
            rich_tag: rich_tag.into(),
            lemma: lemma.into(),
            glosses: Vec::new(),
            mutation: None,
        }
    }

    pub fn with_glosses(mut self, glosses: Vec<String>) -> Self {
        self.glosses = glosses;
        self
    }

    pub fn with_mutation(mut self, mutation: Option<Mutation>) -> Self {
        self.mutation = mutation;
        self
    }
}

/// How the final annotation of a token was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Exactly one reading survived the constraint grammar engine.
    Engine,
    /// All surviving readings share one tag.
    SameTag,
    /// The masculine / feminine proper noun pair was collapsed.
    ProperNounGender,
    Gazetteer,
    Coverage,
    TagSequence,
    StillAmbiguous,
    Unknown,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::StillAmbiguous | Resolution::Unknown)
    }
}

/// The annotation of a token, filled in progressively by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub lemma: Option<String>,
    pub basic_tag: Option<String>,
    pub rich_tag: Option<String>,
    pub mutation: Option<Mutation>,
    pub resolution: Option<Resolution>,
}

impl Annotation {
    /// The rich tag of the token if it was resolved to exactly one analysis.
    pub fn resolved_rich_tag(&self) -> Option<&str> {
        match self.resolution {
            Some(resolution) if resolution.is_resolved() => self.rich_tag.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: Position,
    pub anonymised: bool,
    pub annotation: Annotation,
}

impl Token {
    pub fn new<S: Into<String>>(text: S, position: Position, anonymised: bool) -> Self {
        Token {
            text: text.into(),
            position,
            anonymised,
            annotation: Annotation::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Sentence {
            text: text.into(),
            tokens: Vec::new(),
        }
    }
}

/// A paragraph, i. e. one line of input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub sentences: Vec<Sentence>,
}

impl Segment {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Segment {
            text: text.into(),
            sentences: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Path of the input file, or `N/A` for text which did not come from a file.
    pub name: String,
    pub segments: Vec<Segment>,
}

/// A run of tokens which was wrapped in `<anon>...</anon>` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonSpan {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedDocument {
    pub files: Vec<File>,
    pub anonymised_spans: Vec<AnonSpan>,
}

impl TaggedDocument {
    pub fn new() -> Self {
        TaggedDocument::default()
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.files
            .iter()
            .flat_map(|file| file.segments.iter())
            .flat_map(|segment| segment.sentences.iter())
    }

    pub fn sentences_mut(&mut self) -> impl Iterator<Item = &mut Sentence> {
        self.files
            .iter_mut()
            .flat_map(|file| file.segments.iter_mut())
            .flat_map(|segment| segment.sentences.iter_mut())
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences().flat_map(|sentence| sentence.tokens.iter())
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.sentences_mut()
            .flat_map(|sentence| sentence.tokens.iter_mut())
    }

    pub fn n_sentences(&self) -> usize {
        self.sentences().count()
    }

    pub fn n_tokens(&self) -> usize {
        self.sentences().map(|sentence| sentence.tokens.len()).sum()
    }
}
