//! Part-of-speech tagging and lemmatisation of Welsh text.
//! # Overview
//!
//! cytag annotates whole documents in one batch. A document passes through the following stages:
//! - A [Segmenter][components::tokenizer::segment::Segmenter] splits raw input into files and paragraphs,
//!   a [SentenceSplitter][components::tokenizer::segment::SentenceSplitter] splits paragraphs into sentences.
//! - A [Tokenizer][components::tokenizer::Tokenizer] splits sentences into tokens, keeping elided forms
//!   (e. g. `'r`) and anonymised spans intact.
//! - A [ReadingsGenerator][components::readings::ReadingsGenerator] proposes candidate readings per token
//!   from the lexicon, taking Welsh initial consonant mutations into account.
//! - An external constraint grammar engine (see [ConstraintGrammar][components::cg::ConstraintGrammar])
//!   prunes implausible readings.
//! - A [DisambiguationCascade][components::cascade::DisambiguationCascade] resolves whatever is left
//!   using gazetteers, a coverage table and a tag sequence table.
//!
//! All static resources live in one immutable [Context][context::Context] which is loaded once and
//! shared by reference between the stages.
//!
//! # Examples
//!
//! ```no_run
//! use cytag::{context::Context, pipeline::{PosTagger, TaggerOptions}};
//! use cytag::components::cg::VislCg3;
//!
//! let context = Context::from_dir("resources")?;
//! let options = TaggerOptions::default();
//! let engine = VislCg3::locate(options.engine_path.as_deref(), &options.grammar_path)?;
//! let tagger = PosTagger::new(&context, engine, options);
//!
//! let (document, _) = tagger.tag_text("Aeth hi i'r dref.")?;
//! for token in document.tokens() {
//!     println!("{} {:?}", token.text, token.annotation.rich_tag);
//! }
//! # Ok::<(), cytag::Error>(())
//! ```

use std::{io, path::PathBuf};

use thiserror::Error;

pub mod components;
pub mod context;
pub mod output;
pub mod pipeline;
pub mod types;
pub(crate) mod utils;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error of a compiled resource bundle.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    XmlWrite(#[from] xml::writer::Error),
    #[error(transparent)]
    XmlRead(#[from] roxmltree::Error),
    /// A pattern built from resource data does not compile.
    #[error(transparent)]
    Regex(#[from] onig::Error),
    #[error("invalid resource {path}: {reason}")]
    Resource { path: PathBuf, reason: String },
    /// The external constraint grammar engine could not be located.
    #[error("required dependency '{name}' could not be found")]
    MissingDependency { name: String },
    #[error("the constraint grammar engine returned an empty output")]
    EmptyEngineOutput { raw: String },
    #[error("the constraint grammar engine returned malformed output: {reason}")]
    MalformedEngineOutput { reason: String, raw: String },
    #[error("could not split token '{token}'")]
    TokenizationAnomaly { token: String },
}

impl Error {
    /// The raw engine output attached to engine failures, kept for diagnostics.
    pub fn engine_output(&self) -> Option<&str> {
        match self {
            Error::EmptyEngineOutput { raw } | Error::MalformedEngineOutput { raw, .. } => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}
