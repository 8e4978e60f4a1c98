//! The tagging pipeline: segmentation, sentence splitting, tokenization, readings generation,
//! constraint grammar disambiguation and the disambiguation cascade, in this order.

use fs_err::{self as fs, File};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    components::{
        cascade::CascadeOutput,
        cg::{
            protocol::{check_alignment, parse_response, write_request},
            ConstraintGrammar, VislCg3, VISLCG3,
        },
    },
    context::Context,
    output,
    types::TaggedDocument,
    Error,
};

/// Options of a tagging run, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerOptions {
    /// Path to the vislcg3 executable. Searched on the `PATH` if not set.
    pub engine_path: Option<PathBuf>,
    pub grammar_path: PathBuf,
    /// Whether the coverage and tag sequence tables are used.
    pub use_coverage: bool,
    /// Where unknown words are collected across runs.
    pub unknown_words_path: Option<PathBuf>,
    /// Whether the request to and the response from the engine are written next to the output.
    pub keep_engine_io: bool,
}

impl Default for TaggerOptions {
    fn default() -> Self {
        TaggerOptions {
            engine_path: None,
            grammar_path: PathBuf::from("grammars/cy_grammar"),
            use_coverage: true,
            unknown_words_path: None,
            keep_engine_io: false,
        }
    }
}

impl TaggerOptions {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// The stage up to which the pipeline is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Segment,
    Sentence,
    Token,
    Pos,
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seg" | "segment" => Ok(Stage::Segment),
            "sent" | "sentence" => Ok(Stage::Sentence),
            "tok" | "token" => Ok(Stage::Token),
            "pos" => Ok(Stage::Pos),
            _ => Err(format!("unknown stage '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tsv,
    Xml,
    All,
}

impl OutputFormat {
    fn tsv(&self) -> bool {
        matches!(self, OutputFormat::Tsv | OutputFormat::All)
    }

    fn xml(&self) -> bool {
        matches!(self, OutputFormat::Xml | OutputFormat::All)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tsv" => Ok(OutputFormat::Tsv),
            "xml" => Ok(OutputFormat::Xml),
            "all" => Ok(OutputFormat::All),
            _ => Err(format!("unknown output format '{}'", s)),
        }
    }
}

/// The words no analysis could be found for, accumulated across runs for lexicon curation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownWords {
    words: BTreeSet<String>,
}

impl UnknownWords {
    /// Reads a word list with one word per line. A missing file is an empty list.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(UnknownWords::default());
        }

        let text = fs::read_to_string(path)?;
        Ok(UnknownWords {
            words: text
                .lines()
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        })
    }

    /// Adds words, returning how many of them were new.
    pub fn merge<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.words.len();
        self.words.extend(words.into_iter().map(Into::into));
        self.words.len() - before
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for word in &self.words {
            writeln!(writer, "{}", word)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// What happened while tagging a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggingReport {
    /// The request sent to the constraint grammar engine.
    pub request: String,
    /// The raw engine output.
    pub response: String,
    pub cascade: CascadeOutput,
}

/// Runs the whole pipeline with the resources of a [Context] and a constraint grammar engine.
pub struct PosTagger<'c, E: ConstraintGrammar> {
    context: &'c Context,
    engine: E,
    options: TaggerOptions,
}

impl<'c, E: ConstraintGrammar> PosTagger<'c, E> {
    pub fn new(context: &'c Context, engine: E, options: TaggerOptions) -> Self {
        PosTagger {
            context,
            engine,
            options,
        }
    }

    pub fn options(&self) -> &TaggerOptions {
        &self.options
    }

    /// Splits and tokenizes a segmented document, as far as `stage` requires.
    pub fn prepare(&self, document: &mut TaggedDocument, stage: Stage) {
        if stage >= Stage::Sentence {
            self.context.sentence_splitter().split_document(document);
        }
        if stage >= Stage::Token {
            self.context.tokenizer().tokenize_document(document);
        }
    }

    /// Annotates every token of a tokenized document.
    /// The document is only modified if the engine run succeeds.
    pub fn tag(&self, document: &mut TaggedDocument) -> Result<TaggingReport, Error> {
        let readings = self.context.readings_generator().generate_document(document);
        let request = write_request(document, &readings);

        info!("Running the constraint grammar engine on {} tokens.", readings.len());
        let response = self.engine.disambiguate(&request)?;
        let cohorts = parse_response(&response)?;
        check_alignment(&cohorts, document, &response)?;

        let cascade = self
            .context
            .cascade()
            .use_coverage(self.options.use_coverage)
            .disambiguate(document, &cohorts);

        Ok(TaggingReport {
            request,
            response,
            cascade,
        })
    }

    /// Tags a string. Every line is a paragraph.
    pub fn tag_text(&self, text: &str) -> Result<(TaggedDocument, TaggingReport), Error> {
        let mut document = self.context.segmenter().segment_text(text);
        self.prepare(&mut document, Stage::Token);
        let report = self.tag(&mut document)?;
        Ok((document, report))
    }

    /// Tags files, keeping one [File][crate::types::File] per path.
    pub fn tag_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<(TaggedDocument, TaggingReport), Error> {
        let mut document = self.context.segmenter().segment_files(paths)?;
        self.prepare(&mut document, Stage::Token);
        let report = self.tag(&mut document)?;
        Ok((document, report))
    }
}

/// Input of a tagging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Files(Vec<PathBuf>),
}

/// Where and how the results of a run are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub dir: PathBuf,
    /// Base name of the output files and name of the corpus.
    pub name: String,
    pub format: OutputFormat,
    pub stage: Stage,
}

impl OutputSpec {
    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.name, suffix))
    }
}

fn write_outputs(document: &TaggedDocument, spec: &OutputSpec) -> Result<(), Error> {
    fs::create_dir_all(&spec.dir)?;

    if spec.format.tsv() {
        let path = spec.path(".tsv");
        output::write_tsv(document, BufWriter::new(File::create(&path)?))?;
        info!("Wrote {}.", path.display());
    }
    if spec.format.xml() {
        let path = spec.path(".xml");
        output::write_xml(document, &spec.name, BufWriter::new(File::create(&path)?))?;
        info!("Wrote {}.", path.display());
    }

    Ok(())
}

/// Runs the pipeline up to `spec.stage` with an already constructed engine and writes the
/// results. Nothing is written if any stage fails.
pub fn annotate_with<E: ConstraintGrammar>(
    context: &Context,
    engine: E,
    options: TaggerOptions,
    input: &Input,
    spec: &OutputSpec,
) -> Result<(TaggedDocument, Option<TaggingReport>), Error> {
    let tagger = PosTagger::new(context, engine, options);

    let mut document = match input {
        Input::Text(text) => context.segmenter().segment_text(text),
        Input::Files(paths) => context.segmenter().segment_files(paths.as_slice())?,
    };
    tagger.prepare(&mut document, spec.stage);

    if spec.stage < Stage::Token {
        info!(
            "Stopped after {:?} with {} paragraphs and {} sentences, nothing is written.",
            spec.stage,
            document.files.iter().map(|x| x.segments.len()).sum::<usize>(),
            document.n_sentences()
        );
        return Ok((document, None));
    }

    let report = if spec.stage == Stage::Pos {
        Some(tagger.tag(&mut document)?)
    } else {
        None
    };

    write_outputs(&document, spec)?;

    if let Some(report) = &report {
        if tagger.options().keep_engine_io {
            fs::write(spec.path("_readings"), &report.request)?;
            fs::write(spec.path("_readingsPostCG"), &report.response)?;
        }

        if let Some(path) = &tagger.options().unknown_words_path {
            let mut unknown_words = UnknownWords::load(path)?;
            let added = unknown_words.merge(report.cascade.unknown_words.iter().cloned());
            unknown_words.save(path)?;
            info!(
                "Recorded {} new unknown words, {} in total.",
                added,
                unknown_words.len()
            );
        }
    }

    Ok((document, report))
}

/// Runs the pipeline with the vislcg3 engine. The engine is located before anything else
/// happens, so a missing engine leaves no output behind.
pub fn annotate(
    context: &Context,
    options: TaggerOptions,
    input: &Input,
    spec: &OutputSpec,
) -> Result<(TaggedDocument, Option<TaggingReport>), Error> {
    if spec.stage < Stage::Pos {
        let engine = NoEngine;
        return annotate_with(context, engine, options, input, spec);
    }

    let engine = VislCg3::locate(options.engine_path.as_deref(), &options.grammar_path)?;
    annotate_with(context, engine, options, input, spec)
}

/// Stand-in for runs which stop before the engine is needed.
struct NoEngine;

impl ConstraintGrammar for NoEngine {
    fn disambiguate(&self, _input: &str) -> Result<String, Error> {
        Err(Error::MissingDependency {
            name: VISLCG3.to_string(),
        })
    }
}
