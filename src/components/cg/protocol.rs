//! The vislcg3 text stream format.
//!
//! A request holds one cohort per token: a line `"<surface>"` followed by one indented line per
//! candidate reading, e. g.
//!
//! ```text
//! "<choeden>"
//! 	"coeden" {1,3} [cy] E b u :tree: + am
//! ```
//!
//! The engine answers in the same format with the pruned readings.

use log::warn;
use std::fmt::Write;

use crate::{
    components::{
        readings::TokenReadings,
        taxonomy::{TagTaxonomy, UNKNOWN_TAG},
    },
    types::{Mutation, Position, Reading, TaggedDocument},
    Error,
};

/// Marks the start of the tag atoms of a reading.
const LANGUAGE_MARKER: &str = "[cy]";

/// A reading which survived the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReading {
    pub lemma: String,
    pub position: Option<Position>,
    pub atoms: Vec<String>,
    pub glosses: Vec<String>,
    pub mutation: Option<Mutation>,
    /// Whether the reading is the `unk` placeholder.
    pub unknown: bool,
}

impl EngineReading {
    /// The rich tag, i. e. the concatenated tag atoms.
    pub fn rich_tag(&self) -> String {
        if self.unknown {
            UNKNOWN_TAG.to_string()
        } else {
            TagTaxonomy::get().compose(&self.atoms)
        }
    }
}

/// A token together with its readings as returned from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub surface: String,
    pub readings: Vec<EngineReading>,
}

fn write_reading(request: &mut String, reading: &Reading, position: Position) {
    let atoms = TagTaxonomy::get().decompose(&reading.rich_tag).join(" ");

    // writing to a String never fails
    let _ = write!(
        request,
        "\t\"{}\" {{{}}} {} {}",
        reading.lemma, position, LANGUAGE_MARKER, atoms
    );
    for gloss in &reading.glosses {
        let _ = write!(request, " :{}:", gloss);
    }
    if let Some(mutation) = reading.mutation {
        let _ = write!(request, " + {}", mutation.code());
    }
    request.push('\n');
}

/// Serialises the readings of every token into one request. `readings` must hold one entry per
/// token of the document, in document order. Sentences are separated by a blank line.
///
/// Tokens with a definite tag use the same reading line as all others, i. e. `{s,t}` carries
/// the position and not the tag atoms, with the surface as lemma and gloss:
/// `"<.>"` then `	"." {1,5} [cy] Atdt :.:`. Every reading can thus be aligned with its token.
pub fn write_request(document: &TaggedDocument, readings: &[TokenReadings]) -> String {
    let mut request = String::new();
    let mut readings = readings.iter();

    for sentence in document.sentences() {
        for token in &sentence.tokens {
            let _ = writeln!(request, "\"<{}>\"", token.text);

            if let Some(token_readings) = readings.next() {
                for reading in token_readings.readings() {
                    write_reading(&mut request, reading, token.position);
                }
            }
        }
        request.push('\n');
    }

    request
}

fn malformed(reason: String, raw: &str) -> Error {
    Error::MalformedEngineOutput {
        reason,
        raw: raw.to_string(),
    }
}

fn parse_cohort_line(line: &str) -> Option<&str> {
    line.trim_end()
        .strip_prefix("\"<")
        .and_then(|x| x.strip_suffix(">\""))
}

/// Parses one indented reading line, e. g. `"coeden" {1,3} [cy] E b u :tree: + am`.
fn parse_reading_line(line: &str) -> Option<EngineReading> {
    let line = line.trim().strip_prefix('"')?;

    let lemma_end = line
        .find("\" {")
        .or_else(|| line.find("\" "))
        .or_else(|| line.strip_suffix('"').map(|x| x.len()))?;
    let lemma = &line[..lemma_end];
    let mut fields = line[lemma_end + 1..].split_whitespace().peekable();

    let position = match fields.peek() {
        Some(field) if field.starts_with('{') && field.ends_with('}') => {
            let position = field[1..field.len() - 1].parse::<Position>().ok();
            fields.next();
            position
        }
        _ => None,
    };

    let mut reading = EngineReading {
        lemma: lemma.to_string(),
        position,
        atoms: Vec::new(),
        glosses: Vec::new(),
        mutation: None,
        unknown: false,
    };

    let mut in_atoms = false;
    let mut open_gloss: Option<String> = None;

    while let Some(field) = fields.next() {
        if let Some(gloss) = open_gloss.as_mut() {
            gloss.push(' ');
            gloss.push_str(field);
            if field.ends_with(':') {
                let gloss = open_gloss.take().unwrap_or_default();
                reading.glosses.push(gloss[..gloss.len() - 1].to_string());
            }
            continue;
        }

        match field {
            UNKNOWN_TAG if reading.atoms.is_empty() => reading.unknown = true,
            LANGUAGE_MARKER => in_atoms = true,
            "+" => {
                in_atoms = false;
                if let Some(code) = fields.next() {
                    reading.mutation = Mutation::from_code(code);
                    if reading.mutation.is_none() {
                        warn!("Unknown mutation '{}' in engine output.", code);
                    }
                }
            }
            _ if field.starts_with(':') => {
                in_atoms = false;
                let gloss = &field[1..];
                match gloss.strip_suffix(':') {
                    Some(gloss) if field.len() > 1 => reading.glosses.push(gloss.to_string()),
                    _ => open_gloss = Some(gloss.to_string()),
                }
            }
            _ if in_atoms => reading.atoms.push(field.to_string()),
            // rule traces and other annotations the engine may add
            _ => {}
        }
    }

    Some(reading)
}

/// Parses the engine output into cohorts.
pub fn parse_response(raw: &str) -> Result<Vec<Cohort>, Error> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty()).peekable();

    match lines.peek() {
        None => {
            return Err(Error::EmptyEngineOutput {
                raw: raw.to_string(),
            })
        }
        Some(line) if parse_cohort_line(line).is_none() => {
            return Err(malformed(
                format!("expected a cohort line, found {:?}", line),
                raw,
            ))
        }
        Some(_) => {}
    }

    let mut cohorts: Vec<Cohort> = Vec::new();

    for line in lines {
        if line.starts_with('\t') || line.starts_with(' ') {
            let reading = parse_reading_line(line)
                .ok_or_else(|| malformed(format!("invalid reading line {:?}", line), raw))?;

            match cohorts.last_mut() {
                Some(cohort) => cohort.readings.push(reading),
                None => return Err(malformed("reading before first cohort".into(), raw)),
            }
        } else {
            let surface = parse_cohort_line(line)
                .ok_or_else(|| malformed(format!("invalid cohort line {:?}", line), raw))?;

            cohorts.push(Cohort {
                surface: surface.to_string(),
                readings: Vec::new(),
            });
        }
    }

    Ok(cohorts)
}

/// Checks that the cohorts correspond one to one to the tokens of the document.
/// A different cohort count is an error, diverging surfaces or positions only warrant a warning.
pub fn check_alignment(
    cohorts: &[Cohort],
    document: &TaggedDocument,
    raw: &str,
) -> Result<(), Error> {
    let n_tokens = document.n_tokens();
    if cohorts.len() != n_tokens {
        return Err(malformed(
            format!("got {} cohorts for {} tokens", cohorts.len(), n_tokens),
            raw,
        ));
    }

    for (cohort, token) in cohorts.iter().zip(document.tokens()) {
        if cohort.surface != token.text {
            warn!(
                "Cohort '{}' does not match token '{}' at {}.",
                cohort.surface, token.text, token.position
            );
        }

        for reading in &cohort.readings {
            if let Some(position) = reading.position {
                if position != token.position {
                    warn!(
                        "Reading '{}' of '{}' is at {}, expected {}.",
                        reading.lemma, token.text, position, token.position
                    );
                }
            }
        }
    }

    Ok(())
}
