use fs_err::File;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::{
    components::taxonomy::UNKNOWN_TAG,
    types::{Sentence, TaggedDocument},
    Error,
};

/// Placeholder for the position whose tag is predicted.
pub const FIND: &str = "find";

/// The neighbourhood of a token in terms of the rich tags around it.
/// Tokens at the start or end of a sentence look two tokens ahead or behind instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagPattern<'a> {
    Start { next: &'a str, after_next: &'a str },
    Middle { prev: &'a str, next: &'a str },
    End { before_prev: &'a str, prev: &'a str },
}

impl<'a> TagPattern<'a> {
    /// Builds the pattern for the token at `index` of a sentence with `len` tokens.
    /// `tag_at` returns the tag of a neighbour, or `None` if it has no usable tag.
    /// Sentences with fewer than three tokens have no patterns.
    pub fn around<F>(index: usize, len: usize, tag_at: F) -> Option<Self>
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        if len < 3 || index >= len {
            return None;
        }

        Some(if index == 0 {
            TagPattern::Start {
                next: tag_at(1)?,
                after_next: tag_at(2)?,
            }
        } else if index == len - 1 {
            TagPattern::End {
                before_prev: tag_at(index - 2)?,
                prev: tag_at(index - 1)?,
            }
        } else {
            TagPattern::Middle {
                prev: tag_at(index - 1)?,
                next: tag_at(index + 1)?,
            }
        })
    }

    fn slots(&self) -> [&'a str; 3] {
        match *self {
            TagPattern::Start { next, after_next } => [FIND, next, after_next],
            TagPattern::Middle { prev, next } => [prev, FIND, next],
            TagPattern::End { before_prev, prev } => [before_prev, prev, FIND],
        }
    }
}

/// Formats the pattern as the table key, a list literal such as `['find', 'Egu', 'Ar']`.
impl<'a> fmt::Display for TagPattern<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_key(self.slots()))
    }
}

fn format_key([a, b, c]: [&str; 3]) -> String {
    format!("['{}', '{}', '{}']", a, b, c)
}

/// Splits a key in list form back into its three slots.
fn parse_key(key: &str) -> Option<[&str; 3]> {
    let inner = key.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner
        .split(',')
        .map(|x| x.trim().trim_matches(|c| c == '\'' || c == '"'));

    let slots = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() {
        return None;
    }
    if slots.iter().filter(|x| **x == FIND).count() == 1 {
        Some(slots)
    } else {
        None
    }
}

/// Maps tag patterns to the rich tag most often seen at the `find` position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSequenceTable {
    sequences: IndexMap<String, String>,
}

impl TagSequenceTable {
    /// Reads a JSON object mapping list form keys to rich tags. Keys are brought into the
    /// form [TagPattern] formats them in, so quoting and spacing of the file do not matter.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw: IndexMap<String, String> =
            serde_json::from_reader(BufReader::new(File::open(path)?))?;

        let sequences = raw
            .into_iter()
            .map(|(key, tag)| match parse_key(&key) {
                Some(slots) => Ok((format_key(slots), tag)),
                None => Err(Error::Resource {
                    path: path.to_path_buf(),
                    reason: format!("invalid tag sequence key {}", key),
                }),
            })
            .collect::<Result<_, _>>()?;
        let table = TagSequenceTable { sequences };

        info!("Loaded tag sequence table with {} patterns.", table.len());
        Ok(table)
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn insert<S: Into<String>>(&mut self, pattern: &TagPattern, rich_tag: S) {
        self.sequences.insert(pattern.to_string(), rich_tag.into());
    }

    pub fn lookup(&self, pattern: &TagPattern) -> Option<&str> {
        self.sequences
            .get(&pattern.to_string())
            .map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Derives a table from an annotated document. Only unambiguous, known tags take part.
    /// For every pattern the most frequent tag is kept, ties go to the tag seen first.
    pub fn from_document(document: &TaggedDocument) -> Self {
        let mut counts: IndexMap<String, IndexMap<&str, usize>> = IndexMap::new();

        for sentence in document.sentences() {
            let tag_at = |i: usize| usable_tag(sentence, i);

            for i in 0..sentence.tokens.len() {
                let tag = match tag_at(i) {
                    Some(tag) => tag,
                    None => continue,
                };

                if let Some(pattern) = TagPattern::around(i, sentence.tokens.len(), tag_at) {
                    *counts
                        .entry(pattern.to_string())
                        .or_insert_with(IndexMap::new)
                        .entry(tag)
                        .or_insert(0) += 1;
                }
            }
        }

        let sequences = counts
            .into_iter()
            .filter_map(|(key, tag_counts)| {
                let mut best: Option<(&str, usize)> = None;
                for (tag, count) in tag_counts {
                    if best.map_or(true, |(_, best_count)| count > best_count) {
                        best = Some((tag, count));
                    }
                }
                best.map(|(tag, _)| (key, tag.to_string()))
            })
            .collect();

        TagSequenceTable { sequences }
    }
}

fn usable_tag(sentence: &Sentence, index: usize) -> Option<&str> {
    sentence
        .tokens
        .get(index)
        .and_then(|token| token.annotation.rich_tag.as_deref())
        .filter(|tag| *tag != UNKNOWN_TAG && !tag.contains('|') && !tag.is_empty())
}
