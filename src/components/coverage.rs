use fs_err::File;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::{components::taxonomy::TagTaxonomy, types::TaggedDocument, Error};

/// A `basic:rich` tag pair as stored in the coverage table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagPair<'a> {
    pub basic: &'a str,
    pub rich: &'a str,
}

/// The most frequent tag pair of every token observed in an annotated corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageTable {
    pairs: IndexMap<String, String>,
}

impl CoverageTable {
    /// Reads a JSON object mapping tokens to `basic:rich` strings.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let table: CoverageTable = serde_json::from_reader(BufReader::new(File::open(path)?))?;

        if let Some((token, pair)) = table.pairs.iter().find(|(_, pair)| !pair.contains(':')) {
            return Err(Error::Resource {
                path: path.to_path_buf(),
                reason: format!("'{}' maps to '{}' which is not a basic:rich pair", token, pair),
            });
        }

        info!("Loaded coverage table with {} tokens.", table.len());
        Ok(table)
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn insert<S1: Into<String>, S2: AsRef<str>, S3: AsRef<str>>(
        &mut self,
        token: S1,
        basic: S2,
        rich: S3,
    ) {
        self.pairs.insert(
            token.into(),
            format!("{}:{}", basic.as_ref(), rich.as_ref()),
        );
    }

    fn split(pair: &str) -> TagPair<'_> {
        let mut parts = pair.splitn(2, ':');
        let basic = parts.next().unwrap_or_default();
        let rich = parts.next().unwrap_or(basic);
        TagPair { basic, rich }
    }

    /// Exact lookup, then lookup of the lower-cased token.
    pub fn lookup(&self, token: &str) -> Option<TagPair<'_>> {
        self.pairs
            .get(token)
            .or_else(|| self.pairs.get(&token.to_lowercase()))
            .map(|pair| CoverageTable::split(pair))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Derives a table from an annotated document: for every surface form, the legal tag pair it
    /// was annotated with most often. Ties go to the pair which comes first in the taxonomy.
    pub fn from_document(document: &TaggedDocument) -> Self {
        let taxonomy = TagTaxonomy::get();
        let pair_index: HashMap<&str, usize> = taxonomy
            .legal_pairs()
            .iter()
            .enumerate()
            .map(|(i, x)| (x.as_str(), i))
            .collect();

        let mut counts: IndexMap<&str, HashMap<usize, usize>> = IndexMap::new();

        for token in document.tokens() {
            let annotation = &token.annotation;
            let (basic, rich) = match (&annotation.basic_tag, &annotation.rich_tag) {
                (Some(basic), Some(rich)) => (basic, rich),
                _ => continue,
            };

            if let Some(index) = pair_index.get(format!("{}:{}", basic, rich).as_str()) {
                *counts
                    .entry(token.text.as_str())
                    .or_insert_with(HashMap::new)
                    .entry(*index)
                    .or_insert(0) += 1;
            }
        }

        let pairs = counts
            .into_iter()
            .filter_map(|(token, token_counts)| {
                token_counts
                    .into_iter()
                    // highest count first, then lowest index
                    .max_by(|(i1, c1), (i2, c2)| c1.cmp(c2).then(i2.cmp(i1)))
                    .map(|(index, _)| (token.to_string(), taxonomy.legal_pairs()[index].clone()))
            })
            .collect();

        CoverageTable { pairs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File as DocumentFile, Position, Segment, Sentence, Token};

    fn tagged(text: &str, basic: &str, rich: &str) -> Token {
        let mut token = Token::new(text, Position::new(1, 1), false);
        token.annotation.basic_tag = Some(basic.to_string());
        token.annotation.rich_tag = Some(rich.to_string());
        token
    }

    #[test]
    fn looks_up_case_folded() {
        let mut table = CoverageTable::default();
        table.insert("ei", "Rha", "Rhadib3gu");

        let pair = table.lookup("Ei").unwrap();
        assert_eq!(pair.basic, "Rha");
        assert_eq!(pair.rich, "Rhadib3gu");
        assert!(table.lookup("eu").is_none());
    }

    #[test]
    fn derives_most_frequent_legal_pair() {
        let mut sentence = Sentence::new("");
        sentence.tokens = vec![
            tagged("ei", "Rha", "Rhadib3bu"),
            tagged("ei", "Rha", "Rhadib3gu"),
            tagged("ei", "Rha", "Rhadib3bu"),
            tagged("pan", "Cys", "Cyscyd"),
            tagged("pan", "Adf", "Adf"),
            tagged("xyz", "unk", "unk"),
            tagged("ac", "Cys | Cys", "Cyscyd | Cysis"),
        ];
        let mut segment = Segment::new("");
        segment.sentences.push(sentence);
        let document = TaggedDocument {
            files: vec![DocumentFile {
                name: "N/A".into(),
                segments: vec![segment],
            }],
            anonymised_spans: Vec::new(),
        };

        let table = CoverageTable::from_document(&document);

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("ei").unwrap().rich, "Rhadib3bu");
        // tie: Cys comes before Adf in the taxonomy
        assert_eq!(table.lookup("pan").unwrap().rich, "Cyscyd");
        assert!(table.lookup("xyz").is_none());
    }
}
