use fs_err::File;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::Error;

/// One analysis of a surface form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub lemma: String,
    pub lemma_en: String,
    pub pos_basic: String,
    pub pos_enriched: String,
}

/// A lexicon hit: the key the entries were found under and the entries themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupHit<'a> {
    pub form: &'a str,
    pub entries: &'a [LexiconEntry],
}

/// Maps surface forms to their lexical analyses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconStore {
    entries: HashMap<String, Vec<LexiconEntry>>,
}

impl LexiconStore {
    /// Reads a lexicon from a tab-separated file with the columns
    /// `surface lemma lemma_en pos_basic pos_enriched`. Lines starting with `#` are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let lexicon = LexiconStore::from_lines(reader.lines(), path)?;

        info!(
            "Loaded lexicon with {} forms from {}.",
            lexicon.len(),
            path.display()
        );
        Ok(lexicon)
    }

    fn from_lines<I>(lines: I, path: &Path) -> Result<Self, Error>
    where
        I: Iterator<Item = std::io::Result<String>>,
    {
        let mut entries: HashMap<String, Vec<LexiconEntry>> = HashMap::new();

        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let parts: Vec<_> = line.split('\t').collect();
            if parts.len() < 5 {
                return Err(Error::Resource {
                    path: path.to_path_buf(),
                    reason: format!(
                        "line {} has {} fields, expected 5: {:?}",
                        i + 1,
                        parts.len(),
                        line
                    ),
                });
            }

            let entry = LexiconEntry {
                lemma: parts[1].to_string(),
                lemma_en: parts[2].to_string(),
                pos_basic: parts[3].to_string(),
                pos_enriched: parts[4].trim_end().to_string(),
            };

            let analyses = entries.entry(parts[0].to_string()).or_insert_with(Vec::new);
            if !analyses.contains(&entry) {
                analyses.push(entry);
            }
        }

        Ok(LexiconStore { entries })
    }

    /// Case sensitive lookup without any fallback.
    pub fn get(&self, form: &str) -> Option<&[LexiconEntry]> {
        self.entries.get(form).map(|x| x.as_slice())
    }

    pub fn contains(&self, form: &str) -> bool {
        self.entries.contains_key(form)
    }

    /// Looks up `form` as is, falling back to its lower-cased version.
    pub fn lookup<'a>(&'a self, form: &str) -> Option<LookupHit<'a>> {
        if let Some((key, entries)) = self.entries.get_key_value(form) {
            return Some(LookupHit {
                form: key,
                entries,
            });
        }

        let lower = form.to_lowercase();
        self.entries
            .get_key_value(&lower)
            .map(|(key, entries)| LookupHit {
                form: key,
                entries,
            })
    }

    /// The number of distinct surface forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon(text: &str) -> Result<LexiconStore, Error> {
        LexiconStore::from_lines(
            text.lines().map(|x| Ok(x.to_string())),
            Path::new("lexicon.tsv"),
        )
    }

    #[test]
    fn loads_ambiguous_entries_and_skips_comments() -> Result<(), Error> {
        let lexicon = lexicon(
            "# surface\tlemma\tlemma_en\tbasic\trich\n\
             coeden\tcoeden\ttree\tE\tEbu\n\
             i\ti\tto\tArd\tAr\n\
             i\tfi\tme\tRha\tRhapers1u\n",
        )?;

        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get("i").map(|x| x.len()), Some(2));
        assert_eq!(lexicon.get("coeden").unwrap()[0].pos_enriched, "Ebu");
        Ok(())
    }

    #[test]
    fn falls_back_to_lowercase() -> Result<(), Error> {
        let lexicon = lexicon("dref\ttref\ttown\tE\tEbu\n")?;

        let hit = lexicon.lookup("Dref").unwrap();
        assert_eq!(hit.form, "dref");
        assert_eq!(hit.entries[0].lemma, "tref");
        assert!(lexicon.get("Dref").is_none());
        assert!(lexicon.lookup("tref").is_none());
        Ok(())
    }

    #[test]
    fn rejects_short_lines() {
        let result = lexicon("coeden\tcoeden\n");
        assert!(matches!(result, Err(Error::Resource { .. })));
    }
}
