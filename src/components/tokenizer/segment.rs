//! Paragraph and sentence segmentation.

use fs_err as fs;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    components::gazetteer::{GazetteerSet, ABBREVIATIONS},
    types::{File, Segment, Sentence, TaggedDocument},
    utils::{self, regex::Regex},
    Error,
};

/// Name of the single file of a document created from a string.
pub const TEXT_FILE_NAME: &str = "N/A";

/// Splits input into files and paragraphs. Every nonblank line is a paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    fn segments(text: &str) -> Vec<Segment> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Segment::new)
            .collect()
    }

    /// Segments a string. Literal `\n` sequences count as line breaks.
    pub fn segment_text(&self, text: &str) -> TaggedDocument {
        let text = text.replace("\\n", "\n");

        let mut document = TaggedDocument::new();
        document.files.push(File {
            name: TEXT_FILE_NAME.to_string(),
            segments: Segmenter::segments(&text),
        });
        document
    }

    /// Segments files, keeping one [File] per path in the given order.
    pub fn segment_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<TaggedDocument, Error> {
        let mut document = TaggedDocument::new();

        for path in paths {
            let path = path.as_ref();
            let text = fs::read_to_string(path)?;

            document.files.push(File {
                name: path.to_string_lossy().into_owned(),
                segments: Segmenter::segments(&text),
            });
        }

        info!(
            "Segmented {} files into {} paragraphs.",
            document.files.len(),
            document.files.iter().map(|x| x.segments.len()).sum::<usize>()
        );
        Ok(document)
    }
}

/// Splits paragraphs into sentences at whitespace after `.`, `!` or `?`, except after
/// abbreviations and initials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSplitter {
    boundary: Regex,
}

const BOUNDARY: &str =
    r"(?<=[.!?])(?<!\s[A-Z][.])(?<![A-Z][.][A-Z][.])(?<![.]\s[.])(?<![.][.])\s";

impl SentenceSplitter {
    /// Creates a splitter which never splits after an abbreviation from the gazetteers.
    pub fn new(gazetteers: &GazetteerSet) -> Result<Self, Error> {
        let pattern = format!(
            "{}{}",
            gazetteers.exclusion_pattern(ABBREVIATIONS),
            BOUNDARY
        );

        Ok(SentenceSplitter {
            boundary: Regex::new(pattern)?,
        })
    }

    /// Splits a paragraph into sentences. Fragments without any word character, e. g. a closing
    /// quote, are appended to the previous sentence.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences: Vec<String> = Vec::new();

        for fragment in self.boundary.split(text) {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            match sentences.last_mut() {
                Some(last) if !fragment.chars().any(utils::is_word_char) => {
                    last.push(' ');
                    last.push_str(fragment);
                }
                _ => sentences.push(fragment.to_string()),
            }
        }

        sentences
    }

    /// Fills the sentences of every paragraph of the document.
    pub fn split_document(&self, document: &mut TaggedDocument) {
        for segment in document
            .files
            .iter_mut()
            .flat_map(|file| file.segments.iter_mut())
        {
            segment.sentences = self
                .split(&segment.text)
                .into_iter()
                .map(Sentence::new)
                .collect();
        }

        info!("Split document into {} sentences.", document.n_sentences());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter() -> SentenceSplitter {
        let mut gazetteers = GazetteerSet::default();
        gazetteers.extend(ABBREVIATIONS, vec!["Dr.", "e.e."]);
        SentenceSplitter::new(&gazetteers).unwrap()
    }

    #[test]
    fn splits_at_sentence_final_punctuation() {
        assert_eq!(
            splitter().split("Aeth hi i'r dref. Beth wnaeth hi? Dim byd!"),
            vec!["Aeth hi i'r dref.", "Beth wnaeth hi?", "Dim byd!"]
        );
    }

    #[test]
    fn keeps_abbreviations_and_initials() {
        assert_eq!(
            splitter().split("Daeth Dr. Jones a J. R. Evans i'r U.K. heddiw. Da iawn."),
            vec!["Daeth Dr. Jones a J. R. Evans i'r U.K. heddiw.", "Da iawn."]
        );
        assert_eq!(
            splitter().split("Roedd e.e. bara yno."),
            vec!["Roedd e.e. bara yno."]
        );
    }

    #[test]
    fn merges_fragments_without_words() {
        assert_eq!(
            splitter().split("Beth? ! Dim byd."),
            vec!["Beth? !", "Dim byd."]
        );
    }

    #[test]
    fn segments_lines_into_paragraphs() {
        let document = Segmenter.segment_text("Llinell un.\\nLlinell dau.\n\n  \nLlinell tri.");
        assert_eq!(document.files.len(), 1);
        assert_eq!(document.files[0].name, TEXT_FILE_NAME);

        let texts: Vec<_> = document.files[0]
            .segments
            .iter()
            .map(|x| x.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Llinell un.", "Llinell dau.", "Llinell tri."]);
    }

    #[test]
    fn segments_files_in_order() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("un.txt");
        let second = dir.path().join("dau.txt");
        fs::write(&first, "Un.\nDau.")?;
        fs::write(&second, "Tri.")?;

        let document = Segmenter.segment_files(&[&first, &second])?;
        assert_eq!(document.files.len(), 2);
        assert_eq!(document.files[0].segments.len(), 2);
        assert!(document.files[1].name.ends_with("dau.txt"));
        Ok(())
    }
}
