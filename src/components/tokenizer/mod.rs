//! Splitting text into files, paragraphs, sentences and tokens.
//!
//! Word level tokenization runs four steps in a fixed order over every whitespace separated chunk
//! of a sentence. Each step works on a queue of pieces and may split a piece again until nothing
//! changes:
//! 1. detaching punctuation at the edges of a piece,
//! 2. separating elided forms such as `'r` in `i'r`,
//! 3. splitting hyphenated compounds of capitalised words,
//! 4. separating symbols.
//!
//! Text wrapped in `<anon>...</anon>` is tokenized like any other text. The markers are removed
//! and the resulting tokens are flagged as opening or closing an anonymised span.

use lazy_static::lazy_static;
use log::{info, warn};

use crate::{
    components::gazetteer::{ContractionTable, GazetteerSet, ABBREVIATIONS, ACRONYMS},
    types::{AnonSpan, Position, TaggedDocument, Token},
    utils::{self, regex::Regex},
    Error,
};

pub mod segment;

pub const ANON_OPEN: &str = "<anon>";
pub const ANON_CLOSE: &str = "</anon>";

/// Punctuation which is detached from the edges of a token.
pub const PUNCTUATION: &str = ".,:;\"'!?<>{}()[]";

lazy_static! {
    // whitespace is kept only between two single-character abbreviations, e. g. "J. R."
    static ref WHITESPACE: Regex = Regex::new(r"\s(?!\S[.])|(?<!\S[.])\s").unwrap();
    static ref INITIALS: Regex = Regex::new(r"(?<![A-Z0-9_])([A-Z0-9_][.](\s*[A-Z0-9_][.])*)").unwrap();
    static ref ELLIPSIS: Regex = Regex::new(r"[.]{2,}").unwrap();
    static ref DIGIT_RANGE: Regex = Regex::new(r"\A\d+-\d+").unwrap();
}

/// A token as produced by the tokenizer, before it is placed in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    /// This token is the first one of an anonymised span.
    pub opens_span: bool,
    /// This token is the last one of an anonymised span.
    pub closes_span: bool,
}

impl RawToken {
    pub fn new<S: Into<String>>(text: S) -> Self {
        RawToken {
            text: text.into(),
            opens_span: false,
            closes_span: false,
        }
    }
}

type Step<'c> = fn(&Tokenizer<'c>, &str) -> Option<Vec<String>>;

/// Splits sentences into tokens.
pub struct Tokenizer<'c> {
    gazetteers: &'c GazetteerSet,
    contractions: &'c ContractionTable,
}

fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(c)
}

fn is_symbol(c: char) -> bool {
    !(c.is_whitespace() || c == '^' || c == '-' || is_punctuation(c))
        && !utils::is_word_char(c)
}

/// Removes anonymisation markers at the edges of a chunk.
fn strip_anon_markers(chunk: &str) -> (&str, bool, bool) {
    let (chunk, opens) = match chunk.strip_prefix(ANON_OPEN) {
        Some(rest) => (rest, true),
        None => (chunk, false),
    };
    let (chunk, closes) = match chunk.strip_suffix(ANON_CLOSE) {
        Some(rest) => (rest, true),
        None => (chunk, false),
    };
    (chunk, opens, closes)
}

/// Inserts a space before a sentence final full stop which is attached to the previous word.
fn detach_final_stop(sentence: &str) -> String {
    let sentence = sentence.trim_end();
    let mut chars = sentence.chars().rev();

    match (chars.next(), chars.next()) {
        (Some('.'), Some(prev)) if !prev.is_whitespace() && prev != '.' => {
            format!("{} .", &sentence[..sentence.len() - 1])
        }
        _ => sentence.to_string(),
    }
}

impl<'c> Tokenizer<'c> {
    pub fn new(gazetteers: &'c GazetteerSet, contractions: &'c ContractionTable) -> Self {
        Tokenizer {
            gazetteers,
            contractions,
        }
    }

    /// Tokenizes one sentence. Never fails: tokens which cannot be split are kept as they are.
    pub fn tokenize(&self, sentence: &str) -> Vec<RawToken> {
        let sentence = detach_final_stop(sentence);
        let mut tokens: Vec<RawToken> = Vec::new();
        let mut pending_open = false;

        for chunk in WHITESPACE.split(&sentence) {
            if chunk.is_empty() {
                continue;
            }

            let (text, opens, closes) = strip_anon_markers(chunk);
            let pieces = if text.is_empty() {
                Vec::new()
            } else {
                self.split_chunk(text)
            };

            // a bare marker applies to the neighbouring token
            if pieces.is_empty() {
                match (opens, closes) {
                    (true, false) => pending_open = true,
                    (false, true) => {
                        if let Some(last) = tokens.last_mut() {
                            last.closes_span = true;
                        }
                    }
                    _ => {}
                }
                continue;
            }

            let n_pieces = pieces.len();
            for (i, piece) in pieces.into_iter().enumerate() {
                tokens.push(RawToken {
                    text: piece,
                    opens_span: i == 0 && (opens || pending_open),
                    closes_span: i == n_pieces - 1 && closes,
                });
            }
            pending_open = false;
        }

        if pending_open {
            warn!("Ignoring anonymisation marker at the end of '{}'.", sentence);
        }

        tokens
    }

    /// Tokenizes every sentence of a sentence split document and numbers the tokens.
    /// Sentences are numbered across the whole document, tokens within their sentence.
    /// Sentences without any token are removed. A span which is still open at the end of the
    /// document is closed at its last token.
    pub fn tokenize_document(&self, document: &mut TaggedDocument) {
        let mut n_sentences = 0;
        let mut open_span: Option<Position> = None;
        let mut last_position: Option<Position> = None;
        let mut spans = Vec::new();

        for segment in document
            .files
            .iter_mut()
            .flat_map(|file| file.segments.iter_mut())
        {
            for sentence in segment.sentences.iter_mut() {
                let raw_tokens = self.tokenize(&sentence.text);
                if raw_tokens.is_empty() {
                    continue;
                }
                n_sentences += 1;

                for (i, raw) in raw_tokens.into_iter().enumerate() {
                    let position = Position::new(n_sentences, i + 1);

                    if raw.opens_span && open_span.is_none() {
                        open_span = Some(position);
                    }
                    let anonymised = open_span.is_some() || raw.closes_span;

                    if raw.closes_span {
                        let start = open_span.take().unwrap_or_else(|| {
                            warn!("Closing anonymisation marker without opening marker at {}.", position);
                            position
                        });
                        spans.push(AnonSpan {
                            start,
                            end: position,
                        });
                    }

                    sentence.tokens.push(Token::new(raw.text, position, anonymised));
                    last_position = Some(position);
                }
            }

            segment.sentences.retain(|sentence| !sentence.tokens.is_empty());
        }

        if let (Some(start), Some(end)) = (open_span, last_position) {
            warn!("Anonymised span starting at {} is never closed.", start);
            spans.push(AnonSpan { start, end });
        }

        document.anonymised_spans = spans;
        info!(
            "Tokenized {} sentences into {} tokens.",
            n_sentences,
            document.n_tokens()
        );
    }

    /// Runs all splitting steps over one whitespace separated chunk.
    pub fn split_chunk(&self, chunk: &str) -> Vec<String> {
        let steps: [Step<'c>; 4] = [
            Tokenizer::detach_punctuation,
            Tokenizer::separate_elision,
            Tokenizer::split_hyphenated,
            Tokenizer::separate_symbols,
        ];

        let mut pieces = vec![chunk.to_string()];
        for step in steps.iter() {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| self.apply_step(piece, *step))
                .collect();
        }
        pieces
    }

    /// Applies a step to a piece and, recursively, to everything it was split into.
    /// If any split does not make progress the piece is kept unsplit.
    fn apply_step(&self, piece: String, step: Step<'c>) -> Vec<String> {
        let mut output = Vec::new();
        let mut stack = vec![piece.clone()];

        while let Some(current) = stack.pop() {
            match step(self, &current) {
                None => output.push(current),
                Some(parts) => {
                    if let Err(error) = Tokenizer::check_split(&current, &parts) {
                        warn!("{}, keeping it unsplit.", error);
                        return vec![piece];
                    }
                    // reversed so that parts are popped in order
                    stack.extend(parts.into_iter().rev());
                }
            }
        }

        output
    }

    /// A split has to produce at least two nonempty parts which together make up the input.
    fn check_split(token: &str, parts: &[String]) -> Result<(), Error> {
        let progress = parts.len() > 1
            && parts.iter().all(|x| !x.is_empty())
            && parts.concat() == token;

        if progress {
            Ok(())
        } else {
            Err(Error::TokenizationAnomaly {
                token: token.to_string(),
            })
        }
    }

    fn is_protected(&self, token: &str) -> bool {
        let mut chars = token.chars();
        let is_single_punctuation = match (chars.next(), chars.next()) {
            (Some(c), None) => is_punctuation(c),
            _ => false,
        };

        is_single_punctuation
            || INITIALS.find(token) == Some((0, token.len()))
            || self.gazetteers.contains(ABBREVIATIONS, token)
            || self.gazetteers.contains(ACRONYMS, token)
            || self.contractions.contains(token)
    }

    fn detach_punctuation(&self, token: &str) -> Option<Vec<String>> {
        let first = token.chars().next()?;
        let last = token.chars().last()?;

        if !(is_punctuation(first) || is_punctuation(last)) || self.is_protected(token) {
            return None;
        }

        if let Some((start, end)) = ELLIPSIS.find(token) {
            if start == 0 && end == token.len() {
                return None;
            }

            let parts = [&token[..start], &token[start..end], &token[end..]];
            return Some(
                parts
                    .iter()
                    .filter(|x| !x.is_empty())
                    .map(|x| x.to_string())
                    .collect(),
            );
        }

        let mut start = 0;
        let mut end = token.len();
        let mut parts = Vec::new();

        if is_punctuation(first) {
            start = first.len_utf8();
            parts.push(token[..start].to_string());
        }
        let tail = if is_punctuation(last) && end - last.len_utf8() >= start {
            end -= last.len_utf8();
            Some(token[end..].to_string())
        } else {
            None
        };
        if start < end {
            parts.push(token[start..end].to_string());
        }
        parts.extend(tail);

        Some(parts)
    }

    fn separate_elision(&self, token: &str) -> Option<Vec<String>> {
        for term in self.contractions.elisions() {
            if token == term {
                return None;
            }

            if term.ends_with('\'') && token.starts_with(term) {
                return Some(vec![
                    term.to_string(),
                    token[term.len()..].to_string(),
                ]);
            }
            if term.starts_with('\'') && token.ends_with(term) {
                return Some(vec![
                    token[..token.len() - term.len()].to_string(),
                    term.to_string(),
                ]);
            }
        }

        None
    }

    fn split_hyphenated(&self, token: &str) -> Option<Vec<String>> {
        let index = token.find('-')?;
        if token == "-" || DIGIT_RANGE.matches_at_start(token) || token.matches('-').count() != 1 {
            return None;
        }

        let prefix = &token[..=index];
        if self.contractions.is_prefix(prefix)
            || self.contractions.is_prefix(&prefix.to_lowercase())
        {
            return None;
        }

        let (head, tail) = (&token[..index], &token[index + 1..]);
        if utils::starts_uppercase(head) && utils::starts_uppercase(tail) {
            Some(vec![head.to_string(), "-".to_string(), tail.to_string()])
        } else {
            None
        }
    }

    fn separate_symbols(&self, token: &str) -> Option<Vec<String>> {
        if token.contains("http") || token.contains("www.") || !token.chars().any(is_symbol) {
            return None;
        }

        let parts = utils::split(token, is_symbol);
        if parts.len() > 1 {
            Some(parts.into_iter().map(ToOwned::to_owned).collect())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gazetteer::ContractionKind;
    use lazy_static::lazy_static;
    use quickcheck_macros::quickcheck;

    lazy_static! {
        static ref GAZETTEERS: GazetteerSet = {
            let mut gazetteers = GazetteerSet::default();
            gazetteers.extend(ABBREVIATIONS, vec!["Dr.", "e.e.", "etc."]);
            gazetteers.extend(ACRONYMS, vec!["BBC", "S4C"]);
            gazetteers
        };
        static ref CONTRACTIONS: ContractionTable = {
            let mut contractions = ContractionTable::default();
            contractions.insert("'r", ContractionKind::Contraction, vec!["yr".into()]);
            contractions.insert("'n", ContractionKind::Contraction, vec!["yn".into()]);
            contractions.insert("'i", ContractionKind::Contraction, vec!["ei".into()]);
            contractions.insert("a'", ContractionKind::Contraction, vec!["a".into()]);
            contractions.insert("cyd-", ContractionKind::Prefix, vec![]);
            contractions.insert("Is-", ContractionKind::Prefix, vec![]);
            contractions
        };
    }

    fn tokenize(text: &str) -> Vec<String> {
        Tokenizer::new(&GAZETTEERS, &CONTRACTIONS)
            .tokenize(text)
            .into_iter()
            .map(|x| x.text)
            .collect()
    }

    #[test]
    fn separates_elision_and_final_stop() {
        assert_eq!(
            tokenize("Aeth hi i'r dref."),
            vec!["Aeth", "hi", "i", "'r", "dref", "."]
        );
    }

    #[test]
    fn detaches_punctuation_recursively() {
        assert_eq!(
            tokenize("\"Helo,\" meddai (hi)."),
            vec!["\"", "Helo", ",", "\"", "meddai", "(", "hi", ")", "."]
        );
    }

    #[test]
    fn keeps_abbreviations_and_initials() {
        assert_eq!(
            tokenize("Daeth Dr. Jones ac J. R. Evans, e.e. heddiw"),
            vec!["Daeth", "Dr.", "Jones", "ac", "J. R.", "Evans", ",", "e.e.", "heddiw"]
        );
        assert_eq!(tokenize("Mae'r BBC."), vec!["Mae", "'r", "BBC", "."]);
    }

    #[test]
    fn splits_ellipsis() {
        assert_eq!(tokenize("wel... ie"), vec!["wel", "...", "ie"]);
        assert_eq!(tokenize("..."), vec!["..."]);
    }

    #[test]
    fn splits_capitalised_compounds_only() {
        assert_eq!(
            tokenize("Aeth i Stratford-Upon"),
            vec!["Aeth", "i", "Stratford", "-", "Upon"]
        );
        assert_eq!(tokenize("ail-greu"), vec!["ail-greu"]);
        assert_eq!(tokenize("Is-Gadeirydd"), vec!["Is-Gadeirydd"]);
        assert_eq!(tokenize("1990-2000"), vec!["1990-2000"]);
    }

    #[test]
    fn separates_symbols_but_not_urls() {
        assert_eq!(tokenize("£5"), vec!["£", "5"]);
        assert_eq!(tokenize("50%"), vec!["50", "%"]);
        assert_eq!(tokenize("http://a.b/c&d"), vec!["http://a.b/c&d"]);
    }

    #[test]
    fn tracks_anonymised_spans() {
        let tokens = Tokenizer::new(&GAZETTEERS, &CONTRACTIONS)
            .tokenize("Mae <anon>Dafydd Jones,</anon> yma");

        let texts: Vec<_> = tokens.iter().map(|x| x.text.as_str()).collect();
        assert_eq!(texts, vec!["Mae", "Dafydd", "Jones", ",", "yma"]);
        assert!(tokens[1].opens_span);
        assert!(!tokens[1].closes_span);
        assert!(tokens[3].closes_span);
        assert!(!tokens[4].opens_span && !tokens[4].closes_span);
    }

    #[test]
    fn bare_markers_attach_to_neighbours() {
        let tokens =
            Tokenizer::new(&GAZETTEERS, &CONTRACTIONS).tokenize("Mae <anon> Dafydd </anon> yma");

        let texts: Vec<_> = tokens.iter().map(|x| x.text.as_str()).collect();
        assert_eq!(texts, vec!["Mae", "Dafydd", "yma"]);
        assert!(tokens[1].opens_span && tokens[1].closes_span);
    }

    #[test]
    fn rejects_splits_without_progress() {
        let parts = vec!["a".to_string(), "".to_string()];
        assert!(Tokenizer::check_split("a", &parts).is_err());
        assert!(Tokenizer::check_split("ab", &["a".to_string(), "b".to_string()]).is_ok());
    }

    #[test]
    fn numbers_tokens_and_records_spans() {
        use crate::types::{File, Segment, Sentence};

        let mut segment = Segment::new("");
        segment.sentences = vec![
            Sentence::new("Aeth <anon>Dafydd"),
            Sentence::new("<anon></anon>"),
            Sentence::new("Jones</anon> i'r dref."),
            Sentence::new("Daeth <anon>Mair"),
        ];
        let mut document = TaggedDocument::new();
        document.files.push(File {
            name: "N/A".into(),
            segments: vec![segment],
        });

        Tokenizer::new(&GAZETTEERS, &CONTRACTIONS).tokenize_document(&mut document);

        let positions: Vec<_> = document.tokens().map(|x| x.position.to_string()).collect();
        assert_eq!(
            positions,
            vec!["1,1", "1,2", "2,1", "2,2", "2,3", "2,4", "2,5", "3,1", "3,2"]
        );
        assert_eq!(document.n_sentences(), 3);

        let anonymised: Vec<_> = document
            .tokens()
            .filter(|x| x.anonymised)
            .map(|x| x.text.as_str())
            .collect();
        assert_eq!(anonymised, vec!["Dafydd", "Jones", "Mair"]);
        assert_eq!(
            document.anonymised_spans,
            vec![
                AnonSpan {
                    start: Position::new(1, 2),
                    end: Position::new(2, 1)
                },
                AnonSpan {
                    start: Position::new(3, 2),
                    end: Position::new(3, 2)
                },
            ]
        );
    }

    #[quickcheck]
    fn can_tokenize_anything(text: String) -> bool {
        tokenize(&text);
        true
    }

    #[quickcheck]
    fn tokens_cover_input(text: String) -> bool {
        if text.contains("anon>") {
            return true;
        }

        let strip = |x: &str| x.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        let tokens = tokenize(&text);

        tokens.iter().all(|x| !x.is_empty()) && strip(&tokens.concat()) == strip(&text)
    }

    #[test]
    fn retokenizing_is_idempotent() {
        for text in &[
            "Aeth hi i'r dref.",
            "\"Helo,\" meddai (hi).",
            "Aeth i Stratford-Upon am £5 ... wel",
        ] {
            let tokens = tokenize(text);
            assert_eq!(tokenize(&tokens.join(" ")), tokens);
        }
    }
}
