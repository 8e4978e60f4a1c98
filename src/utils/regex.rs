use onig::{Regex as OnigRegex, RegexOptions};
use serde::{Deserialize, Serialize, Serializer};
use std::{convert::TryFrom, ops::Deref};

impl TryFrom<String> for Regex {
    type Error = onig::Error;

    fn try_from(string: String) -> Result<Self, onig::Error> {
        Ok(Regex {
            regex: Regex::compile(&string)?,
            string,
        })
    }
}

/// An oniguruma regex which serializes as its source string.
/// Oniguruma is needed (rather than `regex`) for the lookbehinds used in sentence splitting.
#[derive(Deserialize, Debug)]
#[serde(try_from = "String")]
pub struct Regex {
    string: String,
    regex: OnigRegex,
}

impl Serialize for Regex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.string)
    }
}

impl Clone for Regex {
    fn clone(&self) -> Self {
        Regex {
            regex: Regex::compile(&self.string).expect("regex was compiled before"),
            string: self.string.clone(),
        }
    }
}

impl Regex {
    pub fn new<S: Into<String>>(string: S) -> Result<Self, onig::Error> {
        Regex::try_from(string.into())
    }

    fn compile(regex_str: &str) -> Result<OnigRegex, onig::Error> {
        OnigRegex::with_options(
            regex_str,
            RegexOptions::REGEX_OPTION_NONE,
            onig::Syntax::ruby(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Whether the regex matches starting exactly at the beginning of `text`.
    pub fn matches_at_start(&self, text: &str) -> bool {
        self.regex.find(text).map_or(false, |(start, _)| start == 0)
    }

    /// Splits `text` at every match, dropping the matched text. Empty pieces are kept.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut pieces = Vec::new();
        let mut prev = 0;

        for (start, end) in self.regex.find_iter(text) {
            if start == end {
                continue;
            }
            pieces.push(&text[prev..start]);
            prev = end;
        }
        pieces.push(&text[prev..]);

        pieces
    }
}

impl Deref for Regex {
    type Target = OnigRegex;

    fn deref(&self) -> &Self::Target {
        &self.regex
    }
}
