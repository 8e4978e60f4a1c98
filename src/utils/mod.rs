pub mod regex;

/// Split a text at the points where the given function is true.
/// Keeps the separators. See https://stackoverflow.com/a/40296745.
pub fn split<F>(text: &str, split_func: F) -> Vec<&str>
where
    F: Fn(char) -> bool,
{
    let mut result = Vec::new();
    let mut last = 0;
    for (index, matched) in text.match_indices(split_func) {
        if last != index {
            result.push(&text[last..index]);
        }
        result.push(matched);
        last = index + matched.len();
    }
    if last < text.len() {
        result.push(&text[last..]);
    }

    result
}

// see https://stackoverflow.com/questions/38406793/why-is-capitalizing-the-first-letter-of-a-string-so-convoluted-in-rust
pub fn apply_to_first<F>(string: &str, func: F) -> String
where
    F: Fn(char) -> String,
{
    let mut c = string.chars();
    match c.next() {
        None => String::new(),
        Some(first) => func(first) + c.as_str(),
    }
}

pub fn capitalize(string: &str) -> String {
    apply_to_first(string, |c| c.to_uppercase().collect())
}

pub fn starts_uppercase(string: &str) -> bool {
    string.chars().next().map_or(false, char::is_uppercase)
}

/// Whether the char counts as a word character in the regex sense (`\w`).
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escapes all regex metacharacters in `text` so it matches literally.
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if r"\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_separators() {
        assert_eq!(split("£5a", |c| c == '£'), vec!["£", "5a"]);
        assert_eq!(split("a/b/", |c| c == '/'), vec!["a", "/", "b", "/"]);
    }

    #[test]
    fn capitalizes_multibyte_first_char() {
        assert_eq!(capitalize("ŵyr"), "Ŵyr");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn escapes_metacharacters() {
        assert_eq!(escape_regex("Dr."), r"Dr\.");
        assert_eq!(escape_regex("(a)"), r"\(a\)");
    }
}
