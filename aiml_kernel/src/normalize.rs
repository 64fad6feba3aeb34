//! Text normalization shared by patterns, inputs and `<that>` matching.

/// Characters that end a sentence in raw user input.
const SENTENCE_DELIMITERS: &[char] = &['.', '!', '?', ';'];

/// Split raw input into trimmed, non-empty sentences.
pub fn split_sentences(input: &str) -> Vec<String> {
    input
        .split(SENTENCE_DELIMITERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upper-case the text, drop apostrophes, and turn every other
/// non-alphanumeric character into a word break.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

/// Normalized words of an input sentence.
pub fn words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words of a pattern expression. Wildcards survive untouched.
pub fn pattern_words(pattern: &str) -> Vec<String> {
    pattern
        .split_whitespace()
        .flat_map(|token| match token {
            "*" | "_" => vec![token.to_string()],
            _ => words(token),
        })
        .collect()
}

/// Collapse whitespace runs into single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last sentence of a bot reply, used as the `<that>` context.
pub fn last_sentence(text: &str) -> Option<String> {
    split_sentences(text).pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("Hello, world!"), "HELLO WORLD");
        assert_eq!(normalize("what's   up"), "WHATS UP");
        assert_eq!(normalize("Olá"), "OLÁ");
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Hi there. How are you?  ");
        assert_eq!(sentences, vec!["Hi there", "How are you"]);
        assert!(split_sentences("?!").is_empty());
    }

    #[test]
    fn test_pattern_words_keep_wildcards() {
        assert_eq!(pattern_words("my name is *"), vec!["MY", "NAME", "IS", "*"]);
        assert_eq!(pattern_words("_ please"), vec!["_", "PLEASE"]);
    }

    #[test]
    fn test_last_sentence() {
        assert_eq!(
            last_sentence("I am fine. Do you like movies?").as_deref(),
            Some("Do you like movies")
        );
        assert_eq!(last_sentence(""), None);
    }
}
