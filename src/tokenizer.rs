
// defines the behavior needed for splitting a sentence line into tokens
pub trait Tokenizer {
    fn tokenize<'a>(&self, sequence: &'a str) -> Vec<&'a str>;
}

/// Splits on runs of whitespace, so irregular separators never fail a line.
///
/// Leading and trailing whitespace produce no empty tokens, and a blank line has
/// no tokens at all. A regex `\s+` split would instead keep empty edge tokens,
/// which then occupy window positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, sequence: &'a str) -> Vec<&'a str> {
        sequence.split_whitespace().collect()
    }
}

/// Normalizes a raw token: leading and trailing non-alphanumeric characters are
/// stripped and the rest is lower cased. Returns `None` when nothing is left.
pub fn normalize_token(token: &str) -> Option<String> {
    let stripped = token.trim_matches(|c: char| !c.is_alphanumeric());
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_lowercase())
}

/// Normalizes every token of a sentence, dropping the ones that become empty.
pub fn normalize_sentence<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|tok| normalize_token(tok.as_ref()))
        .collect()
}
