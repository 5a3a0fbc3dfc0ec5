
use crate::config::files_handling::LineReader;
use crate::error::{PrepError, Result};

use std::collections::HashMap;
use std::path::Path;

/// Surface literal of the sentinel unknown token, always id 0.
pub const UNKNOWN: &str = "__UNKNOWN__";

/// Read-only bidirectional table between tokens and dense ids.
///
/// Id 0 is the sentinel unknown token, ids `1..=K` follow the order of the
/// ranked-word file. Both directions are built together and never mutated
/// afterwards, so the table can be shared across worker threads as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

impl Vocabulary {

    /// Loads the first `max_words` lines of a ranked-word file, with the default sentinel.
    pub fn load(word_file: &Path, max_words: usize) -> Result<Self> {
        Vocabulary::load_with_unknown(word_file, max_words, UNKNOWN)
    }

    pub fn load_with_unknown(word_file: &Path, max_words: usize, unknown: &str) -> Result<Self> {
        let lines = LineReader::open(word_file)?;
        Vocabulary::build(lines, max_words, unknown, word_file)
    }

    /// Builds the table from ranked words already in memory.
    pub fn from_words<I, S>(words: I, max_words: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Vocabulary::from_words_with_unknown(words, max_words, UNKNOWN)
    }

    pub fn from_words_with_unknown<I, S>(words: I, max_words: usize, unknown: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = words.into_iter().map(|w| Ok(w.into()));
        Vocabulary::build(lines, max_words, unknown, Path::new("<memory>"))
    }

    fn build<I>(lines: I, max_words: usize, unknown: &str, source: &Path) -> Result<Self>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let mut vocab = Vocabulary {
            t2i: HashMap::with_capacity(max_words.saturating_add(1).min(1 << 20)),
            i2t: Vec::new(),
        };
        vocab.insert(unknown.to_owned());

        // lines past the cap are never read
        for (line_i, line) in lines.into_iter().take(max_words).enumerate() {
            let word = line?;
            if word.is_empty() {
                return Err(PrepError::WordFile {
                    path: source.to_path_buf(),
                    line: line_i + 1,
                    reason: "empty line".to_string(),
                });
            }
            if vocab.t2i.contains_key(&word) {
                return Err(PrepError::WordFile {
                    path: source.to_path_buf(),
                    line: line_i + 1,
                    reason: format!("duplicate token '{}'", word),
                });
            }
            vocab.insert(word);
        }

        Ok(vocab)
    }

    fn insert(&mut self, word: String) {
        self.t2i.insert(word.clone(), self.i2t.len());
        self.i2t.push(word);
    }

    /// Id of `token`, `None` when it is absent from the table.
    pub fn id(&self, token: &str) -> Option<usize> {
        self.t2i.get(token).copied()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.i2t.get(id).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    pub fn unknown(&self) -> &str {
        &self.i2t[0]
    }

    /// The token itself when registered, otherwise the unknown literal.
    pub fn render<'a>(&'a self, token: &'a str) -> &'a str {
        if self.contains(token) { token } else { self.unknown() }
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    /// Number of ranked words, sentinel excluded.
    pub fn ranked_len(&self) -> usize {
        self.i2t.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.ranked_len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.i2t.iter().enumerate().map(|(i, w)| (i, w.as_str()))
    }

    /// Row of `id` in an embedding matrix that leaves out the sentinel and the
    /// `stop_words` most frequent words.
    pub fn model_index(&self, id: usize, stop_words: usize) -> Option<usize> {
        if id <= stop_words || id >= self.len() {
            return None;
        }
        Some(id - (stop_words + 1))
    }

    /// Inverse of [`Vocabulary::model_index`].
    pub fn word_index(&self, model_index: usize, stop_words: usize) -> Option<usize> {
        let id = model_index.checked_add(stop_words + 1)?;
        if id >= self.len() {
            return None;
        }
        Some(id)
    }

}
