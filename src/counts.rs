
// imports
use crate::config::files_handling::{LineReader, OutputFile};
use crate::config::Params;
use crate::error::{PrepError, Result};
use crate::tokenizer::{normalize_sentence, Tokenizer, WhitespaceTokenizer};

use log::info;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};


/// Token occurrence counts, remembering the order tokens were first seen.
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    token2index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        match self.token2index.get(token) {
            Some(&index) => self.entries[index].1 += 1,
            None => {
                self.token2index.insert(token.to_owned(), self.entries.len());
                self.entries.push((token.to_owned(), 1));
            }
        }
    }

    pub fn count(&self, token: &str) -> usize {
        self.token2index.get(token).map_or(0, |&index| self.entries[index].1)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All tokens by descending count. The sort is stable, so ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut tup = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect::<Vec<(&str, usize)>>();
        tup.sort_by(|a, b| b.1.cmp(&a.1));
        tup
    }

    /// The `vocab_size` most common tokens. `reserved` (the sentinel literal) never takes a rank.
    pub fn top(&self, vocab_size: usize, reserved: &str) -> Vec<&str> {
        self.ranked()
            .into_iter()
            .map(|(k, _)| k)
            .filter(|k| *k != reserved)
            .take(vocab_size)
            .collect()
    }

    /// Writes the `vocab_size` most common tokens, one per line. Returns how many were written.
    pub fn write_ranked<W: Write>(&self, vocab_size: usize, reserved: &str, writer: &mut W) -> std::io::Result<usize> {
        let top = self.top(vocab_size, reserved);
        for tok in &top {
            writeln!(writer, "{}", tok)?;
        }
        Ok(top.len())
    }

}


/// Outcome of a vocabulary building pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabSummary {
    pub sentences: usize,
    pub tokens: usize,
    pub distinct_tokens: usize,
    pub ranked_words: usize,
}


/// Single pass accumulator: counts normalized tokens and streams each
/// normalized sentence to `sink` as it goes.
pub struct Counts<W: Write> {
    table: FrequencyTable,
    sink: W,
    sentences: usize,
    tokens: usize,
}

impl<W: Write> Counts<W> {

    pub fn new(sink: W) -> Self {
        Self {
            table: FrequencyTable::new(),
            sink,
            sentences: 0,
            tokens: 0,
        }
    }

    pub fn accumulate<S: AsRef<str>>(&mut self, sentence: &[S]) -> std::io::Result<()> {

        // accumulate occurrences of words - how many times each token appears in the corpus
        let normalized = normalize_sentence(sentence);
        for tok in &normalized {
            self.table.add(tok);
        }
        self.tokens += normalized.len();
        self.sentences += 1;

        writeln!(self.sink, "{}", normalized.join(" "))
    }

    pub fn sentences(&self) -> usize {
        self.sentences
    }

    pub fn finish(self) -> (FrequencyTable, W, usize, usize) {
        (self.table, self.sink, self.sentences, self.tokens)
    }

}


impl Counts<OutputFile> {

    /// Streams `sentences` once, writes the normalized sentence file and then
    /// the `vocab_size` most common tokens, `unknown` left out, to the word file.
    pub fn build<I, S>(
        sentences: I,
        sentence_file: &Path,
        word_file: &Path,
        vocab_size: usize,
        unknown: &str,
        progress_every: usize,
    ) -> Result<VocabSummary>
    where
        I: IntoIterator<Item = Result<Vec<S>>>,
        S: AsRef<str>,
    {
        let sink = OutputFile::create(sentence_file)?;
        let mut counts = Counts::new(sink);

        for sentence in sentences {
            let sentence = sentence?;
            counts
                .accumulate(&sentence)
                .map_err(|e| PrepError::io(sentence_file, e))?;

            if progress_every > 0 && counts.sentences() % progress_every == 0 {
                info!("counted {} sentences", counts.sentences());
            }
        }

        let (table, sink, n_sentences, n_tokens) = counts.finish();
        sink.finish()?;
        info!("read {} sentences, {} tokens, {} distinct", n_sentences, n_tokens, table.len());

        if table.len() < vocab_size {
            info!("only {} tokens in corpus...", table.len());
        }

        let mut words = OutputFile::create(word_file)?;
        let ranked_words = table
            .write_ranked(vocab_size, unknown, &mut words)
            .map_err(|e| PrepError::io(word_file, e))?;
        words.finish()?;
        info!("using {} most common tokens out of {}", ranked_words, table.len());

        Ok(VocabSummary {
            sentences: n_sentences,
            tokens: n_tokens,
            distinct_tokens: table.len(),
            ranked_words,
        })
    }

    /// Runs the builder on the configured corpus file, one whitespace tokenized sentence per line.
    pub fn run(params: &Params) -> Result<VocabSummary> {

        let corpus_file: &PathBuf = params
            .corpus_file
            .as_ref()
            .ok_or_else(|| PrepError::Config("corpus_file is needed to build the vocabulary".to_string()))?;

        let lines = LineReader::open(corpus_file)?;
        let sentences = lines.map(|line| {
            line.map(|l| {
                WhitespaceTokenizer
                    .tokenize(&l)
                    .into_iter()
                    .map(str::to_owned)
                    .collect::<Vec<String>>()
            })
        });

        Counts::build(
            sentences,
            &params.sentence_file,
            &params.word_file,
            params.vocab_size,
            &params.unknown_token,
            params.progress_every,
        )
    }

}
