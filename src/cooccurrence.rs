
// imports
use crate::config::files_handling::{LineReader, OutputFile};
use crate::config::{ExtractParams, Params};
use crate::error::{PrepError, Result};
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};
use crate::vocab::Vocabulary;

use log::{debug, info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;


/// (center id, context id)
pub type Pair = (usize, usize);

/// How pairs are rendered in the output stream. Extraction is the same for both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PairFormat {
    /// `centerId contextId`
    #[default]
    Ids,
    /// `center context` as surface tokens
    Words,
}

impl FromStr for PairFormat {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ids" => Ok(PairFormat::Ids),
            "words" => Ok(PairFormat::Words),
            other => Err(PrepError::Config(format!("unrecognized output_format {}", other))),
        }
    }
}

impl Display for PairFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairFormat::Ids => write!(f, "ids"),
            PairFormat::Words => write!(f, "words"),
        }
    }
}


#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub sentences: usize,
    pub pairs: usize,
}


pub struct Extractor<'v> {
    vocab: &'v Vocabulary,
    window_size: usize,
    stop_words: usize,
    format: PairFormat,
    num_threads: usize,
    chunk_size: usize,
}

impl<'v> Extractor<'v> {

    pub fn new(vocab: &'v Vocabulary, params: &ExtractParams) -> Result<Self> {
        if params.window_size == 0 {
            return Err(PrepError::Config("window_size should be at least 1".to_string()));
        }
        Ok(Self {
            vocab,
            window_size: params.window_size,
            stop_words: params.stop_words,
            format: params.output_format,
            num_threads: params.num_threads.max(1),
            chunk_size: params.chunk_size.max(1),
        })
    }

    // id of a token that may take part in a pair: present in the vocabulary and above the stop words
    fn usable_id(&self, tok: &str) -> Option<usize> {
        match self.vocab.id(tok) {
            Some(token_i) if token_i > self.stop_words => Some(token_i),
            Some(_token_i) => None,
            None => None,
        }
    }

    /// Appends the pairs of one tokenized sentence to `pairs`, in ascending (center, context) position order.
    pub fn sentence_pairs<S: AsRef<str>>(&self, sentence: &[S], pairs: &mut Vec<Pair>) {

        // only centers with a full window on both sides are used
        let window_size = self.window_size;
        let n = sentence.len();
        if window_size.checked_mul(2).map_or(true, |width| n <= width) {
            return;
        }

        let ids: Vec<Option<usize>> = sentence.iter().map(|tok| self.usable_id(tok.as_ref())).collect();

        for i in window_size..n - window_size {

            let token_i = match ids[i] {
                Some(token_i) => token_i,
                None => continue,
            };

            for j in i - window_size..=i + window_size {

                if j == i { continue }

                if let Some(context_j) = ids[j] {
                    pairs.push((token_i, context_j));
                }
            }
        }
    }

    pub fn line_pairs(&self, line: &str) -> Vec<Pair> {
        let mut pairs = Vec::new();
        self.sentence_pairs(&WhitespaceTokenizer.tokenize(line), &mut pairs);
        pairs
    }

    pub fn write_pairs<W: Write>(&self, pairs: &[Pair], writer: &mut W) -> std::io::Result<()> {
        for &(token_i, context_j) in pairs {
            match self.format {
                PairFormat::Ids => writeln!(writer, "{} {}", token_i, context_j)?,
                PairFormat::Words => writeln!(writer, "{} {}", self.render(token_i), self.render(context_j))?,
            }
        }
        Ok(())
    }

    fn render(&self, id: usize) -> &str {
        self.vocab.word(id).unwrap_or(self.vocab.unknown())
    }

    /// Streams sentence lines, extracts their pairs on the worker pool one chunk at a
    /// time and writes them to `writer` in input order.
    pub fn extract<I, W>(&self, lines: I, writer: &mut W, progress_every: usize) -> Result<ExtractSummary>
    where
        I: IntoIterator<Item = Result<String>>,
        W: Write,
    {
        let pool = ThreadPoolBuilder::new().num_threads(self.num_threads).build()?;

        let mut lines = lines.into_iter();
        let mut chunk: Vec<String> = Vec::with_capacity(self.chunk_size);
        let mut summary = ExtractSummary::default();

        loop {
            chunk.clear();
            for line in lines.by_ref().take(self.chunk_size) {
                chunk.push(line?);
            }
            if chunk.is_empty() {
                break;
            }

            // collect keeps the chunk order, so the sink sees sentences as they were read
            let by_sentence: Vec<Vec<Pair>> = pool.install(|| {
                chunk.par_iter().map(|line| self.line_pairs(line)).collect()
            });

            for pairs in &by_sentence {
                self.write_pairs(pairs, writer).map_err(PrepError::PairOutput)?;
                summary.pairs += pairs.len();
            }

            let before = summary.sentences;
            summary.sentences += chunk.len();
            if progress_every > 0 && before / progress_every != summary.sentences / progress_every {
                info!("processed {} sentences, {} pairs so far", summary.sentences, summary.pairs);
            } else {
                debug!("chunk of {} sentences done", chunk.len());
            }
        }

        Ok(summary)
    }

    /// Loads the vocabulary, then extracts pairs from the sentence file into the pairs file.
    pub fn run(params: &Params) -> Result<ExtractSummary> {

        let vocab = Vocabulary::load_with_unknown(&params.word_file, params.vocab_size, &params.unknown_token)?;
        if vocab.is_empty() {
            warn!("vocabulary loaded from {} is empty, no pairs will be produced", params.word_file.display());
        }
        info!("loaded {} words (+ {})", vocab.ranked_len(), vocab.unknown());

        let extractor = Extractor::new(&vocab, &params.extract)?;
        let lines = LineReader::open(&params.sentence_file)?;
        let mut output = OutputFile::create(&params.pairs_file)?;

        let summary = extractor.extract(lines, &mut output, params.progress_every)?;
        output.finish()?;

        info!("wrote {} pairs from {} sentences", summary.pairs, summary.sentences);
        Ok(summary)
    }

}
