
use crate::cooccurrence::PairFormat;
use crate::error::{PrepError, Result};
use crate::vocab::UNKNOWN;

use serde_json::Value;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

pub const SENTENCES_FILE: &str = "sentences.txt";
pub const WORDS_FILE: &str = "words.txt";
pub const PAIRS_FILE: &str = "neighbors.txt";

#[derive(Clone, Debug)]
pub struct ExtractParams {
    pub window_size: usize,
    pub stop_words: usize,
    pub output_format: PairFormat,
    pub num_threads: usize,
    pub chunk_size: usize,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            window_size: 5,
            stop_words: 40,
            output_format: PairFormat::Ids,
            num_threads: 4,
            chunk_size: 10000,
        }
    }
}

impl Display for ExtractParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "extraction hyper parameters:
        window_size: {},
        stop_words: {},
        output_format: {},
        num_threads: {},
        chunk_size: {}",
        self.window_size, self.stop_words, self.output_format, self.num_threads, self.chunk_size
        )
    }
}

#[derive(Clone, Debug)]
pub struct Params {
    pub corpus_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub sentence_file: PathBuf,
    pub word_file: PathBuf,
    pub pairs_file: PathBuf,
    pub vocab_size: usize,
    pub saved_vocab: Option<bool>,
    pub unknown_token: String,
    pub progress_every: usize,
    pub extract: ExtractParams,
}

impl Params {

    /// Parameters with every default filled in, files placed under `output_dir`.
    pub fn with_defaults(corpus_file: Option<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            corpus_file,
            sentence_file: output_dir.join(SENTENCES_FILE),
            word_file: output_dir.join(WORDS_FILE),
            pairs_file: output_dir.join(PAIRS_FILE),
            output_dir,
            vocab_size: 10000,
            saved_vocab: None,
            unknown_token: UNKNOWN.to_string(),
            progress_every: 100000,
            extract: ExtractParams::default(),
        }
    }

    pub fn skip_vocab_stage(&self) -> bool {
        self.saved_vocab.unwrap_or(false)
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let corpus = self.corpus_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string());
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        sentence_file: {}
        word_file: {}
        pairs_file: {}
        vocab_size: {}
        saved_vocab: {:?}
        unknown_token: {}
        progress_every: {}
        Using {}",
        corpus, self.output_dir.display(), self.sentence_file.display(), self.word_file.display(),
        self.pairs_file.display(), self.vocab_size, self.saved_vocab, self.unknown_token,
        self.progress_every, self.extract)
    }
}

pub struct Config {
    params: Params
}

impl Config {

    pub fn get_params(&self) -> Params {
        self.params.clone()
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        let json: Value = serde_json::from_str(&text)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        if !json.is_object() {
            return Err(PrepError::Config("configuration should be a json object".to_string()));
        }

        // validate input and output in json
        let output_dir = get_str(json, "output_dir")?
            .ok_or_else(|| PrepError::Config("output_dir was not supplied through json".to_string()))?;
        let saved_vocab = get_bool(json, "saved_vocab")?;
        let corpus_file = get_str(json, "corpus_file")?.map(PathBuf::from);
        if corpus_file.is_none() && !saved_vocab.unwrap_or(false) {
            return Err(PrepError::Config("corpus_file was not supplied through json".to_string()));
        }

        // handle default vs input parameters
        let mut params = Params::with_defaults(corpus_file, output_dir);
        params.saved_vocab = saved_vocab;
        if let Some(path) = get_str(json, "sentence_file")? {
            params.sentence_file = PathBuf::from(path);
        }
        if let Some(path) = get_str(json, "word_file")? {
            params.word_file = PathBuf::from(path);
        }
        if let Some(path) = get_str(json, "pairs_file")? {
            params.pairs_file = PathBuf::from(path);
        }
        if let Some(token) = get_str(json, "unknown_token")? {
            params.unknown_token = token.to_owned();
        }
        params.vocab_size = get_usize(json, "vocab_size", params.vocab_size)?;
        params.progress_every = get_usize(json, "progress_every", params.progress_every)?;

        let extract = &mut params.extract;
        extract.window_size = get_usize(json, "window_size", extract.window_size)?;
        extract.stop_words = get_usize(json, "stop_words", extract.stop_words)?;
        extract.num_threads = get_usize(json, "num_threads", extract.num_threads)?;
        extract.chunk_size = get_usize(json, "chunk_size", extract.chunk_size)?;
        if let Some(format) = get_str(json, "output_format")? {
            extract.output_format = format.parse()?;
        }

        if extract.window_size == 0 {
            return Err(PrepError::Config("window_size should be at least 1".to_string()));
        }
        if extract.num_threads == 0 || extract.chunk_size == 0 {
            return Err(PrepError::Config("num_threads and chunk_size should be at least 1".to_string()));
        }

        Ok(Self { params })
    }

}

fn get_usize(json: &Value, key: &str, default: usize) -> Result<usize> {
    match json.get(key) {
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| PrepError::Config(format!("given {} is not a non-negative integer", key))),
        None => Ok(default),
    }
}

fn get_str<'a>(json: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match json.get(key) {
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| PrepError::Config(format!("given {} is not a string", key))),
        None => Ok(None),
    }
}

fn get_bool(json: &Value, key: &str) -> Result<Option<bool>> {
    match json.get(key) {
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| PrepError::Config(format!("given {} is not boolean", key))),
        None => Ok(None),
    }
}


pub mod files_handling {

    // every pipeline file is plain utf-8 text, or gzip compressed text when the
    // path ends with `.gz`

    use crate::error::{PrepError, Result};

    use flate2::read::MultiGzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::{self, File};
    use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
    use std::path::{Path, PathBuf};

    pub fn is_gzip(path: &Path) -> bool {
        path.extension().map_or(false, |ext| ext == "gz")
    }

    pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
        let f = File::open(path).map_err(|e| PrepError::io(path, e))?;
        if is_gzip(path) {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(f)))))
        } else {
            Ok(Box::new(BufReader::new(f)))
        }
    }

    /// Forward-only line iterator that tags read errors (non utf-8 included) with the path.
    pub struct LineReader {
        path: PathBuf,
        lines: Lines<Box<dyn BufRead + Send>>,
    }

    impl LineReader {
        pub fn open(path: &Path) -> Result<Self> {
            Ok(Self {
                path: path.to_path_buf(),
                lines: open_reader(path)?.lines(),
            })
        }
    }

    impl Iterator for LineReader {
        type Item = Result<String>;

        fn next(&mut self) -> Option<Self::Item> {
            let line = self.lines.next()?;
            Some(line.map_err(|e| PrepError::io(&self.path, e)))
        }
    }

    enum Sink {
        Plain(BufWriter<File>),
        Gzip(GzEncoder<BufWriter<File>>),
    }

    /// Buffered output file. `finish` must be called to flush (and close the gzip stream).
    pub struct OutputFile {
        path: PathBuf,
        sink: Sink,
    }

    impl OutputFile {

        pub fn create(path: &Path) -> Result<Self> {

            // create output folder
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
            }

            let f = BufWriter::new(File::create(path).map_err(|e| PrepError::io(path, e))?);
            let sink = if is_gzip(path) {
                Sink::Gzip(GzEncoder::new(f, Compression::default()))
            } else {
                Sink::Plain(f)
            };
            Ok(Self { path: path.to_path_buf(), sink })
        }

        pub fn finish(self) -> Result<()> {
            let path = self.path;
            let flushed = match self.sink {
                Sink::Plain(mut f) => f.flush(),
                Sink::Gzip(gz) => gz.finish().and_then(|mut f| f.flush()),
            };
            flushed.map_err(|e| PrepError::io(path, e))
        }
    }

    impl Write for OutputFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match &mut self.sink {
                Sink::Plain(f) => f.write(buf),
                Sink::Gzip(gz) => gz.write(buf),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            match &mut self.sink {
                Sink::Plain(f) => f.flush(),
                Sink::Gzip(gz) => gz.flush(),
            }
        }
    }

}


#[cfg(test)]
mod tests {

    use super::files_handling::{LineReader, OutputFile};
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = Config::from_json(&json!({
            "corpus_file": "corpus.txt",
            "output_dir": "out"
        })).unwrap();
        let params = config.get_params();

        assert_eq!(params.corpus_file, Some(PathBuf::from("corpus.txt")));
        assert_eq!(params.sentence_file, Path::new("out").join(SENTENCES_FILE));
        assert_eq!(params.word_file, Path::new("out").join(WORDS_FILE));
        assert_eq!(params.pairs_file, Path::new("out").join(PAIRS_FILE));
        assert_eq!(params.vocab_size, 10000);
        assert_eq!(params.extract.window_size, 5);
        assert_eq!(params.extract.stop_words, 40);
        assert_eq!(params.extract.output_format, PairFormat::Ids);
        assert_eq!(params.unknown_token, UNKNOWN);
        assert!(!params.skip_vocab_stage());
    }

    #[test]
    fn given_values_override_defaults() {
        let config = Config::from_json(&json!({
            "output_dir": "out",
            "saved_vocab": true,
            "word_file": "vocab/ranked.txt",
            "vocab_size": 50,
            "window_size": 2,
            "stop_words": 0,
            "output_format": "words",
            "num_threads": 1
        })).unwrap();
        let params = config.get_params();

        assert!(params.skip_vocab_stage());
        assert_eq!(params.corpus_file, None);
        assert_eq!(params.word_file, PathBuf::from("vocab/ranked.txt"));
        assert_eq!(params.vocab_size, 50);
        assert_eq!(params.extract.window_size, 2);
        assert_eq!(params.extract.stop_words, 0);
        assert_eq!(params.extract.output_format, PairFormat::Words);
        assert_eq!(params.extract.num_threads, 1);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let missing_output = Config::from_json(&json!({ "corpus_file": "c.txt" }));
        assert!(matches!(missing_output, Err(PrepError::Config(_))));

        let missing_corpus = Config::from_json(&json!({ "output_dir": "out" }));
        assert!(matches!(missing_corpus, Err(PrepError::Config(_))));

        let zero_window = Config::from_json(&json!({
            "corpus_file": "c.txt", "output_dir": "out", "window_size": 0
        }));
        assert!(matches!(zero_window, Err(PrepError::Config(_))));

        let not_numeric = Config::from_json(&json!({
            "corpus_file": "c.txt", "output_dir": "out", "vocab_size": "many"
        }));
        assert!(matches!(not_numeric, Err(PrepError::Config(_))));

        let bad_format = Config::from_json(&json!({
            "corpus_file": "c.txt", "output_dir": "out", "output_format": "binary"
        }));
        assert!(matches!(bad_format, Err(PrepError::Config(_))));
    }

    #[test]
    fn config_file_must_be_json() {
        let dir = TempDir::new("config").unwrap();
        let path = dir.path().join("args.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::from_file(&path), Err(PrepError::Json(_))));
    }

    #[test]
    fn gzip_files_round_trip_through_line_reader() {
        let dir = TempDir::new("files").unwrap();
        for name in ["plain.txt", "nested/packed.txt.gz"] {
            let path = dir.path().join(name);
            let mut out = OutputFile::create(&path).unwrap();
            writeln!(out, "the fox").unwrap();
            writeln!(out, "jumps").unwrap();
            out.finish().unwrap();

            let lines = LineReader::open(&path).unwrap().collect::<Result<Vec<String>>>().unwrap();
            assert_eq!(lines, vec!["the fox", "jumps"]);
        }
    }

    #[test]
    fn non_utf8_lines_are_errors() {
        let dir = TempDir::new("files").unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, [0x66, 0x6f, 0xff, 0x0a]).unwrap();
        let mut lines = LineReader::open(&path).unwrap();
        assert!(matches!(lines.next(), Some(Err(PrepError::Io { .. }))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new("files").unwrap();
        let missing = LineReader::open(&dir.path().join("nope.txt"));
        assert!(matches!(missing, Err(PrepError::Io { .. })));
    }

}
