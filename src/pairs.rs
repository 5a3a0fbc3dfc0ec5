//! Reading side of the pair stream, for consumers that train from a pair file.
//!
//! Pairs come back in the order they were written. A reader can resume from an
//! offset with [`PairReader::skip`] and can serve fixed-size batches forever with
//! [`PairReader::next_batch`], which starts over at the top of the file once the
//! end is reached.

use crate::config::files_handling::LineReader;
use crate::cooccurrence::Pair;
use crate::error::{PrepError, Result};

use std::path::{Path, PathBuf};

pub fn parse_pair(line: &str, line_no: usize) -> Result<Pair> {
    let mut fields = line.split_whitespace();
    let (center, context) = match (fields.next(), fields.next(), fields.next()) {
        (Some(center), Some(context), None) => (center, context),
        _ => {
            return Err(PrepError::PairFile {
                line: line_no,
                reason: format!("expected two ids, found '{}'", line),
            })
        }
    };
    let parse = |field: &str| {
        field.parse::<usize>().map_err(|e| PrepError::PairFile {
            line: line_no,
            reason: format!("'{}' is not an id: {}", field, e),
        })
    };
    Ok((parse(center)?, parse(context)?))
}

pub struct PairReader {
    path: PathBuf,
    lines: LineReader,
    line_no: usize,
}

impl PairReader {

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            lines: LineReader::open(path)?,
            line_no: 0,
        })
    }

    /// Lines consumed since the file was last (re)opened.
    pub fn position(&self) -> usize {
        self.line_no
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.lines = LineReader::open(&self.path)?;
        self.line_no = 0;
        Ok(())
    }

    /// Skips up to `n` pairs and returns how many were skipped.
    pub fn skip(&mut self, n: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            match self.next() {
                Some(pair) => {
                    pair?;
                    skipped += 1;
                }
                None => break,
            }
        }
        Ok(skipped)
    }

    /// Reads `batch_size` pairs, wrapping around to the first pair at end of file.
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Vec<Pair>> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rewound = false;
        while batch.len() < batch_size {
            match self.next() {
                Some(pair) => {
                    batch.push(pair?);
                    rewound = false;
                }
                None if rewound => {
                    return Err(PrepError::PairFile {
                        line: 0,
                        reason: format!("{} holds no pairs", self.path.display()),
                    })
                }
                None => {
                    self.rewind()?;
                    rewound = true;
                }
            }
        }
        Ok(batch)
    }

}

impl Iterator for PairReader {
    type Item = Result<Pair>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_pair(&line, self.line_no));
        }
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use std::fs;
    use tempdir::TempDir;

    fn pair_file(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new("pairs").unwrap();
        let path = dir.path().join("neighbors.txt");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_pairs() {
        assert_eq!(parse_pair("12 7", 1).unwrap(), (12, 7));
        assert!(matches!(parse_pair("12", 3), Err(PrepError::PairFile { line: 3, .. })));
        assert!(matches!(parse_pair("1 2 3", 1), Err(PrepError::PairFile { .. })));
        assert!(matches!(parse_pair("fox 2", 1), Err(PrepError::PairFile { .. })));
    }

    #[test]
    fn reads_in_written_order() {
        let (_dir, path) = pair_file("2 1\n3 4\n\n5 6\n");
        let pairs = PairReader::open(&path).unwrap().collect::<Result<Vec<Pair>>>().unwrap();
        assert_eq!(pairs, vec![(2, 1), (3, 4), (5, 6)]);
    }

    #[test]
    fn skip_resumes_from_offset() {
        let (_dir, path) = pair_file("2 1\n3 4\n5 6\n");
        let mut reader = PairReader::open(&path).unwrap();
        assert_eq!(PairReader::skip(&mut reader, 2).unwrap(), 2);
        assert_eq!(reader.next().unwrap().unwrap(), (5, 6));
        assert_eq!(PairReader::skip(&mut reader, 5).unwrap(), 0);
    }

    #[test]
    fn batches_wrap_around() {
        let (_dir, path) = pair_file("2 1\n3 4\n5 6\n");
        let mut reader = PairReader::open(&path).unwrap();
        assert_eq!(reader.next_batch(2).unwrap(), vec![(2, 1), (3, 4)]);
        assert_eq!(reader.next_batch(4).unwrap(), vec![(5, 6), (2, 1), (3, 4), (5, 6)]);
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn empty_file_does_not_loop() {
        let (_dir, path) = pair_file("\n");
        let mut reader = PairReader::open(&path).unwrap();
        assert!(reader.next_batch(0).unwrap().is_empty());
        assert!(matches!(reader.next_batch(1), Err(PrepError::PairFile { .. })));
    }

}
