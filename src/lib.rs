
pub mod config;
pub mod cooccurrence;
pub mod counts;
pub mod error;
pub mod pairs;
pub mod pipeline;
pub mod tokenizer;
pub mod vocab;

pub use config::{files_handling, Config, ExtractParams, Params};
pub use cooccurrence::{Extractor, Pair, PairFormat};
pub use counts::{Counts, FrequencyTable};
pub use error::{PrepError, Result};
pub use pairs::PairReader;
pub use pipeline::{Pipeline, RunSummary};
pub use vocab::{Vocabulary, UNKNOWN};
