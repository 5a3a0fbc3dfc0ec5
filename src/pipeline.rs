
// imports
use crate::config::Params;
use crate::cooccurrence::{ExtractSummary, Extractor};
use crate::counts::{Counts, VocabSummary};
use crate::error::{PrepError, Result};

use log::info;
use std::fs;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// `None` when the vocabulary stage was skipped.
    pub vocab: Option<VocabSummary>,
    pub extraction: ExtractSummary,
}

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 2 steps -
    // -> vocabulary building (word counts, sentence file, ranked word file)
    // -> cooccurrence pairs extraction

    pub fn run(params: &Params) -> Result<RunSummary> {

        fs::create_dir_all(&params.output_dir).map_err(|e| PrepError::io(&params.output_dir, e))?;
        info!("{}", params);

        // run the vocab stage if not saved and given already
        let vocab = if params.skip_vocab_stage() {
            info!("reusing words from {} and sentences from {}", params.word_file.display(), params.sentence_file.display());
            None
        } else {
            let timer = Instant::now();
            info!("starting vocab building...");
            let summary = Counts::run(params)?;
            info!("finished creation and saved vocab, took {} seconds ...", timer.elapsed().as_secs());
            Some(summary)
        };

        let timer = Instant::now();
        info!("starting pairs extraction...");
        let extraction = Extractor::run(params)?;
        info!("finished extraction, saved pairs to {}. Took {} seconds ...", params.pairs_file.display(), timer.elapsed().as_secs());

        Ok(RunSummary { vocab, extraction })
    }

}
