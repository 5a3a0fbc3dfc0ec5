use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use word2vec_prep::{Config, Pipeline};

/// Builds the ranked vocabulary and the word-context pair file for embedding training.
#[derive(Parser, Debug)]
#[command(name = "word2vec_prep")]
struct Cli {
    /// Path to the json file holding the run parameters
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("building parameters...");
    let params = Config::from_file(&cli.config)
        .with_context(|| format!("cannot read configuration {}", cli.config.display()))?
        .get_params();

    let summary = Pipeline::run(&params)?;
    if let Some(vocab) = &summary.vocab {
        log::info!("vocabulary: {} ranked words out of {} distinct tokens", vocab.ranked_words, vocab.distinct_tokens);
    }
    log::info!("pairs: {} from {} sentences", summary.extraction.pairs, summary.extraction.sentences);

    Ok(())
}
