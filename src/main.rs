//! AML Risk Pipeline - Main Entry Point
//!
//! Two modes over a transaction CSV: `train` fits the classifier and
//! persists the artifact, `score` applies the persisted artifact and writes
//! the account risk report.

use aml_risk_pipeline::{AppConfig, Pipeline};
use anyhow::{bail, Result};
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (mode, input, config_path) = match args.as_slice() {
        [_, mode, input] => (mode.as_str(), PathBuf::from(input), None),
        [_, mode, input, config] => (
            mode.as_str(),
            PathBuf::from(input),
            Some(PathBuf::from(config)),
        ),
        _ => bail!(
            "usage: {} <train|score> <transactions.csv> [config.toml]",
            args.first().map(String::as_str).unwrap_or("aml-risk-pipeline")
        ),
    };

    let config = AppConfig::load_or_default(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("aml_risk_pipeline={}", config.logging.level).parse()?),
        )
        .init();

    let pipeline = Pipeline::new(config);

    match mode {
        "train" => {
            let outcome = pipeline.train(&input)?;
            println!("Model AUC Score: {:.4}", outcome.auc);
            println!(
                "Trained on {} of {} transactions ({} held out); model saved to {}",
                outcome.n_train,
                outcome.n_transactions,
                outcome.n_holdout,
                outcome.artifact_path.display()
            );
        }
        "score" => {
            let outcome = pipeline.score(&input)?;
            println!(
                "Scored {} transactions across {} accounts (max account risk {:.2})",
                outcome.n_transactions, outcome.n_accounts, outcome.max_risk_score
            );
            println!(
                "Account risk report written to {}",
                outcome.report_path.display()
            );
        }
        other => bail!("unknown mode `{other}`; expected `train` or `score`"),
    }

    Ok(())
}
