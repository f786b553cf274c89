//! # Evaluating a stimulus folder
//!
//! Walks a stimulus folder the way an evaluation run would and prints, per
//! batch, the tensor shape and every `(label, path)` pair. Predictions of a
//! model would be matched to the printed paths by position.
//!
//! ## Usage
//! `cargo run --example evaluate_folder -- <root> [imagenet|imagenet-c|sessions] [--no-resize] [--grayscale] [--workers N] [--batch-size N]`
//!
//! Set `RUST_LOG=debug` to see the scan and worker logs.

use std::env;
use std::process::ExitCode;

use stimulus_data::{BatchLoader, InfoMappingKind, LoaderConfig, StimulusError};

fn parse_args(args: &[String]) -> Result<(LoaderConfig, InfoMappingKind), StimulusError> {
    let root = args
        .first()
        .ok_or_else(|| StimulusError::InvalidConfig("missing dataset root".to_string()))?;
    let mut config = LoaderConfig::new(root).resize(true).batch_size(16);
    let mut kind = InfoMappingKind::default();

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--no-resize" => config = config.resize(false),
            "--grayscale" => config = config.single_channel(true),
            "--workers" | "--batch-size" => {
                let value: usize = rest
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| StimulusError::InvalidConfig(format!("{arg} expects a number")))?;
                config = if arg == "--workers" {
                    config.num_workers(value)
                } else {
                    config.batch_size(value)
                };
            }
            other => kind = other.parse()?,
        }
    }
    Ok((config, kind))
}

fn run() -> Result<(), StimulusError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (config, kind) = parse_args(&args)?;
    let loader = BatchLoader::with_mapping_kind(config, kind)?;

    println!(
        "{} images in {} batches, transform {:?}",
        loader.len(),
        loader.num_batches(),
        loader.pipeline().step_names()
    );

    for (i, batch) in loader.load().enumerate() {
        let batch = batch?;
        println!("batch {i}: images {:?}", batch.images.shape());
        for (label, path) in batch.labeled_paths() {
            println!("  {label:<20} {path}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
