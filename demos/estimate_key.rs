//! Example: Estimate the key of an audio file
//!
//! Usage: estimate_key <file> [--json] [--snr DB] [--config FILE]
//!
//! Set RUST_LOG=debug to see the pipeline's log output.

use cadence_key::io::decoder::decode_audio;
use cadence_key::{estimate_key, AnalysisConfig, CalibrationHints};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut snr: Option<f64> = None;
    let mut config_path: Option<String> = None;
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--snr" => {
                let v = args.first().ok_or("--snr requires a value")?.parse::<f64>()?;
                args.remove(0);
                snr = Some(v);
            }
            "--config" => {
                let v = args.first().ok_or("--config requires a path")?.clone();
                args.remove(0);
                config_path = Some(v);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: estimate_key [--json] [--snr DB] [--config FILE] <file>\n\
                     \n\
                     --json         Emit the full estimate as JSON\n\
                     --snr DB       Signal-to-noise estimate used for calibration\n\
                     --config FILE  JSON analysis configuration (missing fields use defaults)\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let config = match config_path {
        Some(p) => AnalysisConfig::from_json(&std::fs::read_to_string(p)?)?,
        None => AnalysisConfig::default(),
    };

    let buffer = decode_audio(&path)?;

    let mut hints = CalibrationHints::new().with_length(buffer.duration_seconds());
    if let Some(db) = snr {
        hints = hints.with_snr(db);
    }

    let estimate = estimate_key(buffer.samples(), buffer.sample_rate(), Some(&hints), &config)?;

    if json {
        println!("{}", estimate.to_json()?);
        return Ok(());
    }

    println!("Key estimate for {}:", path);
    for (rank, candidate) in estimate.candidates.iter().enumerate() {
        println!(
            "  {}. {:<4} ({})  share {:.2}",
            rank + 1,
            candidate.key.name(),
            candidate.key.numerical(),
            candidate.confidence
        );
    }
    println!(
        "  Confidence: {:.2} ({})",
        estimate.confidence,
        estimate.tier.as_str()
    );
    if let Some(advice) = &estimate.advice {
        println!("  Advice: {}", advice);
    }
    println!(
        "  Frames: {}/{} analyzed, {:.2} ms",
        estimate.metadata.frames_analyzed,
        estimate.metadata.frames_total,
        estimate.metadata.processing_time_ms
    );

    Ok(())
}
