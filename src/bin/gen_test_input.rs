use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dkim_vectors::{generate_to_file, EmailFormat, GenerationConfig};

/// Writes a circuit input JSON for one of the vote circuits.
#[derive(Parser, Debug)]
#[command(name = "gen-test-input", version, about, long_about = None)]
struct Args {
    /// hybrid, fixed-position or full-regex
    format: Option<EmailFormat>,

    /// Output file, test_input_<format>.json by default
    output: Option<PathBuf>,

    /// JSON file with generation parameters
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    survey_id: Option<String>,

    #[arg(long)]
    vote_choice: Option<String>,

    #[arg(long)]
    secret: Option<String>,

    /// Header capacity, the format's default if unset
    #[arg(long)]
    max_header_bytes: Option<usize>,

    #[arg(long)]
    key_bits: Option<usize>,

    /// Seed for a reproducible key and signature
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(format) = args.format {
        config.email_format = format;
    }
    if let Some(survey_id) = args.survey_id {
        config.survey_id = survey_id;
    }
    if let Some(vote_choice) = args.vote_choice {
        config.vote_choice = vote_choice;
    }
    if let Some(secret) = args.secret {
        config.secret = secret;
    }
    if let Some(max_header_bytes) = args.max_header_bytes {
        config.max_header_bytes = Some(max_header_bytes);
    }
    if let Some(key_bits) = args.key_bits {
        config.key_bits = key_bits;
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("test_input_{}.json", config.email_format)));

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let generated = generate_to_file(&config, &mut rng, &output)
        .with_context(|| format!("generating {} test input", config.email_format))?;

    let metadata = &generated.metadata;
    log::info!("output: {}", output.display());
    log::info!(
        "email header: {}",
        metadata.original_header.replace("\r\n", "\\r\\n")
    );
    log::info!(
        "header length: {} bytes (padded to {})",
        metadata.header_length,
        metadata.padded_length
    );

    Ok(())
}
