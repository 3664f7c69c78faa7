use std::path::Path;

use rand_core::CryptoRngCore;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::witness_gen::header::{render_header, EmailFormat};
use crate::witness_gen::padding::pad_sha256;
use crate::witness_gen::signature::{generate_keypair, modulus, sign};
use crate::witness_gen::vector::TestVector;

/// What went into the vector, for reporting. Not part of the artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub email_format: EmailFormat,
    pub survey_id: String,
    pub vote_choice: String,
    pub original_header: String,
    pub header_length: usize,
    pub padded_length: usize,
}

#[derive(Clone, Debug)]
pub struct Generated {
    pub vector: TestVector,
    pub metadata: Metadata,
}

pub fn generate<R: CryptoRngCore>(config: &GenerationConfig, rng: &mut R) -> Result<Generated> {
    config.validate()?;

    let header = render_header(config.email_format, &config.survey_id);
    let padded = pad_sha256(header.as_bytes(), config.header_capacity())?;

    let private_key = generate_keypair(rng, config.key_bits)?;
    let n = modulus(&private_key);
    // the signature is over the header as sent, never the padded buffer
    let sig = sign(rng, &private_key, header.as_bytes())?;

    let pubkey = config.limbs.to_decimal(&n)?;
    let signature = config.limbs.to_decimal(&sig)?;

    log::info!(
        "generated {} vector: {} header bytes padded to {} of {}",
        config.email_format,
        header.len(),
        padded.used_len(),
        padded.capacity()
    );

    let vector = TestVector::assemble(
        &padded,
        pubkey,
        signature,
        &config.survey_id,
        &config.vote_choice,
        &config.secret,
    );

    Ok(Generated {
        vector,
        metadata: Metadata {
            email_format: config.email_format,
            survey_id: config.survey_id.clone(),
            vote_choice: config.vote_choice.clone(),
            header_length: header.len(),
            padded_length: padded.used_len(),
            original_header: header,
        },
    })
}

/// Generates and writes the vector; nothing is written if any step fails.
pub fn generate_to_file<R: CryptoRngCore, P: AsRef<Path>>(
    config: &GenerationConfig,
    rng: &mut R,
    path: P,
) -> Result<Generated> {
    let generated = generate(config, rng)?;
    generated.vector.write_atomic(path)?;
    Ok(generated)
}

#[cfg(test)]
fn seeded(seed: u64) -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(seed)
}

#[cfg(test)]
fn fast_config(email_format: EmailFormat) -> GenerationConfig {
    GenerationConfig {
        key_bits: 1024,
        ..GenerationConfig::for_format(email_format)
    }
}

#[test]
fn test_generate_fixed_position() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = fast_config(EmailFormat::FixedPosition);
    let generated = generate(&config, &mut seeded(11)).unwrap();
    let vector = &generated.vector;

    assert_eq!(
        generated.metadata.original_header,
        "From: voter@example.com\r\nSubject: Survey #123456\r\n"
    );
    assert_eq!(generated.metadata.header_length, 50);
    assert_eq!(generated.metadata.padded_length, 64);
    assert_eq!(generated.metadata.survey_id, "123456");
    assert_eq!(generated.metadata.vote_choice, "1");

    assert_eq!(vector.email_header.len(), 256);
    assert_eq!(vector.email_header_length, "64");
    assert_eq!(vector.email_header[50], "128");
    // 50 * 8 = 400 = 0x0190
    assert_eq!(vector.email_header[62], "1");
    assert_eq!(vector.email_header[63], "144");
    assert_eq!(vector.pubkey.len(), 17);
    assert_eq!(vector.signature.len(), 17);
    assert_eq!(vector.survey_id, "123456");
    assert_eq!(vector.vote_choice, "1");
    assert_eq!(vector.secret, "987654321");

    let message = vector.header_message().unwrap();
    assert_eq!(message, generated.metadata.original_header.as_bytes());
    vector.verify(&config.limbs, &message).unwrap();
}

#[test]
fn test_signature_is_over_unpadded_header() {
    let config = fast_config(EmailFormat::Hybrid);
    let generated = generate(&config, &mut seeded(12)).unwrap();
    let vector = &generated.vector;

    let padded: Vec<u8> = vector
        .email_header
        .iter()
        .map(|b| b.parse().unwrap())
        .collect();
    assert!(vector.verify(&config.limbs, &padded).is_err());
    vector
        .verify(&config.limbs, generated.metadata.original_header.as_bytes())
        .unwrap();
}

#[test]
fn test_all_formats_verify() {
    for (i, format) in EmailFormat::ALL.into_iter().enumerate() {
        let config = fast_config(format);
        let generated = generate(&config, &mut seeded(20 + i as u64)).unwrap();
        assert_eq!(generated.vector.email_header.len(), format.default_capacity());
        generated
            .vector
            .verify(&config.limbs, generated.metadata.original_header.as_bytes())
            .unwrap();
    }
}

#[test]
fn test_generation_is_reproducible_with_a_seed() {
    let config = fast_config(EmailFormat::FullRegex);
    let a = generate(&config, &mut seeded(5)).unwrap();
    let b = generate(&config, &mut seeded(5)).unwrap();
    assert_eq!(a.vector, b.vector);
}

#[test]
fn test_capacity_exceeded_writes_nothing() {
    use crate::error::Error;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_input_full-regex.json");

    let mut config = fast_config(EmailFormat::FullRegex);
    config.max_header_bytes = Some(64);

    let err = generate_to_file(&config, &mut seeded(1), &path).unwrap_err();
    assert!(matches!(
        err,
        Error::CapacityExceeded {
            required: 128,
            capacity: 64
        }
    ));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_narrow_limbs_are_rejected() {
    use crate::error::Error;
    use crate::witness_gen::limbs::LimbParams;

    let mut config = fast_config(EmailFormat::Hybrid);
    config.limbs = LimbParams { count: 8, bits: 121 };
    assert!(matches!(
        generate(&config, &mut seeded(1)),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_generate_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_input_hybrid.json");

    let config = fast_config(EmailFormat::Hybrid);
    let generated = generate_to_file(&config, &mut seeded(9), &path).unwrap();

    let written = TestVector::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, generated.vector);
    assert_eq!(written.email_header.len(), 128);
}
