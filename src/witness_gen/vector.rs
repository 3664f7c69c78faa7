use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::limbs::LimbParams;
use super::padding::PaddedHeader;
use super::signature;
use crate::error::{Error, Result};

/// Circuit input file. Field names and order are read by the circuit
/// tooling, and every number is a decimal string because the consumers
/// cannot hold them natively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestVector {
    pub email_header: Vec<String>,
    pub email_header_length: String,
    pub pubkey: Vec<String>,
    pub signature: Vec<String>,
    pub survey_id: String,
    pub vote_choice: String,
    pub secret: String,
}

impl TestVector {
    pub fn assemble(
        header: &PaddedHeader,
        pubkey: Vec<String>,
        signature: Vec<String>,
        survey_id: &str,
        vote_choice: &str,
        secret: &str,
    ) -> Self {
        Self {
            email_header: header.to_decimal_strings(),
            email_header_length: header.used_len().to_string(),
            pubkey,
            signature,
            survey_id: survey_id.to_string(),
            vote_choice: vote_choice.to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the vector to `path` through a temp file in the same
    /// directory, so `path` holds either the whole vector or nothing new.
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| Error::Io(err.error))?;

        log::info!("wrote test vector to {}", path.display());
        Ok(())
    }

    /// Recomposes pubkey and signature from their limbs and checks the
    /// signature over `message`.
    pub fn verify(&self, params: &LimbParams, message: &[u8]) -> Result<()> {
        let n = params.from_decimal(&self.pubkey)?;
        let sig = params.from_decimal(&self.signature)?;
        signature::verify(&n, &sig, message)
    }

    /// The unpadded header, recovered from the padded bytes and the length
    /// trailer.
    pub fn header_message(&self) -> Result<Vec<u8>> {
        let bytes = self
            .email_header
            .iter()
            .map(|b| {
                b.parse::<u8>().map_err(|_| {
                    Error::Configuration(format!("header byte `{}` is not a u8", b))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let used_len: usize = self.email_header_length.parse().map_err(|_| {
            Error::Configuration(format!(
                "header length `{}` is not an integer",
                self.email_header_length
            ))
        })?;
        if used_len < 8 || used_len > bytes.len() {
            return Err(Error::Configuration(format!(
                "header length {} outside of the {}-byte buffer",
                used_len,
                bytes.len()
            )));
        }

        let mut trailer = [0u8; 8];
        trailer.copy_from_slice(&bytes[used_len - 8..used_len]);
        let message_len = (u64::from_be_bytes(trailer) / 8) as usize;
        if message_len >= used_len {
            return Err(Error::Configuration(format!(
                "length trailer claims {} bytes in a {}-byte padded region",
                message_len, used_len
            )));
        }

        Ok(bytes[..message_len].to_vec())
    }
}

#[cfg(test)]
fn sample_vector() -> TestVector {
    let header = super::padding::pad_sha256(b"abc", 128).unwrap();
    let params = LimbParams::new(2, 8).unwrap();
    TestVector::assemble(
        &header,
        params.to_decimal(&num_bigint::BigUint::from(0x0102u32)).unwrap(),
        params.to_decimal(&num_bigint::BigUint::from(3u8)).unwrap(),
        "123456",
        "1",
        "987654321",
    )
}

#[test]
fn test_json_layout() {
    let vector = sample_vector();
    let json = vector.to_json().unwrap();

    let keys = [
        "\"emailHeader\"",
        "\"emailHeaderLength\"",
        "\"pubkey\"",
        "\"signature\"",
        "\"surveyId\"",
        "\"voteChoice\"",
        "\"secret\"",
    ];
    let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["emailHeader"].as_array().unwrap().len(), 128);
    assert_eq!(value["emailHeader"][0], "97");
    assert_eq!(value["emailHeader"][3], "128");
    assert_eq!(value["emailHeaderLength"], "64");
    assert_eq!(value["pubkey"], serde_json::json!(["2", "1"]));
    assert_eq!(value["signature"], serde_json::json!(["3", "0"]));
    assert_eq!(value["secret"], "987654321");

    assert_eq!(TestVector::from_json(&json).unwrap(), vector);
    assert_eq!(vector.header_message().unwrap(), b"abc");
}

#[test]
fn test_write_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.json");
    let vector = sample_vector();

    vector.write_atomic(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(TestVector::from_json(&written).unwrap(), vector);

    // no temp files left behind
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
