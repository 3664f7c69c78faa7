use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};

pub const KEY_BITS: usize = 2048;

// dkim keys in the wild all use e = 65537, and so does RsaPrivateKey::new
const PUBLIC_EXPONENT: u32 = 65537;

pub fn generate_keypair<R: CryptoRngCore>(
    rng: &mut R,
    bits: usize,
) -> Result<RsaPrivateKey> {
    let private_key = RsaPrivateKey::new(rng, bits)?;
    log::debug!("generated {}-bit rsa key", private_key.n().bits());
    Ok(private_key)
}

/// rsa's bigint type is num-bigint-dig, so go through big-endian bytes
pub fn modulus(private_key: &RsaPrivateKey) -> BigUint {
    BigUint::from_bytes_be(&private_key.n().to_bytes_be())
}

/// PKCS#1 v1.5 over sha256 of the unpadded `data`.
pub fn sign<R: CryptoRngCore>(
    rng: &mut R,
    private_key: &RsaPrivateKey,
    data: &[u8],
) -> Result<BigUint> {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let sig = signing_key.try_sign_with_rng(rng, data)?;

    Ok(BigUint::from_bytes_be(&sig.to_bytes()))
}

pub fn verify(n: &BigUint, sig: &BigUint, data: &[u8]) -> Result<()> {
    let public_key = RsaPublicKey::new(
        rsa::BigUint::from_bytes_be(&n.to_bytes_be()),
        rsa::BigUint::from(PUBLIC_EXPONENT),
    )?;

    // the verifier wants exactly size() bytes, leading zeros included
    let size = public_key.size();
    let sig_bytes = sig.to_bytes_be();
    if sig_bytes.len() > size {
        return Err(Error::CryptoProvider(format!(
            "signature is {} bytes, modulus only {}",
            sig_bytes.len(),
            size
        )));
    }
    let mut encoded = vec![0u8; size];
    encoded[size - sig_bytes.len()..].copy_from_slice(&sig_bytes);

    let sig = Signature::try_from(encoded.as_slice())?;
    VerifyingKey::<Sha256>::new(public_key).verify(data, &sig)?;

    Ok(())
}

#[test]
fn test_rsa_signature() {
    let data = b"hello";
    let mut rng = rand_core::OsRng;

    let private_key = generate_keypair(&mut rng, KEY_BITS).unwrap();
    let n = modulus(&private_key);
    let sig = sign(&mut rng, &private_key, data).unwrap();

    assert_eq!(n.bits(), KEY_BITS as u64);
    assert!(sig < n);
    verify(&n, &sig, data).unwrap();
    assert!(verify(&n, &sig, b"hellp").is_err());
}

#[test]
fn test_seeded_keys_are_reproducible() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let key_a = generate_keypair(&mut StdRng::seed_from_u64(7), 1024).unwrap();
    let key_b = generate_keypair(&mut StdRng::seed_from_u64(7), 1024).unwrap();
    assert_eq!(modulus(&key_a), modulus(&key_b));

    // pkcs1v15 is deterministic, blinding randomness must not leak into the output
    let data = b"From: voter@example.com\r\nSubject: My Vote\r\n";
    let sig_a = sign(&mut StdRng::seed_from_u64(1), &key_a, data).unwrap();
    let sig_b = sign(&mut StdRng::seed_from_u64(2), &key_b, data).unwrap();
    assert_eq!(sig_a, sig_b);
}

#[test]
fn test_small_signature_is_left_padded() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(3);
    let private_key = generate_keypair(&mut rng, 1024).unwrap();
    let n = modulus(&private_key);

    // a forged tiny value has fewer bytes than the modulus and must fail on
    // the signature check, not on the length check
    let err = verify(&n, &BigUint::from(5u8), b"data").unwrap_err();
    assert!(matches!(err, Error::CryptoProvider(_)));
}

#[test]
fn test_bad_key_size() {
    let mut rng = rand_core::OsRng;
    assert!(matches!(
        generate_keypair(&mut rng, 0),
        Err(Error::CryptoProvider(_))
    ));
}
